//! # File Server
//! src/lib.rs
//!
//! Servidor de archivos HTTP/1.0 concurrente. Cada conexión se atiende en su
//! propio thread; el estado compartido (rate limiter y contador de visitas)
//! solo se modifica a través de operaciones atómicas.
//!
//! ## Arquitectura
//!
//! - `limiter`: rate limiting por IP con ventana deslizante
//! - `metrics`: contador de visitas por recurso
//! - `server`: loop de accept y handler de conexión
//! - `http`: parsing de requests y construcción de responses
//! - `files`: resolución de paths y listado de directorios
//! - `config`: argumentos CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use file_server::config::Config;
//! use file_server::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(&config).expect("Error al abrir el socket");
//! server.run().expect("Error fatal del listener");
//! ```

pub mod config;
pub mod error;
pub mod files;
pub mod http;
pub mod limiter;
pub mod metrics;
pub mod server;

pub use error::{Result, ServerError};
