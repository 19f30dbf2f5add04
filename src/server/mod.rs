//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! - `tcp`: listener y loop de accept (un thread por conexión)
//! - `handler`: atención de una conexión individual
//! - `state`: estado compartido entre threads

pub mod handler;
pub mod state;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use handler::{RequestHandler, STATS_PATH};
pub use state::AppState;
pub use tcp::Server;
