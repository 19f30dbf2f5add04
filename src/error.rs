//! # Errores del Servidor
//! src/error.rs
//!
//! Errores que pueden terminar el servidor o una conexión. Los errores de
//! parsing viven en `http::request::ParseError` y siempre se convierten en
//! una respuesta 400, nunca llegan hasta aquí.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuración inválida (ej: `--max-requests 0`)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No se pudo abrir el socket de escucha
    #[error("could not bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// El directorio a servir no existe o no es accesible
    #[error("cannot serve directory {path}: {source}")]
    ServeDirectory {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Fallo fatal del listener; termina el loop de accept
    #[error("listener failed: {0}")]
    Listener(#[source] io::Error),

    /// Error de I/O en una conexión individual
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
