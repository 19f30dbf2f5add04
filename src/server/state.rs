//! # Estado Compartido
//! src/server/state.rs
//!
//! Lo único que comparten los threads de conexión: el rate limiter, el
//! contador de visitas y el resolver de archivos (inmutable). Los dos
//! primeros solo se tocan a través de sus operaciones atómicas.

use crate::config::Config;
use crate::error::{Result, ServerError};
use crate::files::FileResolver;
use crate::limiter::SlidingWindowLimiter;
use crate::metrics::HitCounter;
use std::time::Duration;

pub struct AppState {
    pub limiter: SlidingWindowLimiter,
    pub hits: HitCounter,
    pub files: FileResolver,
    /// Deadline de lectura por conexión
    pub read_timeout: Option<Duration>,
    /// Deadline de cada escritura; un cliente que no lee no retiene el thread
    pub write_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(limiter: SlidingWindowLimiter, files: FileResolver) -> Self {
        Self {
            limiter,
            hits: HitCounter::new(),
            files,
            read_timeout: None,
            write_timeout: None,
        }
    }

    /// Construye el estado a partir de la configuración validada
    pub fn from_config(config: &Config) -> Result<Self> {
        let files = FileResolver::new(&config.directory).map_err(|source| {
            ServerError::ServeDirectory {
                path: config.directory.clone(),
                source,
            }
        })?;
        let limiter = SlidingWindowLimiter::new(config.max_requests, config.window());

        let mut state = Self::new(limiter, files);
        state.read_timeout = config.read_timeout();
        state.write_timeout = config.write_timeout();
        Ok(state)
    }
}
