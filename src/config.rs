//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor de archivos con soporte
//! para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./file_server --directory ./public \
//!   --port 1337 \
//!   --max-requests 5 \
//!   --window-secs 1 \
//!   --backlog 1
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! SERVE_PORT=8080 SERVE_DIRECTORY=/srv ./file_server
//! ```

use clap::Parser;
use std::time::Duration;
use tracing::info;

/// Configuración del servidor de archivos
#[derive(Debug, Clone, Parser)]
#[command(name = "file_server")]
#[command(about = "Servidor de archivos HTTP/1.0 concurrente con rate limiting por IP")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "1337", env = "SERVE_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "SERVE_HOST")]
    pub host: String,

    /// Directorio raíz a servir
    #[arg(short, long, default_value = ".", env = "SERVE_DIRECTORY")]
    pub directory: String,

    // === Rate Limiting ===

    /// Máximo de requests admitidos por IP dentro de la ventana
    #[arg(long = "max-requests", default_value = "5", env = "MAX_REQUESTS")]
    pub max_requests: usize,

    /// Duración de la ventana deslizante en segundos
    #[arg(long = "window-secs", default_value = "1", env = "WINDOW_SECS")]
    pub window_secs: u64,

    /// Cada cuántos segundos se eliminan las IPs inactivas (0 = nunca)
    #[arg(long = "reap-interval-secs", default_value = "60", env = "REAP_INTERVAL_SECS")]
    pub reap_interval_secs: u64,

    // === Conexiones ===

    /// Profundidad de la cola de conexiones pendientes (listen backlog)
    #[arg(long, default_value = "10", env = "LISTEN_BACKLOG")]
    pub backlog: i32,

    /// Timeout de lectura por conexión en milisegundos (0 = sin timeout)
    #[arg(long = "read-timeout-ms", default_value = "5000", env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    /// Timeout de escritura por conexión en milisegundos (0 = sin timeout)
    #[arg(long = "write-timeout-ms", default_value = "5000", env = "WRITE_TIMEOUT_MS")]
    pub write_timeout_ms: u64,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use file_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:1337");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// `None` cuando el timeout está deshabilitado
    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        (self.write_timeout_ms > 0).then(|| Duration::from_millis(self.write_timeout_ms))
    }

    /// `None` cuando el reaping está deshabilitado
    pub fn reap_interval(&self) -> Option<Duration> {
        (self.reap_interval_secs > 0).then(|| Duration::from_secs(self.reap_interval_secs))
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.max_requests == 0 {
            return Err("Max requests must be >= 1".to_string());
        }
        if self.window_secs == 0 {
            return Err("Window must be >= 1 second".to_string());
        }
        if self.backlog <= 0 {
            return Err("Backlog must be >= 1".to_string());
        }

        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn print_summary(&self) {
        info!(address = %self.address(), directory = %self.directory, "network");
        info!(
            max_requests = self.max_requests,
            window_secs = self.window_secs,
            reap_interval_secs = self.reap_interval_secs,
            "rate limiting: {} req / {}s per IP",
            self.max_requests,
            self.window_secs
        );
        info!(
            backlog = self.backlog,
            read_timeout_ms = self.read_timeout_ms,
            write_timeout_ms = self.write_timeout_ms,
            "connections: one thread per connection"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 1337,
            host: "0.0.0.0".to_string(),
            directory: ".".to_string(),
            max_requests: 5,
            window_secs: 1,
            reap_interval_secs: 60,
            backlog: 10,
            read_timeout_ms: 5_000,
            write_timeout_ms: 5_000,
        }
    }
}
