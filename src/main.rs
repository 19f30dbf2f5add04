//! # File Server - Entry Point
//! src/main.rs
//!
//! Parsea la configuración, inicializa el logging y corre el loop de accept
//! hasta un fallo fatal del listener.

use file_server::config::Config;
use file_server::server::Server;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .init();

    let config = Config::new();
    config.print_summary();

    let result = Server::bind(&config).and_then(Server::run);

    if let Err(e) = result {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}
