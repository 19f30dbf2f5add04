//! # Sistema de Archivos
//! src/files/mod.rs
//!
//! Traduce un path HTTP a un archivo o directorio dentro del directorio
//! servido y produce la respuesta correspondiente:
//! - `resolver`: normalización de paths y resolución dentro de la raíz
//! - `listing`: página HTML con el contenido de un directorio
//!
//! Solo se sirven archivos `png`, `pdf` y `html`.

pub mod listing;
pub mod resolver;

pub use resolver::{normalize_path, FileResolver, Resolution};

/// Extensiones que el servidor entrega
pub const VALID_EXTENSIONS: [&str; 3] = ["png", "pdf", "html"];

/// Content-Type para una extensión permitida
///
/// # Ejemplo
/// ```
/// use file_server::files::content_type_for;
///
/// assert_eq!(content_type_for("png"), Some("image/png"));
/// assert_eq!(content_type_for("exe"), None);
/// ```
pub fn content_type_for(extension: &str) -> Option<&'static str> {
    match extension {
        "png" => Some("image/png"),
        "pdf" => Some("application/pdf"),
        "html" => Some("text/html; charset=utf-8"),
        _ => None,
    }
}
