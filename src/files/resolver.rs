//! # Resolución de Paths
//! src/files/resolver.rs
//!
//! ```text
//! "/docs//...//a.pdf"  --normalize-->  "/docs/a.pdf"   (301 si difieren)
//! "/docs/a.pdf"        --resolve---->  <raíz>/docs/a.pdf
//! ```
//!
//! Todo path se canonicaliza y debe quedar dentro de la raíz; si se escapa
//! (ej: `/../etc/passwd`) se trata como inexistente.

use super::{content_type_for, listing};
use crate::http::{Response, StatusCode};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Resultado de resolver un path contra el directorio servido
#[derive(Debug)]
pub enum Resolution {
    /// El path no estaba normalizado; redirigir a la forma canónica
    Redirect(String),

    /// No existe, no está permitido o está fuera de la raíz
    NotFound,

    /// Listado HTML de un directorio
    Directory(String),

    /// Contenido de un archivo permitido
    File {
        content_type: &'static str,
        bytes: Vec<u8>,
    },

    /// Existe pero no se pudo leer
    Failed(io::Error),
}

impl Resolution {
    /// Convierte la resolución en la respuesta HTTP que se envía al cliente
    pub fn into_response(self) -> Response {
        match self {
            Resolution::Redirect(location) => Response::redirect(&location),
            Resolution::NotFound => Response::error(StatusCode::NotFound, "404 Not Found"),
            Resolution::Directory(html) => Response::html(&html),
            Resolution::File { content_type, bytes } => Response::new(StatusCode::Ok)
                .with_header("Content-Type", content_type)
                .with_body_bytes(bytes),
            Resolution::Failed(e) => Response::error(
                StatusCode::InternalServerError,
                &format!("Failed to read resource: {}", e),
            ),
        }
    }
}

/// Quita segmentos vacíos y segmentos formados solo por 3 o más puntos
///
/// # Ejemplo
/// ```
/// use file_server::files::normalize_path;
///
/// assert_eq!(normalize_path("//docs/.../a.pdf/"), "/docs/a.pdf");
/// assert_eq!(normalize_path("/a/../b"), "/a/../b");
/// ```
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .filter(|segment| !(segment.len() >= 3 && segment.chars().all(|c| c == '.')))
        .collect();

    format!("/{}", segments.join("/"))
}

/// Resuelve paths HTTP contra un directorio raíz canonicalizado
#[derive(Debug, Clone)]
pub struct FileResolver {
    root: PathBuf,
}

impl FileResolver {
    /// Falla si `root` no existe o no es un directorio
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref().canonicalize()?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resuelve un path ya decodificado (ej: "/img/cat.png")
    pub fn resolve(&self, request_path: &str) -> Resolution {
        let normalized = normalize_path(request_path);
        if normalized != request_path {
            return Resolution::Redirect(normalized);
        }

        let candidate = self.root.join(normalized.trim_start_matches('/'));
        let actual = match candidate.canonicalize() {
            Ok(path) => path,
            Err(_) => return Resolution::NotFound,
        };

        if !actual.starts_with(&self.root) {
            return Resolution::NotFound;
        }

        if actual.is_dir() {
            return match listing::render(&actual, &normalized) {
                Ok(html) => Resolution::Directory(html),
                Err(e) => Resolution::Failed(e),
            };
        }

        // La extensión se decide por el path pedido, no por el destino de un symlink
        let content_type = Path::new(&normalized)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(content_type_for);

        let Some(content_type) = content_type else {
            return Resolution::NotFound;
        };

        match fs::read(&actual) {
            Ok(bytes) => Resolution::File { content_type, bytes },
            Err(e) => Resolution::Failed(e),
        }
    }
}
