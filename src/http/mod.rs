//! # Módulo HTTP
//!
//! Implementación mínima del protocolo HTTP/1.0 sin librerías de alto nivel:
//!
//! - Parsing de la request line y headers
//! - Construcción de responses
//! - Status codes
//!
//! Las conexiones nunca se reutilizan: cada response lleva
//! `Connection: close` y el socket se cierra después de escribirla.

pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Permite usar `http::Request` en vez de `http::request::Request`
pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
