//! # Control de Admisión
//! src/limiter/mod.rs
//!
//! Este módulo decide si un request de un cliente puede continuar o debe
//! rechazarse con 429. Usa una ventana deslizante por IP:
//! - Cada IP tiene su propia cola de timestamps
//! - Antes de contar se descartan los timestamps fuera de la ventana
//! - Un request rechazado no ocupa cupo

pub mod sliding_window;

pub use sliding_window::{Admission, SlidingWindowLimiter};
