//! # Métricas
//! src/metrics/mod.rs
//!
//! Contadores de visitas por recurso, expuestos en `/_stats` y en el header
//! `X-Hit-Count` de cada respuesta servida.

pub mod hit_counter;

pub use hit_counter::{HitCounter, HitsSnapshot};
