//! # Contador de Visitas
//! src/metrics/hit_counter.rs
//!
//! Cuenta cuántas veces se ha accedido a cada recurso (path normalizado).
//!
//! El mapa nunca se expone: solo se puede modificar a través de
//! `increment`, que hace el read-modify-write completo bajo el `Mutex`.
//! Así no se pierden actualizaciones cuando varios threads incrementan la
//! misma llave al mismo tiempo.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Contador de visitas por recurso, thread-safe
#[derive(Debug, Default)]
pub struct HitCounter {
    table: Mutex<HashMap<String, u64>>,
}

/// Copia consistente de toda la tabla en un instante
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HitsSnapshot {
    pub total: u64,
    pub resources: BTreeMap<String, u64>,
}

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incrementa el contador de `key` y retorna el nuevo valor
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::metrics::HitCounter;
    ///
    /// let hits = HitCounter::new();
    /// assert_eq!(hits.increment("/index.html"), 1);
    /// assert_eq!(hits.increment("/index.html"), 2);
    /// ```
    pub fn increment(&self, key: &str) -> u64 {
        let mut table = self.lock();
        let count = table.entry(key.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Valor actual del contador de `key` (0 si nunca se visitó)
    pub fn snapshot(&self, key: &str) -> u64 {
        self.lock().get(key).copied().unwrap_or(0)
    }

    /// Copia de todos los contadores, ordenados por llave
    pub fn snapshot_all(&self) -> HitsSnapshot {
        let table = self.lock();
        let resources: BTreeMap<String, u64> =
            table.iter().map(|(k, v)| (k.clone(), *v)).collect();
        let total = resources.values().sum();

        HitsSnapshot { total, resources }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
