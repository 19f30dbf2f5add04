//! # Rate Limiter de Ventana Deslizante
//! src/limiter/sliding_window.rs
//!
//! Limita cada IP a `max_requests` requests admitidos dentro de cualquier
//! intervalo de duración `window`.
//!
//! ## Algoritmo
//!
//! ```text
//! admit(ip, now):
//!   1. ventana = tabla[ip] (se crea vacía si no existe)
//!   2. quitar todo t con now - t >= window
//!   3. si len(ventana) >= max  -> Reject (sin agregar now)
//!   4. si no                   -> agregar now, Allow
//! ```
//!
//! Toda la tabla está protegida por un único `Mutex`, así que cada llamada a
//! `admit` es atómica respecto a las demás.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Resultado de una decisión de admisión
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// El request puede continuar
    Allow,

    /// El request se rechaza; `retry_after` indica cuánto falta para que el
    /// timestamp más antiguo salga de la ventana
    Reject { retry_after: Duration },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allow)
    }
}

/// Rate limiter de ventana deslizante, thread-safe
pub struct SlidingWindowLimiter {
    max_requests: usize,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    /// Crea un limiter que admite `max_requests` por cada `window`
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Decide si `identity` puede hacer un request en el instante `now`
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::limiter::{Admission, SlidingWindowLimiter};
    /// use std::time::{Duration, Instant};
    ///
    /// let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(1));
    /// let ip = "10.0.0.1".parse().unwrap();
    /// let now = Instant::now();
    ///
    /// assert_eq!(limiter.admit(ip, now), Admission::Allow);
    /// assert!(!limiter.admit(ip, now).is_allowed());
    /// ```
    pub fn admit(&self, identity: IpAddr, now: Instant) -> Admission {
        let mut windows = self.lock();
        let timestamps = windows.entry(identity).or_default();

        self.prune(timestamps, now);

        if timestamps.len() >= self.max_requests {
            // El rechazo no se agrega: no debe consumir cupo
            let retry_after = timestamps
                .front()
                .map(|&oldest| self.window.saturating_sub(now.saturating_duration_since(oldest)))
                .unwrap_or(self.window);
            return Admission::Reject { retry_after };
        }

        // Dos conexiones pueden llegar con `now` fuera de orden; la ventana
        // se mantiene ordenada para que `prune` pueda mirar solo el frente
        let position = timestamps.partition_point(|&t| t <= now);
        timestamps.insert(position, now);
        Admission::Allow
    }

    /// Igual que `admit` pero usando el reloj actual
    pub fn admit_now(&self, identity: IpAddr) -> Admission {
        self.admit(identity, Instant::now())
    }

    /// Cuenta los requests admitidos de `identity` que siguen dentro de la
    /// ventana en `now`. No modifica la tabla.
    pub fn recent(&self, identity: IpAddr, now: Instant) -> usize {
        let windows = self.lock();
        windows
            .get(&identity)
            .map(|timestamps| {
                timestamps
                    .iter()
                    .filter(|&&t| now.saturating_duration_since(t) < self.window)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Elimina las IPs cuya ventana queda vacía tras podarla en `now`.
    ///
    /// Retorna cuántas entradas se eliminaron.
    pub fn reap_idle(&self, now: Instant) -> usize {
        let mut windows = self.lock();
        let before = windows.len();

        windows.retain(|_, timestamps| {
            self.prune(timestamps, now);
            !timestamps.is_empty()
        });

        before - windows.len()
    }

    /// Número de IPs con estado en la tabla
    pub fn tracked_identities(&self) -> usize {
        self.lock().len()
    }

    fn prune(&self, timestamps: &mut VecDeque<Instant>, now: Instant) {
        // La ventana está ordenada, basta mirar el frente
        while let Some(&oldest) = timestamps.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<IpAddr, VecDeque<Instant>>> {
        // Ninguna sección crítica deja la tabla a medias
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
