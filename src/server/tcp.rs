//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Acepta conexiones y lanza un thread independiente por cada una. El loop
//! de accept nunca espera a que termine un request: un cliente lento solo
//! bloquea su propio thread.
//!
//! La profundidad del backlog se pasa a `listen(2)` vía `socket2`; con
//! backlog 1 el kernel puede rechazar conexiones mientras otra está
//! pendiente.

use crate::config::Config;
use crate::error::{Result, ServerError};
use crate::server::{AppState, RequestHandler};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, info_span, warn};

/// Pausa tras quedarse sin file descriptors, para no girar en vacío
const EXHAUSTION_BACKOFF: Duration = Duration::from_millis(50);

/// Servidor de archivos concurrente (un thread por conexión)
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
    reap_interval: Option<Duration>,
}

impl Server {
    /// Valida la configuración y abre el socket de escucha
    pub fn bind(config: &Config) -> Result<Self> {
        config.validate().map_err(ServerError::InvalidConfig)?;

        let state = AppState::from_config(config)?;
        let address = config.address();
        let listener = bind_listener(&address, config.backlog)
            .map_err(|source| ServerError::Bind { address, source })?;

        Ok(Self {
            listener,
            state: Arc::new(state),
            reap_interval: config.reap_interval(),
        })
    }

    /// Dirección real de escucha (útil con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Loop de accept. Solo retorna ante un fallo fatal del listener.
    pub fn run(self) -> Result<()> {
        info!(address = %self.local_addr()?, "listening, one thread per connection");

        if let Some(interval) = self.reap_interval {
            spawn_reaper(Arc::downgrade(&self.state), interval)?;
        }

        let handler = Arc::new(RequestHandler::new(Arc::clone(&self.state)));
        let mut next_id: u64 = 0;

        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    next_id += 1;
                    let id = next_id;
                    let handler = Arc::clone(&handler);
                    debug!(id, %peer, "accepted");

                    let spawned = thread::Builder::new()
                        .name(format!("conn-{}", id))
                        .spawn(move || {
                            let span = info_span!("conn", id, %peer);
                            let _guard = span.enter();

                            if let Err(e) = handler.handle(stream, peer) {
                                warn!(error = %e, "connection failed");
                            }
                        });

                    // Si no hay thread, el stream se descarta y la conexión se cierra
                    if let Err(e) = spawned {
                        warn!(id, %peer, error = %e, "could not spawn connection thread");
                    }
                }
                Err(e) if is_transient(&e) => {
                    warn!(error = %e, "accept failed, continuing");
                    if is_resource_exhaustion(&e) {
                        thread::sleep(EXHAUSTION_BACKOFF);
                    }
                }
                Err(e) => {
                    error!(error = %e, "listener failed, shutting down");
                    return Err(ServerError::Listener(e));
                }
            }
        }
    }
}

/// Crea el socket con SO_REUSEADDR y el backlog pedido
fn bind_listener(address: &str, backlog: i32) -> io::Result<TcpListener> {
    let addr = address.to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("no address for {}", address))
    })?;

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog)?;

    Ok(socket.into())
}

/// Thread que elimina periódicamente las IPs sin requests recientes.
///
/// Termina solo cuando el estado ya no existe.
fn spawn_reaper(state: Weak<AppState>, interval: Duration) -> io::Result<()> {
    thread::Builder::new()
        .name("reaper".to_string())
        .spawn(move || loop {
            thread::sleep(interval);
            let Some(state) = state.upgrade() else {
                break;
            };

            let reaped = state.limiter.reap_idle(Instant::now());
            if reaped > 0 {
                debug!(
                    reaped,
                    tracked = state.limiter.tracked_identities(),
                    "reaped idle clients"
                );
            }
        })?;

    Ok(())
}

/// Errores de accept que afectan a una sola conexión
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    ) || is_resource_exhaustion(e)
}

/// ENFILE / EMFILE
fn is_resource_exhaustion(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(23) | Some(24))
}
