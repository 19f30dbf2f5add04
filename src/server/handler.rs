//! # Handler de Conexión
//! src/server/handler.rs
//!
//! Atiende exactamente una conexión de principio a fin:
//!
//! ```text
//! Reading -> Admitting -+-> Rejected -> 429 ------------------------+
//!                       +-> Admitted -> Counting -> Resolving -> 200/3xx/4xx/5xx
//!                                                                    |
//!                                                                 Closed
//! ```
//!
//! El stream se mueve al handler y se cierra al salir de `handle` en
//! cualquier rama (incluidos los errores de parsing y de escritura).

use crate::error::Result;
use crate::files::normalize_path;
use crate::http::{Method, Request, Response, StatusCode};
use crate::limiter::Admission;
use crate::server::AppState;
use std::io::{self, Read, Write};
use std::net::{IpAddr, SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Endpoint con los contadores de visitas en JSON
pub const STATS_PATH: &str = "/_stats";

/// Máximo de bytes que se leen de un request
const MAX_REQUEST_BYTES: usize = 8192;

pub struct RequestHandler {
    state: Arc<AppState>,
}

impl RequestHandler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Lee un request de `stream`, responde y cierra la conexión
    pub fn handle(&self, mut stream: TcpStream, peer: SocketAddr) -> Result<()> {
        let start = Instant::now();
        stream.set_read_timeout(self.state.read_timeout)?;
        stream.set_write_timeout(self.state.write_timeout)?;

        let raw = match read_request(&mut stream) {
            Ok(raw) => raw,
            Err(e) if is_timeout(&e) => {
                debug!("read timed out, closing");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if raw.is_empty() {
            debug!("peer closed without sending a request");
            return Ok(());
        }

        let response = self.process(&raw, peer.ip(), Instant::now());

        stream.write_all(&response.to_bytes())?;
        stream.flush()?;

        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        let status = response.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), latency_ms, "{}", status);
        } else {
            info!(status = status.as_u16(), latency_ms, "{}", status);
        }

        Ok(())
    }

    /// Decide la respuesta para un request crudo de `identity` en `now`.
    ///
    /// No hace I/O de red; es la parte del handler que toca el estado
    /// compartido.
    pub fn process(&self, raw: &[u8], identity: IpAddr, now: Instant) -> Response {
        let request = match Request::parse(raw) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "parse error");
                return finish(Response::error(StatusCode::BadRequest, &format!("Invalid: {}", e)));
            }
        };

        debug!(
            method = request.method().as_str(),
            path = request.path(),
            version = request.version(),
            user_agent = request.header("User-Agent").unwrap_or("-"),
            "request"
        );

        if let Admission::Reject { retry_after } = self.state.limiter.admit(identity, now) {
            info!(%identity, path = request.path(), "rate limited");
            return finish(Response::too_many_requests(retry_after));
        }

        if request.method() != Method::GET {
            return finish(
                Response::error(StatusCode::MethodNotAllowed, "Only GET is supported")
                    .with_header("Allow", "GET"),
            );
        }

        if request.path() == STATS_PATH {
            return finish(self.stats());
        }

        // Se cuenta antes de resolver: un fallo posterior no descuenta la visita
        let key = normalize_path(request.path());
        let hits = self.state.hits.increment(&key);

        let mut response = self.state.files.resolve(request.path()).into_response();
        response.add_header("X-Hit-Count", &hits.to_string());

        finish(response)
    }

    fn stats(&self) -> Response {
        match serde_json::to_string_pretty(&self.state.hits.snapshot_all()) {
            Ok(json) => Response::json(&json),
            Err(e) => Response::error(StatusCode::InternalServerError, &e.to_string()),
        }
    }
}

/// Headers comunes a todas las respuestas
fn finish(mut response: Response) -> Response {
    response.add_header("Server", "file_server/0.1");
    response.add_header("Connection", "close");
    response
}

/// Lee hasta el fin de los headers, EOF o `MAX_REQUEST_BYTES`
fn read_request(stream: &mut impl Read) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        let n = match stream.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if n == 0 {
            break;
        }

        buffer.extend_from_slice(&chunk[..n]);
        if Request::is_complete(&buffer) || buffer.len() >= MAX_REQUEST_BYTES {
            break;
        }
    }

    buffer.truncate(MAX_REQUEST_BYTES);
    Ok(buffer)
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::FileResolver;
    use crate::limiter::SlidingWindowLimiter;
    use std::fs;
    use std::net::{Shutdown, TcpListener};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    fn handler_with(max_requests: usize) -> (TempDir, RequestHandler) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>hola</h1>").unwrap();

        let state = AppState::new(
            SlidingWindowLimiter::new(max_requests, Duration::from_secs(1)),
            FileResolver::new(dir.path()).unwrap(),
        );
        (dir, RequestHandler::new(Arc::new(state)))
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn get(path: &str) -> Vec<u8> {
        format!("GET {} HTTP/1.0\r\n\r\n", path).into_bytes()
    }

    #[test]
    fn test_admitted_request_is_served_and_counted() {
        let (_dir, handler) = handler_with(5);

        let response = handler.process(&get("/index.html"), ip("10.0.0.1"), Instant::now());

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"<h1>hola</h1>");
        assert_eq!(response.header("X-Hit-Count"), Some("1"));
        assert_eq!(response.header("Connection"), Some("close"));
        assert_eq!(handler.state.hits.snapshot("/index.html"), 1);
    }

    #[test]
    fn test_rejected_request_is_not_counted() {
        let (_dir, handler) = handler_with(1);
        let now = Instant::now();

        handler.process(&get("/index.html"), ip("10.0.0.1"), now);
        let response = handler.process(&get("/index.html"), ip("10.0.0.1"), now);

        assert_eq!(response.status(), StatusCode::TooManyRequests);
        assert!(response.header("Retry-After").is_some());
        assert!(!response.body().is_empty());
        assert_eq!(handler.state.hits.snapshot("/index.html"), 1);
    }

    #[test]
    fn test_end_to_end_window() {
        let (_dir, handler) = handler_with(5);
        let client = ip("10.0.0.1");
        let base = Instant::now();
        let at = |ms: u64| base + Duration::from_millis(ms);

        for ms in [0, 100, 200, 300, 400] {
            assert_eq!(handler.process(&get("/index.html"), client, at(ms)).status(), StatusCode::Ok);
        }
        assert_eq!(
            handler.process(&get("/index.html"), client, at(500)).status(),
            StatusCode::TooManyRequests
        );
        assert_eq!(handler.process(&get("/index.html"), client, at(1050)).status(), StatusCode::Ok);
        assert_eq!(handler.state.hits.snapshot("/index.html"), 6);
    }

    #[test]
    fn test_malformed_request_is_400_and_not_admitted() {
        let (_dir, handler) = handler_with(1);
        let now = Instant::now();

        let response = handler.process(b"\x00\x01\x02\x03garbage", ip("10.0.0.1"), now);
        assert_eq!(response.status(), StatusCode::BadRequest);

        // El request malformado no consumió cupo
        assert_eq!(handler.state.limiter.recent(ip("10.0.0.1"), now), 0);
    }

    #[test]
    fn test_missing_file_still_counts() {
        let (_dir, handler) = handler_with(5);

        let response = handler.process(&get("/missing.png"), ip("10.0.0.1"), Instant::now());

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(handler.state.hits.snapshot("/missing.png"), 1);
    }

    #[test]
    fn test_counter_key_is_normalized() {
        let (_dir, handler) = handler_with(5);

        let response = handler.process(&get("//index.html"), ip("10.0.0.1"), Instant::now());

        assert_eq!(response.status(), StatusCode::MovedPermanently);
        assert_eq!(response.header("Location"), Some("/index.html"));
        assert_eq!(handler.state.hits.snapshot("/index.html"), 1);
    }

    #[test]
    fn test_post_is_405() {
        let (_dir, handler) = handler_with(5);

        let response = handler.process(b"POST /index.html HTTP/1.0\r\n\r\n", ip("10.0.0.1"), Instant::now());

        assert_eq!(response.status(), StatusCode::MethodNotAllowed);
        assert_eq!(response.header("Allow"), Some("GET"));
    }

    #[test]
    fn test_stats_endpoint() {
        let (_dir, handler) = handler_with(10);
        let now = Instant::now();

        handler.process(&get("/index.html"), ip("10.0.0.1"), now);
        handler.process(&get("/index.html"), ip("10.0.0.2"), now);
        let response = handler.process(&get(STATS_PATH), ip("10.0.0.1"), now);

        assert_eq!(response.status(), StatusCode::Ok);
        let stats: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(stats["total"], 2);
        assert_eq!(stats["resources"]["/index.html"], 2);
        assert!(stats["resources"].get(STATS_PATH).is_none());
    }

    #[test]
    fn test_read_request_stops_at_header_end() {
        let mut input: &[u8] = b"GET / HTTP/1.0\r\nHost: x\r\n\r\ntrailing";
        let raw = read_request(&mut input).unwrap();
        assert!(Request::is_complete(&raw));
    }

    #[test]
    fn test_read_request_caps_size() {
        let big = vec![b'a'; MAX_REQUEST_BYTES * 2];
        let raw = read_request(&mut big.as_slice()).unwrap();
        assert_eq!(raw.len(), MAX_REQUEST_BYTES);
    }

    #[test]
    fn test_handle_over_socket() {
        let (_dir, handler) = handler_with(5);
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, peer) = listener.accept().unwrap();
            handler.handle(stream, peer).unwrap();
        });

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(b"GET /index.html HTTP/1.0\r\n\r\n").unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        let text = String::from_utf8_lossy(&buf);

        assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(text.contains("X-Hit-Count: 1\r\n"));
        assert!(text.ends_with("<h1>hola</h1>"));

        server.join().unwrap();
    }

    #[test]
    fn test_handle_peer_closed_immediately() {
        let (_dir, handler) = handler_with(5);
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, peer) = listener.accept().unwrap();
            // read retorna 0 y el handler termina con Ok(())
            handler.handle(stream, peer).unwrap();
        });

        drop(TcpStream::connect(addr).unwrap());
        server.join().unwrap();
    }

    #[test]
    fn test_handle_read_timeout_closes_connection() {
        let dir = TempDir::new().unwrap();
        let mut state = AppState::new(
            SlidingWindowLimiter::new(5, Duration::from_secs(1)),
            FileResolver::new(dir.path()).unwrap(),
        );
        state.read_timeout = Some(Duration::from_millis(100));
        let handler = RequestHandler::new(Arc::new(state));

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, peer) = listener.accept().unwrap();
            handler.handle(stream, peer).unwrap();
        });

        // Request incompleto: nunca llega la línea vacía
        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(b"GET / HTTP/1.0\r\n").unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        assert!(buf.is_empty());

        client.shutdown(Shutdown::Both).ok();
        server.join().unwrap();
    }

    #[test]
    fn test_handle_write_timeout_releases_thread() {
        let dir = TempDir::new().unwrap();
        // Más grande que los buffers de socket de loopback
        fs::write(dir.path().join("big.html"), vec![b'x'; 64 * 1024 * 1024]).unwrap();

        let mut state = AppState::new(
            SlidingWindowLimiter::new(5, Duration::from_secs(1)),
            FileResolver::new(dir.path()).unwrap(),
        );
        state.write_timeout = Some(Duration::from_millis(200));
        let handler = RequestHandler::new(Arc::new(state));

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (stream, peer) = listener.accept().unwrap();
            tx.send(handler.handle(stream, peer).is_err()).unwrap();
        });

        // Pide el archivo y nunca lee la respuesta
        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(b"GET /big.html HTTP/1.0\r\n\r\n").unwrap();

        let failed = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(failed);
        drop(client);
    }
}
