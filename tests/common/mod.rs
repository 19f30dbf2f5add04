//! Helpers compartidos por los tests de integración: levantan un servidor
//! real en un puerto efímero con un directorio temporal.

#![allow(dead_code)]

use file_server::config::Config;
use file_server::server::{AppState, Server};
use std::fs;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<AppState>,
    // Se mantiene vivo mientras dure el test
    _dir: TempDir,
}

/// Levanta un servidor con `index.html`, `docs/manual.pdf` y `notes.txt`
pub fn start_server(configure: impl FnOnce(&mut Config)) -> TestServer {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("index.html"), "<h1>hola</h1>").unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/manual.pdf"), b"%PDF-1.4 fake").unwrap();
    fs::write(dir.path().join("notes.txt"), "not served").unwrap();

    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        directory: dir.path().to_string_lossy().into_owned(),
        ..Config::default()
    };
    configure(&mut config);

    let server = Server::bind(&config).expect("bind");
    let addr = server.local_addr().unwrap();
    let state = server.state();
    thread::spawn(move || server.run());

    TestServer { addr, state, _dir: dir }
}

/// Envía un request crudo y retorna la response completa
pub fn send_raw(addr: SocketAddr, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream.write_all(raw).unwrap();

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).unwrap();
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn get(addr: SocketAddr, path: &str) -> String {
    send_raw(addr, format!("GET {} HTTP/1.0\r\n\r\n", path).as_bytes())
}

/// Código de estado de la status line
pub fn status_of(response: &str) -> u16 {
    response
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or(0)
}

/// Valor de un header de la response
pub fn header<'a>(response: &'a str, name: &str) -> Option<&'a str> {
    let head = response.split("\r\n\r\n").next()?;
    head.lines()
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .find(|(n, _)| n.trim().eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim())
}

/// Body de la response (después de la línea vacía)
pub fn body(response: &str) -> &str {
    response
        .find("\r\n\r\n")
        .map(|pos| &response[pos + 4..])
        .unwrap_or("")
}
