//! Shared utilities for integration testing.

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{http::Method, routing::any, Router};
use logging_proxy::{HttpServer, Logger, ProxyConfig, Shutdown};
use serde_json::Value;
use tokio::net::TcpListener;
use tracing_subscriber::filter::LevelFilter;

/// In-memory log sink; every line is one JSON record.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn logger(&self, level: LevelFilter) -> Logger {
        let sink = self.clone();
        Logger::new(level, move || sink.clone())
    }

    pub fn records(&self) -> Vec<Value> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    /// Records with the given `msg`.
    pub fn messages(&self, msg: &str) -> Vec<Value> {
        self.records()
            .into_iter()
            .filter(|r| r["msg"] == msg)
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Start a mock backend on an ephemeral port.
///
/// Every path answers `response`, except `/method` which answers with the
/// method the backend received.
pub async fn start_mock_backend(response: &'static str) -> SocketAddr {
    let app = Router::new()
        .route("/method", any(|method: Method| async move { method.to_string() }))
        .fallback(move || async move { response });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Start the proxy on an ephemeral port.
pub async fn start_proxy(logger: Logger) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&ProxyConfig::default(), logger).unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    (addr, shutdown)
}

/// A client that sends absolute-form requests through the proxy.
pub fn proxied_client(proxy: SocketAddr) -> reqwest::Client {
    reqwest::Client::builder()
        .proxy(reqwest::Proxy::http(format!("http://{proxy}")).unwrap())
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}

/// A client that talks to the proxy directly.
pub fn direct_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
