//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use http_balancer::config::BalancerConfig;
use http_balancer::load_balancer::Registry;
use http_balancer::observability::RequestStats;
use http_balancer::{HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral loopback port.
pub async fn spawn_backend(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// A backend that answers every path with `200` and a fixed body.
pub async fn start_mock_backend(response: &'static str) -> SocketAddr {
    spawn_backend(Router::new().fallback(move || async move { response })).await
}

/// A backend whose status code for every path is read from `status`.
pub async fn start_status_backend(status: Arc<AtomicU16>, body: &'static str) -> SocketAddr {
    let app = Router::new().fallback(move || {
        let status = status.clone();
        async move {
            let code = StatusCode::from_u16(status.load(Ordering::SeqCst))
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (code, [("x-backend", body)], body)
        }
    });
    spawn_backend(app).await
}

/// A backend that describes the request it received.
///
/// Body: `<METHOD> <path?query>\nhost: <host>\n<request body>`. Every `x-echo`
/// header comes back as `x-echoed`, the request ID as `x-upstream-request-id`.
pub async fn start_echo_backend() -> SocketAddr {
    async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
        let mut out = HeaderMap::new();
        for value in headers.get_all("x-echo") {
            out.append("x-echoed", value.clone());
        }
        if let Some(id) = headers.get("x-request-id") {
            out.insert("x-upstream-request-id", id.clone());
        }
        let host = headers
            .get("host")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let text = format!(
            "{} {}\nhost: {}\n{}",
            method,
            uri,
            host,
            String::from_utf8_lossy(&body)
        );
        (out, text)
    }

    spawn_backend(Router::new().fallback(echo)).await
}

/// A backend that only answers `health_path`; any other request gets its
/// connection closed without a response.
pub async fn start_hangup_backend(health_path: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Some(path) = read_request_path(&mut socket).await else {
                    return;
                };
                if path == health_path {
                    let _ = socket
                        .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok")
                        .await;
                }
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// A backend that answers `health_path` normally. For any other request it
/// sends a `200` head promising 100 bytes, writes two, then closes.
pub async fn start_truncating_backend(health_path: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Some(path) = read_request_path(&mut socket).await else {
                    return;
                };
                let reply: &[u8] = if path == health_path {
                    b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok"
                } else {
                    b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nok"
                };
                let _ = socket.write_all(reply).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// Read a request head off `socket` and return its path.
async fn read_request_path(socket: &mut tokio::net::TcpStream) -> Option<String> {
    let mut head = Vec::new();
    let mut chunk = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => head.extend_from_slice(&chunk[..n]),
        }
    }
    let text = String::from_utf8_lossy(&head);
    text.split_whitespace().nth(1).map(str::to_string)
}

/// An address with nothing listening on it.
pub fn closed_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

pub fn url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

pub fn balancer_config(backends: &[SocketAddr]) -> BalancerConfig {
    let mut config = BalancerConfig::default();
    config.backends = backends.iter().map(|a| url(*a)).collect();
    config.health_check.interval_secs = 3600;
    config.health_check.timeout_secs = 1;
    config
}

/// A running balancer on an ephemeral port.
pub struct Balancer {
    pub addr: SocketAddr,
    pub registry: Arc<Registry>,
    pub stats: Arc<RequestStats>,
    pub shutdown: Shutdown,
}

impl Balancer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn start_balancer(config: BalancerConfig) -> Balancer {
    let server = HttpServer::new(config).unwrap();
    let registry = server.registry();
    let stats = server.stats();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Balancer {
        addr,
        registry,
        stats,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Poll `cond` until it holds or `timeout` elapses.
pub async fn wait_until<F: Fn() -> bool>(cond: F, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    cond()
}
