//! A throwaway backend for trying the balancer by hand.
//!
//! ```text
//! cargo run --example echo_backend -- --port 8081
//! cargo run --example echo_backend -- --port 8082
//! cargo run -- --port 8080 --server http://127.0.0.1:8081 --server http://127.0.0.1:8082
//! ```

use std::net::SocketAddr;

use axum::{http::Uri, routing::get, Router};
use clap::Parser;

#[derive(Parser)]
struct Args {
    #[arg(long, default_value_t = 8081)]
    port: u16,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let port = Args::parse().port;
    let app = Router::new()
        .route("/health", get(|| async { "Backend is healthy!" }))
        .fallback(move |uri: Uri| async move { format!("Hello from backend {} at {}\n", port, uri) });

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("Echo backend is listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
