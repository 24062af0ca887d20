//! Outbound HTTP client shared by forwarding and health probes.

use axum::body::Body;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

pub type HttpClient = Client<HttpConnector, Body>;

/// A client that keeps no idle connections, so every request dials fresh.
pub fn unpooled() -> HttpClient {
    Client::builder(TokioExecutor::new())
        .pool_max_idle_per_host(0)
        .build(HttpConnector::new())
}
