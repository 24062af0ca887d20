//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe backends
//! - Update backend liveness based on results

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::future::join_all;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::http::client::{self, HttpClient};
use crate::load_balancer::{Backend, Registry};
use crate::observability::metrics;

const USER_AGENT: &str = "http-balancer-health-check";

pub struct HealthMonitor {
    registry: Arc<Registry>,
    config: HealthCheckConfig,
    client: HttpClient,
}

impl HealthMonitor {
    pub fn new(registry: Arc<Registry>, config: HealthCheckConfig) -> Self {
        Self {
            registry,
            config,
            client: client::unpooled(),
        }
    }

    /// Run probe cycles until `shutdown` fires.
    ///
    /// The first cycle starts immediately, later ones every `interval_secs`.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = self.config.interval_secs,
            path = %self.config.path,
            "Health monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// One probe cycle over every backend.
    ///
    /// Probes run concurrently; each result is written to its own backend.
    pub async fn check_all(&self) {
        let probes = self.registry.backends().iter().map(|backend| async move {
            let healthy = self.probe(backend).await;
            let was_alive = backend.is_alive();
            backend.set_alive(healthy);

            if was_alive != healthy {
                if healthy {
                    tracing::info!(backend = %backend, "Backend is back up");
                } else {
                    tracing::warn!(backend = %backend, "Backend marked down");
                }
            }
            tracing::debug!(
                backend = %backend,
                status = if healthy { "up" } else { "down" },
                "Health check complete"
            );
            metrics::record_backend_health(backend.authority(), healthy);
        });

        join_all(probes).await;
    }

    /// Probe one backend. Only a `200 OK` within the timeout counts as healthy.
    async fn probe(&self, backend: &Backend) -> bool {
        let uri = format!(
            "{}://{}{}",
            backend.url().scheme(),
            backend.authority(),
            self.config.path
        );

        let request = match Request::get(uri.as_str())
            .header("user-agent", USER_AGENT)
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(uri = %uri, error = %e, "Failed to build health check request");
                return false;
            }
        };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        match time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) if response.status() == StatusCode::OK => true,
            Ok(Ok(response)) => {
                tracing::warn!(uri = %uri, status = %response.status(), "Health check failed: non-200 status");
                false
            }
            Ok(Err(e)) => {
                tracing::warn!(uri = %uri, error = %e, "Health check failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(uri = %uri, "Health check failed: timeout");
                false
            }
        }
    }
}
