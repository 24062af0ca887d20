//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener
//! - Select a backend and forward requests to it
//! - Own the health monitor task

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::admin::{self, handlers::lb_stats};
use crate::config::validation::validate_config;
use crate::config::{BalancerConfig, ConfigError};
use crate::health::HealthMonitor;
use crate::http::client::{self, HttpClient};
use crate::http::request::{self as upstream, MakeRequestUuid};
use crate::http::response::{relay, DispatchError};
use crate::load_balancer::{Backend, Registry};
use crate::observability::{metrics, RequestStats};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub stats: Arc<RequestStats>,
    pub client: HttpClient,
    pub upstream_timeout: Duration,
}

/// HTTP server for the load balancer.
pub struct HttpServer {
    router: Router,
    config: BalancerConfig,
    registry: Arc<Registry>,
    stats: Arc<RequestStats>,
}

impl HttpServer {
    /// Validate `config` and build the server. Nothing is bound yet.
    pub fn new(config: BalancerConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let registry = Registry::from_addresses(&config.backends)
            .map_err(|e| ConfigError::Validation(vec![e]))?;
        let registry = Arc::new(registry);
        let stats = Arc::new(RequestStats::new());

        let state = AppState {
            registry: registry.clone(),
            stats: stats.clone(),
            client: client::unpooled(),
            upstream_timeout: Duration::from_secs(config.timeouts.upstream_secs),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            registry,
            stats,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &BalancerConfig, state: AppState) -> Router {
        let mut router = Router::new();
        if config.stats.enabled {
            router = router.route(admin::STATS_PATH, any(lb_stats));
        }

        router
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Spawns the health monitor first; both stop when `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let monitor = HealthMonitor::new(self.registry.clone(), self.config.health_check.clone());
        let monitor_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            monitor.run(monitor_shutdown).await;
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    /// The backend ring, shared with the health monitor.
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn stats(&self) -> Arc<RequestStats> {
        self.stats.clone()
    }
}

/// Main proxy handler.
/// Selects a live backend and forwards the request to it.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = upstream::request_id(&request);
    let method = request.method().clone();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        uri = %request.uri(),
        version = ?request.version(),
        headers = ?request.headers(),
        "Received request"
    );

    // Selection is finished, and its lock released, before any I/O starts.
    let Some(backend) = state.registry.select_next() else {
        tracing::warn!(request_id = %request_id, "No available servers");
        metrics::record_request(method.as_str(), 503, "none", start_time);
        return DispatchError::NoBackend.into_response();
    };

    state.stats.record(&backend);

    let response = match forward(&state, &backend, request).await {
        Ok(response) => {
            tracing::debug!(
                request_id = %request_id,
                backend = %backend,
                status = %response.status(),
                "Response from server"
            );
            response
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, backend = %backend, error = %e, "Upstream error");
            e.into_response()
        }
    };

    metrics::record_request(
        method.as_str(),
        response.status().as_u16(),
        backend.authority(),
        start_time,
    );
    response
}

async fn forward(
    state: &AppState,
    backend: &Backend,
    request: Request<Body>,
) -> Result<Response, DispatchError> {
    let outbound = upstream::build_upstream_request(backend, request)?;

    let response = tokio::time::timeout(state.upstream_timeout, state.client.request(outbound))
        .await
        .map_err(|_| DispatchError::Timeout(state.upstream_timeout))??;

    Ok(relay(response))
}
