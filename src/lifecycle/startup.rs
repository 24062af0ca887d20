//! Startup orchestration.

use tokio::net::TcpListener;

use crate::config::{BalancerConfig, ConfigError};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;

/// Validate `config`, bind the listener and serve until `shutdown` fires.
///
/// Nothing binds unless the configuration is accepted.
pub async fn serve(config: BalancerConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    let server = HttpServer::new(config)?;

    let bind_address = server.config().listener.bind_address();
    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        backends = server.registry().len(),
        health_path = %server.config().health_check.path,
        health_interval_secs = server.config().health_check.interval_secs,
        "Load balancer starting"
    );

    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),
}
