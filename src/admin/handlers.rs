use axum::extract::State;

use crate::http::server::AppState;

/// Plain-text load balancer report.
pub async fn lb_stats(State(state): State<AppState>) -> String {
    state.stats.report(&state.registry)
}
