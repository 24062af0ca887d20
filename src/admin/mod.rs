pub mod handlers;

/// Reserved path, answered by the balancer and never forwarded.
pub const STATS_PATH: &str = "/lb-stats";
