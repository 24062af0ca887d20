//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Immediate first cycle, then a fixed interval
//!     → GET <backend><health path> on every backend
//!     → Backend::set_alive(status == 200)
//! ```
//!
//! # Design Decisions
//! - Only the health monitor changes liveness; forwarding errors never do
//! - One probe decides: no thresholds, no backoff
//! - A failed probe only flips liveness, it never surfaces as an error

pub mod active;

pub use active::HealthMonitor;
