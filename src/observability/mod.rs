//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!     → stats.rs (request counters for /lb-stats)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every dispatch log line
//! - Counters are atomic increments, never locks

pub mod logging;
pub mod metrics;
pub mod stats;

pub use stats::RequestStats;
