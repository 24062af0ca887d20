//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → registry.rs (the fixed backend ring)
//!     → round_robin.rs (advance cursor, skip dead backends)
//!     → backend.rs (liveness flag, request counter)
//!     → Return selected backend or None
//! ```
//!
//! # Design Decisions
//! - Ring order is fixed at startup; no runtime add/remove
//! - Liveness is per-backend, the cursor is per-registry
//! - Selection never touches the network

pub mod backend;
pub mod registry;
pub mod round_robin;

use std::sync::Arc;

pub use backend::Backend;
pub use registry::Registry;

/// A backend selection algorithm.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Pick a live backend from `backends`, or `None` if there is none.
    fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>>;
}
