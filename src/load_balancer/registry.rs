//! Backend registry.
//!
//! # Responsibilities
//! - Own the fixed, ordered list of backends (the rotation ring)
//! - Apply the load balancing algorithm to select a live backend
//! - Provide the full list for health checking and stats

use std::sync::Arc;

use crate::config::validation::{parse_backend_address, ValidationError};
use crate::load_balancer::{backend::Backend, round_robin::RoundRobin, LoadBalancer};

/// The ordered set of backends plus the selector that rotates over them.
#[derive(Debug)]
pub struct Registry {
    backends: Vec<Arc<Backend>>,
    selector: Box<dyn LoadBalancer>,
}

impl Registry {
    /// Create a registry over `backends`, in rotation order.
    pub fn new(backends: Vec<Arc<Backend>>) -> Self {
        Self {
            backends,
            selector: Box::new(RoundRobin::new()),
        }
    }

    /// Parse every address and build the ring. Fails on the first bad address.
    pub fn from_addresses<S: AsRef<str>>(addresses: &[S]) -> Result<Self, ValidationError> {
        let mut backends = Vec::with_capacity(addresses.len());
        for address in addresses {
            let url = parse_backend_address(address.as_ref())?;
            tracing::info!(backend = %url, "Added backend server");
            backends.push(Arc::new(Backend::new(url)));
        }
        Ok(Self::new(backends))
    }

    /// Pick the next live backend in rotation, or `None` if none is alive.
    pub fn select_next(&self) -> Option<Arc<Backend>> {
        let selected = self.selector.next_server(&self.backends);
        if selected.is_none() {
            tracing::debug!(backend_count = self.backends.len(), "No live backends found");
            for b in &self.backends {
                tracing::debug!(backend = %b, alive = b.is_alive(), "Backend status");
            }
        }
        selected
    }

    /// All backends in rotation order.
    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
