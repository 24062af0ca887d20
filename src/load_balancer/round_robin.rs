//! Round-robin load balancing strategy with live-skip.

use std::sync::{Arc, Mutex};

use crate::load_balancer::{backend::Backend, LoadBalancer};

/// Round-robin selector.
///
/// Holds the rotation cursor: the position of the last backend returned.
/// It starts at 0, which counts as already consumed, so the first pick over
/// an all-alive ring is index 1.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: Mutex<usize>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobin {
    fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        let len = backends.len();
        if len == 0 {
            return None;
        }

        // The whole scan is one critical section. A poisoned lock still holds
        // a valid index, so keep using it.
        let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());

        // Up to N probes; with everything dead the cursor ends where it began.
        for _ in 0..len {
            *cursor = (*cursor + 1) % len;
            let backend = &backends[*cursor];
            if backend.is_alive() {
                return Some(Arc::clone(backend));
            }
        }
        None
    }
}
