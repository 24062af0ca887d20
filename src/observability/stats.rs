//! Request counters behind the `/lb-stats` report.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::load_balancer::{Backend, Registry};

/// Process-lifetime request counters. Per-backend counts live on each backend.
#[derive(Debug, Default)]
pub struct RequestStats {
    total: AtomicU64,
}

impl RequestStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one dispatched request against `backend`.
    pub fn record(&self, backend: &Backend) {
        self.total.fetch_add(1, Ordering::Relaxed);
        backend.record_request();
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Render the plain-text report: totals, distribution, health.
    pub fn report(&self, registry: &Registry) -> String {
        let total = self.total();
        let mut out = String::new();

        // Writing to a String cannot fail.
        let _ = writeln!(out, "Load Balancer Statistics:\n");
        let _ = writeln!(out, "Total Requests: {}\n", total);
        let _ = writeln!(out, "Distribution:");
        for backend in registry.backends() {
            let count = backend.request_count();
            let percent = if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            let _ = writeln!(out, "  {}: {} requests ({:.1}%)", backend, count, percent);
        }

        let _ = writeln!(out, "\nServer Health:");
        for backend in registry.backends() {
            let status = if backend.is_alive() { "UP" } else { "DOWN" };
            let _ = writeln!(out, "  {}: {}", backend, status);
        }
        out
    }
}
