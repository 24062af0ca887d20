//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server
//! - Track liveness (alive/dead) as last reported by the health monitor
//! - Count requests dispatched to it

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use url::Url;

/// A single backend server.
///
/// Liveness is an atomic flag scoped to this backend, so reads never contend
/// with each other and a write on one backend cannot stall readers of another.
#[derive(Debug)]
pub struct Backend {
    /// Base URL (scheme, host, port). Immutable after construction.
    url: Url,
    /// `host:port` label used in logs, metrics and the stats report.
    authority: String,
    alive: AtomicBool,
    requests: AtomicU64,
}

impl Backend {
    /// Create a new backend, initially alive.
    pub fn new(url: Url) -> Self {
        let authority = match (url.host_str(), url.port_or_known_default()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            _ => url.to_string(),
        };
        Self {
            url,
            authority,
            alive: AtomicBool::new(true),
            requests: AtomicU64::new(0),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `host:port` of this backend.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    // --- Health Logic ---

    /// Overwrite the liveness flag.
    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Release);
    }

    /// Current liveness flag.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    // --- Request accounting ---

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Requests dispatched to this backend since startup.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(addr: &str) -> Backend {
        Backend::new(Url::parse(addr).unwrap())
    }

    #[test]
    fn starts_alive() {
        assert!(backend("http://localhost:8080").is_alive());
    }

    #[test]
    fn set_alive_overwrites() {
        let b = backend("http://localhost:8080");
        b.set_alive(false);
        assert!(!b.is_alive());
        b.set_alive(false);
        assert!(!b.is_alive());
        b.set_alive(true);
        assert!(b.is_alive());
    }

    #[test]
    fn authority_includes_default_port() {
        assert_eq!(backend("http://example.com").authority(), "example.com:80");
        assert_eq!(backend("http://localhost:8081/").authority(), "localhost:8081");
    }

    #[test]
    fn request_counter_is_monotonic() {
        let b = backend("http://localhost:8080");
        assert_eq!(b.request_count(), 0);
        b.record_request();
        b.record_request();
        assert_eq!(b.request_count(), 2);
    }
}
