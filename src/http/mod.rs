//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID + trace layers)
//!     → /lb-stats answered locally, everything else dispatched
//!     → load balancer picks a live backend
//!     → request.rs (rewrite target, copy headers, stream body)
//!     → client.rs (outbound call, bounded by the upstream timeout)
//!     → response.rs (relay status/headers/body or map the error)
//!     → Send to client
//! ```

pub mod client;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::DispatchError;
pub use server::HttpServer;
