//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the backend response to the client (status, headers, streamed body)
//! - Map dispatch failures to HTTP status codes
//!
//! # Design Decisions
//! - Streaming responses avoid buffering the entire body
//! - Hop-by-hop headers are dropped, everything else is appended as-is
//! - A body error after the head is sent only cuts the connection short

use std::time::Duration;

use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use hyper::body::Incoming;
use thiserror::Error;

use crate::http::request::copy_headers;

/// Why a request could not be relayed.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("No available servers")]
    NoBackend,

    #[error("Failed to build upstream request: {0}")]
    Build(#[from] axum::http::Error),

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("Upstream did not respond within {0:?}")]
    Timeout(Duration),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::NoBackend => StatusCode::SERVICE_UNAVAILABLE,
            DispatchError::Build(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DispatchError::Upstream(_) | DispatchError::Timeout(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Turn a backend response into the client response.
pub fn relay(upstream: Response<Incoming>) -> Response<Body> {
    let (parts, body) = upstream.into_parts();

    let mut response = Response::new(Body::new(body));
    *response.status_mut() = parts.status;
    copy_headers(&parts.headers, response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_mapping() {
        assert_eq!(DispatchError::NoBackend.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            DispatchError::Timeout(Duration::from_secs(1)).status(),
            StatusCode::BAD_GATEWAY
        );

        let build_err = axum::http::Request::builder()
            .uri("http://[bad")
            .body(())
            .unwrap_err();
        assert_eq!(
            DispatchError::from(build_err).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn no_backend_body_names_the_condition() {
        let response = DispatchError::NoBackend.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
