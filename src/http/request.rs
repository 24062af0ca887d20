//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) unless the caller sent one
//! - Rewrite the target to the selected backend, keeping path and query
//! - Copy method, headers and the streaming body into the outbound request
//!
//! # Design Decisions
//! - Headers are appended, so multi-valued headers survive intact
//! - Hop-by-hop headers and `host` are not forwarded; the client derives
//!   `host` from the rewritten URI

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::response::DispatchError;
use crate::load_balancer::Backend;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Headers that describe a single connection and never cross the proxy.
const HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Request ID generator for `tower_http::request_id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID set by the request-id layer.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name)
}

/// Append every end-to-end header of `src` onto `dst`.
pub fn copy_headers(src: &HeaderMap, dst: &mut HeaderMap) {
    for (name, value) in src.iter() {
        if !is_hop_by_hop(name) {
            dst.append(name.clone(), value.clone());
        }
    }
}

/// The backend's scheme and authority joined with the inbound path and query.
pub fn upstream_uri(backend: &Backend, inbound: &Uri) -> Result<Uri, axum::http::Error> {
    let path_and_query = inbound
        .path_and_query()
        .map(|pq| pq.as_str())
        .filter(|pq| !pq.is_empty())
        .unwrap_or("/");

    Uri::builder()
        .scheme(backend.url().scheme())
        .authority(backend.authority())
        .path_and_query(path_and_query)
        .build()
}

/// Build the request sent to `backend` from the inbound one.
pub fn build_upstream_request(
    backend: &Backend,
    request: Request<Body>,
) -> Result<Request<Body>, DispatchError> {
    let (parts, body) = request.into_parts();
    let uri = upstream_uri(backend, &parts.uri)?;

    let mut builder = Request::builder().method(parts.method).uri(uri);
    if let Some(headers) = builder.headers_mut() {
        copy_headers(&parts.headers, headers);
        headers.remove(header::HOST);
    }

    Ok(builder.body(body)?)
}
