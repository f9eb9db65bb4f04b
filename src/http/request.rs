//! Request ID handling.
//!
//! # Design Decisions
//! - Request ID added as early as possible (outermost layer) for tracing
//! - An inbound `x-request-id` is kept; otherwise a UUID v4 is generated
//! - The header is forwarded upstream and echoed on the response

use axum::http::{HeaderName, HeaderValue, Request};
use axum::Router;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Wrap the router so every request carries an id.
pub fn with_request_id(router: Router) -> Router {
    let header = HeaderName::from_static(X_REQUEST_ID);
    router
        .layer(PropagateRequestIdLayer::new(header.clone()))
        .layer(SetRequestIdLayer::new(header, UuidRequestId))
}
