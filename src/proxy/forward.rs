//! Request forwarding.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the rule's target (prefix kept)
//! - Rewrite Host to the target authority, keep every other end-to-end header
//! - Stream the body both ways
//! - Hand the upstream response back unchanged apart from hop-by-hop headers
//!
//! # Design Decisions
//! - No retries, no timeout override: a failed connect is a 502
//! - Upstream requests always go out as HTTP/1.1

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName};
use axum::http::{Request, Response};
use hyper::body::Incoming;

use crate::proxy::client::UpstreamClient;
use crate::proxy::error::ProxyError;
use crate::routing::ProxyRule;

/// Connection-scoped headers that never cross the proxy.
static HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Forward a matched request to the rule's target.
pub async fn forward(
    client: &UpstreamClient,
    rule: &ProxyRule,
    request: Request<Body>,
) -> Result<Response<Body>, ProxyError> {
    let (mut parts, body) = request.into_parts();

    let uri = rule
        .upstream_uri(&parts.uri)
        .map_err(|source| ProxyError::Request {
            target: rule.target().to_string(),
            source,
        })?;

    strip_hop_by_hop(&mut parts.headers);
    parts.headers.insert(header::HOST, rule.host_header().clone());

    tracing::debug!(
        prefix = rule.path_prefix(),
        method = %parts.method,
        upstream = %uri,
        "Forwarding request"
    );

    let mut upstream = Request::new(body);
    *upstream.method_mut() = parts.method;
    *upstream.uri_mut() = uri;
    *upstream.headers_mut() = parts.headers;

    let response = client
        .for_rule(rule)
        .request(upstream)
        .await
        .map_err(|source| ProxyError::Upstream {
            target: rule.target().to_string(),
            source,
        })?;

    Ok(into_client_response(response))
}

fn into_client_response(response: Response<Incoming>) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}
