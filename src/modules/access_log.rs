//! Per-request access logging.

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::http::request::X_REQUEST_ID;
use crate::modules::DevModule;

pub const ID: &str = "access-log";

/// The `access-log` module: one span per request, tagged with its request id.
pub struct AccessLogModule;

impl DevModule for AccessLogModule {
    fn id(&self) -> &'static str {
        ID
    }

    fn wrap(&self, router: Router) -> Router {
        router.layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<Body>| {
                    let request_id = req
                        .headers()
                        .get(X_REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        path = %req.uri().path(),
                        request_id = %request_id,
                    )
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
    }
}
