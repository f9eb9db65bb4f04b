//! Proxy error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to initialise TLS client config: {0}")]
    Tls(#[from] rustls::Error),

    #[error("cannot build upstream request for {target}: {source}")]
    Request {
        target: String,
        source: axum::http::Error,
    },

    #[error("upstream {target} unreachable: {source}")]
    Upstream {
        target: String,
        source: hyper_util::client::legacy::Error,
    },
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ProxyError::Upstream { .. } => {
                (StatusCode::BAD_GATEWAY, "Bad gateway: upstream unreachable")
            }
            ProxyError::Request { .. } | ProxyError::Tls(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Proxy request could not be built")
            }
        };
        (status, message).into_response()
    }
}
