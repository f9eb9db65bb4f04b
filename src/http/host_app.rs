//! The host application: whatever no proxy rule claims.

use std::convert::Infallible;
use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;

#[derive(Debug, Clone)]
pub enum HostApp {
    /// Files from `dev_server.static_dir`.
    Static(ServeDir),
    /// No directory configured; everything unproxied is a 404.
    Placeholder,
}

impl HostApp {
    pub fn new(static_dir: Option<PathBuf>) -> Self {
        match static_dir {
            Some(dir) => HostApp::Static(ServeDir::new(dir)),
            None => HostApp::Placeholder,
        }
    }

    pub async fn serve(&self, request: Request<Body>) -> Response {
        match self {
            HostApp::Static(dir) => {
                let result: Result<_, Infallible> = dir.clone().oneshot(request).await;
                match result {
                    Ok(response) => response.map(Body::new),
                    Err(never) => match never {},
                }
            }
            HostApp::Placeholder => (
                StatusCode::NOT_FOUND,
                "Not found: no proxy rule matched and no static_dir is configured",
            )
                .into_response(),
        }
    }
}
