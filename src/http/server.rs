//! HTTP server setup.
//!
//! # Responsibilities
//! - Compile the rule table and load modules
//! - Create the Axum router: devtools routes, then a fallback dispatcher
//! - Dispatch: proxy rule match → upstream, otherwise → host app
//! - Wire up middleware (module layers, request ID)
//! - Serve until the shutdown signal

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::DevServerConfig;
use crate::http::devtools;
use crate::http::host_app::HostApp;
use crate::http::request::{with_request_id, X_REQUEST_ID};
use crate::lifecycle::StartupError;
use crate::modules::{self, LoadedModules};
use crate::proxy::{self, UpstreamClient};
use crate::routing::RuleTable;

/// What devtools reports about the running server.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub compatibility_date: Option<String>,
    pub modules: Vec<String>,
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub rules: Arc<RuleTable>,
    pub client: UpstreamClient,
    pub host_app: HostApp,
    pub inspection: Arc<Inspection>,
}

/// The dev server for one configuration generation.
pub struct DevServer {
    router: Router,
    config: DevServerConfig,
    rules: Arc<RuleTable>,
}

impl DevServer {
    /// Build everything the config describes. Nothing is bound yet.
    pub fn new(config: DevServerConfig) -> Result<Self, StartupError> {
        let rules = Arc::new(RuleTable::from_config(config.proxy())?);

        if let Some(dir) = &config.dev_server.static_dir {
            if !dir.is_dir() {
                return Err(StartupError::StaticDir(dir.clone()));
            }
        }

        let loaded = modules::load(&config)?;

        let state = AppState {
            rules: rules.clone(),
            client: UpstreamClient::new()?,
            host_app: HostApp::new(config.dev_server.static_dir.clone()),
            inspection: Arc::new(Inspection {
                compatibility_date: config.compatibility_date.clone(),
                modules: loaded.ids().into_iter().map(String::from).collect(),
            }),
        };

        for rule in rules.rules() {
            tracing::info!(
                prefix = rule.path_prefix(),
                target = %rule.target(),
                tls_verification = rule.tls_verification().as_str(),
                "Proxy rule"
            );
        }

        let router = Self::build_router(&config, state, &loaded);
        Ok(Self {
            router,
            config,
            rules,
        })
    }

    fn build_router(config: &DevServerConfig, state: AppState, loaded: &LoadedModules) -> Router {
        let mut router = Router::new();
        if config.devtools.enabled {
            router = router
                .route(devtools::OVERVIEW_PATH, get(devtools::overview))
                .route(devtools::MATCH_PATH, get(devtools::match_route));
        }
        let router = router.fallback(dispatch).with_state(state);

        with_request_id(loaded.wrap(router))
    }

    /// The assembled router, for serving or in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &DevServerConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, rules = self.rules.len(), "Dev server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!(address = %addr, "Dev server stopped");
        Ok(())
    }
}

/// Proxy when a rule matches, otherwise let the host app answer.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    match state.rules.match_path(request.uri().path()) {
        Some(rule) => {
            let request_id = request
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string();
            match proxy::forward(&state.client, rule, request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(
                        request_id = %request_id,
                        prefix = rule.path_prefix(),
                        error = %e,
                        "Proxy request failed"
                    );
                    e.into_response()
                }
            }
        }
        None => state.host_app.serve(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyTargetConfig;
    use crate::http::devtools::{MatchView, Overview};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn config_with(prefix: &str, target: &str) -> DevServerConfig {
        let mut config = DevServerConfig::default();
        config.vite.server.proxy.insert(
            prefix.to_string(),
            ProxyTargetConfig::Options {
                target: target.to_string(),
                secure: false,
            },
        );
        config
    }

    async fn send_get(router: Router, uri: &str) -> Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn unmatched_path_goes_to_placeholder() {
        let server = DevServer::new(config_with("/api/", "http://localhost:8080")).unwrap();

        let response = send_get(server.router(), "/other").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn unmatched_path_served_from_static_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("other"), "from the host app").unwrap();

        let mut config = config_with("/api/", "http://localhost:8080");
        config.dev_server.static_dir = Some(dir.path().to_path_buf());
        let server = DevServer::new(config).unwrap();

        let response = send_get(server.router(), "/other").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "from the host app");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_bad_gateway() {
        // Nothing listens on port 1.
        let server = DevServer::new(config_with("/api/", "http://127.0.0.1:1")).unwrap();

        let response = send_get(server.router(), "/api/users").await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn devtools_routes_follow_the_flag() {
        let mut config = config_with("/api/", "http://localhost:8080");
        config.compatibility_date = Some("2024-04-03".into());
        config.modules = vec!["lint".into()];

        let disabled = DevServer::new(config.clone()).unwrap();
        let response = send_get(disabled.router(), "/__devtools").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        config.devtools.enabled = true;
        let enabled = DevServer::new(config).unwrap();

        let response = send_get(enabled.router(), "/__devtools").await;
        assert_eq!(response.status(), StatusCode::OK);
        let overview: Overview = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(overview.compatibility_date.as_deref(), Some("2024-04-03"));
        assert_eq!(overview.modules, vec!["lint".to_string()]);
        assert_eq!(overview.rules.len(), 1);
        assert_eq!(overview.rules[0].tls_verification, "not-applicable");

        let response = send_get(enabled.router(), "/__devtools/match?path=/api/users").await;
        let view: MatchView = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(view.rule.unwrap().prefix, "/api/");
        assert_eq!(view.upstream.as_deref(), Some("http://localhost:8080/api/users"));

        let response = send_get(enabled.router(), "/__devtools/match?path=/other").await;
        let view: MatchView = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(view.rule.is_none());
        assert!(view.upstream.is_none());
    }

    #[tokio::test]
    async fn startup_fails_fast() {
        let err = DevServer::new(config_with("", "http://localhost:8080")).err().unwrap();
        assert!(matches!(err, StartupError::Route(_)));

        let mut config = config_with("/api/", "http://localhost:8080");
        config.modules = vec!["@nuxt/eslint".into()];
        assert!(matches!(DevServer::new(config), Err(StartupError::Module(_))));

        let mut config = config_with("/api/", "http://localhost:8080");
        config.dev_server.static_dir = Some("/definitely/not/here".into());
        assert!(matches!(DevServer::new(config), Err(StartupError::StaticDir(_))));
    }
}
