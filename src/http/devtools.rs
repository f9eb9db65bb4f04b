//! Devtools inspection endpoints.
//!
//! Mounted only when `devtools.enabled` is set. Read-only views of the
//! running server's declaration and rule table.

use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::routing::ProxyRule;

pub const OVERVIEW_PATH: &str = "/__devtools";
pub const MATCH_PATH: &str = "/__devtools/match";

#[derive(Debug, Serialize, Deserialize)]
pub struct Overview {
    pub version: String,
    pub compatibility_date: Option<String>,
    pub modules: Vec<String>,
    pub rules: Vec<RuleView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RuleView {
    pub prefix: String,
    pub target: String,
    pub secure: bool,
    pub tls_verification: String,
}

impl From<&ProxyRule> for RuleView {
    fn from(rule: &ProxyRule) -> Self {
        Self {
            prefix: rule.path_prefix().to_string(),
            target: rule.target().to_string(),
            secure: rule.secure(),
            tls_verification: rule.tls_verification().as_str().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MatchQuery {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchView {
    pub path: String,
    pub rule: Option<RuleView>,
    pub upstream: Option<String>,
}

pub async fn overview(State(state): State<AppState>) -> Json<Overview> {
    Json(Overview {
        version: env!("CARGO_PKG_VERSION").to_string(),
        compatibility_date: state.inspection.compatibility_date.clone(),
        modules: state.inspection.modules.clone(),
        rules: state.rules.rules().iter().map(RuleView::from).collect(),
    })
}

/// Which rule would handle `?path=`, and where it would go.
pub async fn match_route(
    State(state): State<AppState>,
    Query(query): Query<MatchQuery>,
) -> Response {
    let uri: Uri = match query.path.parse() {
        Ok(uri) => uri,
        Err(e) => return (StatusCode::BAD_REQUEST, format!("invalid path: {}", e)).into_response(),
    };

    let rule = state.rules.match_path(uri.path());
    let upstream = rule
        .and_then(|r| r.upstream_uri(&uri).ok())
        .map(|u| u.to_string());

    Json(MatchView {
        path: query.path,
        rule: rule.map(RuleView::from),
        upstream,
    })
    .into_response()
}
