//! Configuration schema definitions.
//!
//! This module defines the complete dev server declaration. All types derive
//! Serde traits for deserialization from the TOML config file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration for the dev server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct DevServerConfig {
    /// Versioned baseline of default behaviors. Informational only.
    #[serde(alias = "compatibilityDate")]
    pub compatibility_date: Option<String>,

    /// Inspection panel toggle.
    pub devtools: DevtoolsConfig,

    /// Module identifiers, loaded in order before serving.
    pub modules: Vec<String>,

    /// Listener and host app settings.
    pub dev_server: DevServerSettings,

    /// Build-tool section holding the proxy rule table.
    pub vite: ViteConfig,

    /// Settings for the `lint` module.
    pub lint: LintConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

impl DevServerConfig {
    /// The declared proxy rule table, keyed by path prefix.
    pub fn proxy(&self) -> &ProxyTable {
        &self.vite.server.proxy
    }
}

/// Devtools configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct DevtoolsConfig {
    pub enabled: bool,
}

/// Listener configuration and host app location.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DevServerSettings {
    /// Interface to bind (e.g., "127.0.0.1").
    pub host: String,

    /// Port to bind. 0 picks a free port.
    pub port: u16,

    /// Directory served for requests no proxy rule handles.
    pub static_dir: Option<PathBuf>,
}

impl DevServerSettings {
    /// Address string handed to the listener.
    pub fn bind_address(&self) -> String {
        if self.host.eq_ignore_ascii_case("localhost") {
            format!("127.0.0.1:{}", self.port)
        } else if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for DevServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: None,
        }
    }
}

/// `[vite]` section.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ViteConfig {
    pub server: ViteServerConfig,
}

/// `[vite.server]` section.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ViteServerConfig {
    pub proxy: ProxyTable,
}

/// Path prefix to target descriptor. Keys are unique by construction.
pub type ProxyTable = BTreeMap<String, ProxyTargetConfig>;

/// Target descriptor for one proxy rule.
///
/// Accepts either the shorthand `"/api/" = "http://localhost:8080"` or the
/// full table form with `target` and `secure`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ProxyTargetConfig {
    Url(String),
    Options {
        target: String,
        /// Verify TLS certificates of https targets.
        #[serde(default = "default_secure")]
        secure: bool,
    },
}

impl ProxyTargetConfig {
    pub fn target(&self) -> &str {
        match self {
            ProxyTargetConfig::Url(target) => target,
            ProxyTargetConfig::Options { target, .. } => target,
        }
    }

    pub fn secure(&self) -> bool {
        match self {
            ProxyTargetConfig::Url(_) => true,
            ProxyTargetConfig::Options { secure, .. } => *secure,
        }
    }
}

fn default_secure() -> bool {
    true
}

/// Lint module configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct LintConfig {
    /// Treat warning-level findings as startup errors.
    pub deny_warnings: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Output format: "pretty" or "json".
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}
