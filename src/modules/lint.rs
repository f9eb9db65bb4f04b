//! Configuration lint module.
//!
//! Reviews the proxy table at startup and reports risky or surprising
//! declarations. Findings never change routing; with `lint.deny_warnings`
//! a warning fails startup instead of only being logged.

use url::Host;

use crate::config::DevServerConfig;
use crate::modules::{DevModule, ModuleError};
use crate::routing::{ProxyRule, TlsVerification};

pub const ID: &str = "lint";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub rule: &'static str,
    pub severity: Severity,
    pub prefix: String,
    pub message: String,
}

/// Lint every compilable proxy entry.
pub fn check(config: &DevServerConfig) -> Vec<Finding> {
    let rules: Vec<ProxyRule> = config
        .proxy()
        .iter()
        .filter_map(|(prefix, target)| ProxyRule::parse(prefix, target).ok())
        .collect();

    let mut findings = Vec::new();

    for rule in &rules {
        let prefix = rule.path_prefix().to_string();
        let target = rule.target();

        match rule.tls_verification() {
            TlsVerification::Disabled => findings.push(Finding {
                rule: "insecure-tls",
                severity: Severity::Warning,
                prefix: prefix.clone(),
                message: format!(
                    "certificate verification is off for {}; only point this at a local or self-signed backend",
                    target
                ),
            }),
            TlsVerification::NotApplicable if !rule.secure() => findings.push(Finding {
                rule: "secure-noop",
                severity: Severity::Info,
                prefix: prefix.clone(),
                message: format!("`secure = false` has no effect on plain-http target {}", target),
            }),
            _ => {}
        }

        if !is_loopback(target.host()) {
            findings.push(Finding {
                rule: "remote-target",
                severity: Severity::Warning,
                prefix: prefix.clone(),
                message: format!("forwards to non-local host {}", target.host_str().unwrap_or("")),
            });
        }

        if !rule.matcher().is_segment_bounded() {
            findings.push(Finding {
                rule: "prefix-boundary",
                severity: Severity::Warning,
                prefix: prefix.clone(),
                message: format!(
                    "`{0}` also matches sibling paths such as `{0}x`; end it with `/`",
                    prefix
                ),
            });
        }

        for other in &rules {
            if other.path_prefix() != prefix && other.path_prefix().starts_with(&prefix) {
                findings.push(Finding {
                    rule: "shadowed-prefix",
                    severity: Severity::Info,
                    prefix: prefix.clone(),
                    message: format!(
                        "`{}` takes precedence for paths under it",
                        other.path_prefix()
                    ),
                });
            }
        }
    }

    findings
}

fn is_loopback(host: Option<Host<&str>>) -> bool {
    match host {
        Some(Host::Domain(domain)) => {
            domain.eq_ignore_ascii_case("localhost") || domain.ends_with(".localhost")
        }
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

/// The `lint` module.
pub struct LintModule;

impl DevModule for LintModule {
    fn id(&self) -> &'static str {
        ID
    }

    fn setup(&self, config: &DevServerConfig) -> Result<(), ModuleError> {
        let findings = check(config);

        for finding in &findings {
            match finding.severity {
                Severity::Warning => tracing::warn!(
                    lint = finding.rule,
                    prefix = %finding.prefix,
                    "{}",
                    finding.message
                ),
                Severity::Info => tracing::info!(
                    lint = finding.rule,
                    prefix = %finding.prefix,
                    "{}",
                    finding.message
                ),
            }
        }

        let warnings = findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count();
        if config.lint.deny_warnings && warnings > 0 {
            return Err(ModuleError::Setup {
                module: ID,
                message: format!("{} lint warning(s) with deny_warnings set", warnings),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyTargetConfig;

    fn config(entries: &[(&str, &str, bool)]) -> DevServerConfig {
        let mut config = DevServerConfig::default();
        for (prefix, target, secure) in entries {
            config.vite.server.proxy.insert(
                prefix.to_string(),
                ProxyTargetConfig::Options {
                    target: target.to_string(),
                    secure: *secure,
                },
            );
        }
        config
    }

    fn rules_hit(config: &DevServerConfig) -> Vec<&'static str> {
        check(config).into_iter().map(|f| f.rule).collect()
    }

    #[test]
    fn local_plain_http_only_notes_noop() {
        let config = config(&[("/api/", "http://localhost:8080", false)]);
        let findings = check(&config);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, "secure-noop");
        assert_eq!(findings[0].severity, Severity::Info);
    }

    #[test]
    fn flags_insecure_tls_and_remote_hosts() {
        let config = config(&[("/api/", "https://staging.example.com", false)]);
        assert_eq!(rules_hit(&config), vec!["insecure-tls", "remote-target"]);
    }

    #[test]
    fn flags_unbounded_and_shadowed_prefixes() {
        let config = config(&[
            ("/api", "http://127.0.0.1:8080", true),
            ("/api/v2/", "http://[::1]:8081", true),
        ]);
        assert_eq!(rules_hit(&config), vec!["prefix-boundary", "shadowed-prefix"]);
    }

    #[test]
    fn deny_warnings_fails_setup() {
        let mut config = config(&[("/api/", "https://127.0.0.1:8443", false)]);
        assert!(LintModule.setup(&config).is_ok());

        config.lint.deny_warnings = true;
        assert!(matches!(
            LintModule.setup(&config),
            Err(ModuleError::Setup { module: "lint", .. })
        ));
    }
}
