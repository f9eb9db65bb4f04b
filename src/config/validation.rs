//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every proxy entry must compile into a rule
//! - Check value formats (dates, bind address, log format)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DevServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::DevServerConfig;
use crate::routing::{ProxyRule, RouteError};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("compatibility_date `{0}` is not a YYYY-MM-DD date")]
    CompatibilityDate(String),

    #[error("module identifier at position {0} is empty")]
    EmptyModule(usize),

    #[error("module `{0}` is listed more than once")]
    DuplicateModule(String),

    #[error("dev_server bind address `{0}` is invalid")]
    BindAddress(String),

    #[error("observability.log_format `{0}` is not one of: pretty, json")]
    LogFormat(String),
}

/// Check a parsed config, collecting every problem found.
pub fn validate_config(config: &DevServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (prefix, target) in config.proxy() {
        if let Err(e) = ProxyRule::parse(prefix, target) {
            errors.push(e.into());
        }
    }

    if let Some(date) = &config.compatibility_date {
        if !is_calendar_date(date) {
            errors.push(ValidationError::CompatibilityDate(date.clone()));
        }
    }

    let mut seen = HashSet::new();
    for (i, id) in config.modules.iter().enumerate() {
        if id.trim().is_empty() {
            errors.push(ValidationError::EmptyModule(i));
        } else if !seen.insert(id.as_str()) {
            errors.push(ValidationError::DuplicateModule(id.clone()));
        }
    }

    let bind = config.dev_server.bind_address();
    if bind.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(bind));
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::LogFormat(other.to_string())),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_calendar_date(s: &str) -> bool {
    let parts: Vec<&str> = s.split('-').collect();
    let &[year, month, day] = parts.as_slice() else {
        return false;
    };
    if year.len() != 4 || month.len() != 2 || day.len() != 2 {
        return false;
    }
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if !(all_digits(year) && all_digits(month) && all_digits(day)) {
        return false;
    }
    let month: u32 = month.parse().unwrap_or(0);
    let day: u32 = day.parse().unwrap_or(0);
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyTargetConfig;

    fn base() -> DevServerConfig {
        let mut config = DevServerConfig::default();
        config.compatibility_date = Some("2024-04-03".into());
        config.modules = vec!["lint".into()];
        config.vite.server.proxy.insert(
            "/api/".into(),
            ProxyTargetConfig::Options {
                target: "http://localhost:8080".into(),
                secure: false,
            },
        );
        config
    }

    #[test]
    fn reference_declaration_is_valid() {
        assert!(validate_config(&base()).is_ok());
    }

    #[test]
    fn empty_prefix_is_rejected() {
        let mut config = base();
        config
            .vite
            .server
            .proxy
            .insert("".into(), ProxyTargetConfig::Url("http://localhost:9000".into()));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ValidationError::Route(RouteError::EmptyPrefix)
        ));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = base();
        config.compatibility_date = Some("April 3rd".into());
        config.modules = vec!["lint".into(), "".into(), "lint".into()];
        config.dev_server.host = "not a host".into();
        config.observability.log_format = "xml".into();
        config
            .vite
            .server
            .proxy
            .insert("/bad/".into(), ProxyTargetConfig::Url("ftp://files.test".into()));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn calendar_dates() {
        assert!(is_calendar_date("2024-04-03"));
        assert!(!is_calendar_date("2024-4-3"));
        assert!(!is_calendar_date("2024-13-01"));
        assert!(!is_calendar_date("2024-04-03-01"));
        assert!(!is_calendar_date("yyyy-mm-dd"));
    }
}
