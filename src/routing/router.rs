//! Rule table lookup.
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - Rules kept sorted by descending prefix length, so the first hit is the
//!   longest matching prefix
//! - Explicit `None` for "not proxied" rather than a silent default

use crate::config::ProxyTable;
use crate::routing::rule::{ProxyRule, RouteError};

/// The compiled proxy rule table.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<ProxyRule>,
}

impl RuleTable {
    /// Compile every entry of the declared table.
    pub fn from_config(table: &ProxyTable) -> Result<Self, RouteError> {
        let rules = table
            .iter()
            .map(|(prefix, target)| ProxyRule::parse(prefix, target))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_rules(rules))
    }

    pub fn from_rules(mut rules: Vec<ProxyRule>) -> Self {
        rules.sort_by(|a, b| {
            b.matcher()
                .specificity()
                .cmp(&a.matcher().specificity())
                .then_with(|| a.path_prefix().cmp(b.path_prefix()))
        });
        Self { rules }
    }

    /// Longest-prefix match for a request path.
    pub fn match_path(&self, path: &str) -> Option<&ProxyRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    /// Rules in precedence order.
    pub fn rules(&self) -> &[ProxyRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
