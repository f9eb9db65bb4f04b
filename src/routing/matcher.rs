//! Path prefix matching.
//!
//! # Design Decisions
//! - Path matching is case-sensitive and byte-wise
//! - No regex, no segment normalization
//! - Specificity is the prefix length; the router uses it for precedence

/// Matches the request path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// Longer prefixes are more specific.
    pub fn specificity(&self) -> usize {
        self.prefix.len()
    }

    /// True when the prefix ends on a segment boundary, so `/api/` cannot
    /// match `/apiary`.
    pub fn is_segment_bounded(&self) -> bool {
        self.prefix.ends_with('/')
    }
}
