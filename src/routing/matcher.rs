//! Route matching logic.
//!
//! # Responsibilities
//! - Match host (exact match, case-insensitive)
//! - Match path prefix on segment boundaries (case-sensitive)
//! - Match file extension of the final path segment
//! - Combine conditions with OR semantics
//!
//! # Design Decisions
//! - Matchers operate on the normalized `RequestTarget`, never the raw URI
//! - Host matching is case-insensitive (RFC 9110)
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching

use std::collections::HashSet;

use crate::assets::AssetPath;
use crate::http::RequestTarget;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, target: &RequestTarget) -> bool;
}

/// Matches the request host.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    expected_host: String,
}

impl HostMatcher {
    /// Create a new host matcher.
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            expected_host: host.into().to_lowercase(),
        }
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, target: &RequestTarget) -> bool {
        target
            .host()
            .map(|h| h.to_lowercase() == self.expected_host)
            .unwrap_or(false)
    }
}

/// Matches a path prefix on segment boundaries: `/docs` matches `/docs` and
/// `/docs/intro`, but not `/docsify`.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher. Trailing slashes are ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The remainder of `path` after the prefix, if it matches.
    /// The remainder is empty or starts with `/`.
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, target: &RequestTarget) -> bool {
        self.strip(target.path()).is_some()
    }
}

/// Matches a raw string prefix (used for asset directories like `/_app/`).
#[derive(Debug, Clone)]
pub struct RawPrefixMatcher {
    prefix: String,
}

impl RawPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for RawPrefixMatcher {
    fn matches(&self, target: &RequestTarget) -> bool {
        target.path().starts_with(&self.prefix)
    }
}

/// Matches exact paths.
#[derive(Debug, Clone, Default)]
pub struct ExactPathMatcher {
    paths: HashSet<String>,
}

impl ExactPathMatcher {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl Matcher for ExactPathMatcher {
    fn matches(&self, target: &RequestTarget) -> bool {
        self.paths.contains(target.path())
    }
}

/// Matches the extension of the final path segment (case-insensitive).
#[derive(Debug, Clone, Default)]
pub struct ExtensionMatcher {
    extensions: HashSet<String>,
}

impl ExtensionMatcher {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }
}

impl Matcher for ExtensionMatcher {
    fn matches(&self, target: &RequestTarget) -> bool {
        AssetPath::new(target.path())
            .extension()
            .map(|ext| self.extensions.contains(&ext))
            .unwrap_or(false)
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, target: &RequestTarget) -> bool {
        // Any matcher may claim the request (OR)
        self.matchers.iter().any(|m| m.matches(target))
    }
}
