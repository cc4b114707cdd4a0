//! Path prefix matching.
//!
//! # Responsibilities
//! - Normalize raw request paths before lookup
//! - Match literal path prefixes (case-sensitive)
//! - Yield the path remainder for nested dispatch
//!
//! # Design Decisions
//! - Paths are matched slash-relative; prefixes carry no leading '/'
//! - Empty prefix = always matches (fallthrough delegation)
//! - No regex or pattern converters to guarantee O(n) matching

use std::borrow::Cow;

/// A literal path prefix as written in the mount table.
///
/// Matching is plain string-prefix: `admin/` matches `admin/login/` but not
/// `administrator` (the trailing slash is part of the prefix). A prefix
/// without a trailing slash may match mid-segment; whether that is wanted is
/// the table author's call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefix {
    prefix: String,
}

impl PathPrefix {
    /// Create a new path prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The literal prefix text.
    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    /// True for the empty prefix, which matches every path.
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Returns true if the (normalized) path starts with this prefix.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// Strip the prefix from a matching path, returning the remainder that
    /// nested tables or the destination continue dispatching on.
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(self.prefix.as_str())
    }
}

impl std::fmt::Display for PathPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix)
    }
}

/// Normalize a raw request path for table lookup.
///
/// Strips leading slashes and collapses runs of slashes. Percent-decoding
/// and dot-segment resolution are left to the destination applications.
pub fn normalize_path(raw: &str) -> Cow<'_, str> {
    let trimmed = raw.trim_start_matches('/');
    if !trimmed.contains("//") {
        return Cow::Borrowed(trimmed);
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut prev_slash = false;
    for c in trimmed.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(c);
    }
    Cow::Owned(out)
}
