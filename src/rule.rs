//! Prefix rewrite rules for import paths.

use crate::error::{Error, Result};

/// Replaces a leading import-path prefix with another one.
///
/// A path matches when it equals `old` or continues past `old` with a `/`,
/// so `example.com/foo` never matches `example.com/foobar`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    old: String,
    new: String,
}

impl RewriteRule {
    /// Creates a rule, rejecting empty or identical prefixes.
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Result<Self> {
        let old = old.into();
        let new = new.into();

        if old.is_empty() || new.is_empty() {
            return Err(Error::InvalidRule(
                "old and new prefixes must not be empty".to_string(),
            ));
        }
        if old == new {
            return Err(Error::InvalidRule(format!(
                "old and new prefixes are identical ('{}')",
                old
            )));
        }

        Ok(Self { old, new })
    }

    pub fn old_prefix(&self) -> &str {
        &self.old
    }

    pub fn new_prefix(&self) -> &str {
        &self.new
    }

    /// Returns the rewritten path if `path` starts with the old prefix at a
    /// segment boundary.
    pub fn apply(&self, path: &str) -> Option<String> {
        let rest = path.strip_prefix(self.old.as_str())?;
        if rest.is_empty() || rest.starts_with('/') || self.old.ends_with('/') {
            Some(format!("{}{}", self.new, rest))
        } else {
            None
        }
    }

    /// Whether the new prefix itself matches the old one, in which case a
    /// second run would rewrite the already rewritten paths again.
    pub fn is_reentrant(&self) -> bool {
        self.apply(&self.new).is_some()
    }
}
