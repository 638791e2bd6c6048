//! Per-user key scoping.
//!
//! A user's records live under `"{user}_{raw}"`; with no active user the raw
//! key is used unchanged (anonymous/global scope). The identity is always an
//! explicit argument, never read from ambient state, so a login or logout
//! between two calls can never leave a stale namespace behind.

use crate::core::error::LectioError;
use crate::core::schemas::CONTENT_CACHE_MARKER;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated, trimmed username.
///
/// Underscores are rejected: `_` is the namespace separator, and allowing it
/// would let one user's prefix (`ann_`) cover another's keys (`ann_b_...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: &str) -> Result<Self, LectioError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(LectioError::ValidationError(
                "username must not be empty".to_string(),
            ));
        }
        let re = Regex::new(r"^[\p{L}\p{N}][\p{L}\p{N} .\-]*$")
            .map_err(|e| LectioError::ValidationError(e.to_string()))?;
        if !re.is_match(name) {
            return Err(LectioError::ValidationError(format!(
                "invalid username '{name}': use letters, digits, spaces, '.' or '-'"
            )));
        }
        // Keys under this prefix belong to the disposable content cache.
        if name.starts_with(CONTENT_CACHE_MARKER) {
            return Err(LectioError::ValidationError(format!(
                "invalid username '{name}': reserved prefix '{CONTENT_CACHE_MARKER}'"
            )));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix shared by every key this user owns.
    pub fn key_prefix(&self) -> String {
        format!("{}_", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = LectioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UserId::new(&value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

pub fn namespaced_key(user: Option<&UserId>, raw_key: &str) -> String {
    match user {
        Some(user) => format!("{}_{}", user.as_str(), raw_key),
        None => raw_key.to_string(),
    }
}
