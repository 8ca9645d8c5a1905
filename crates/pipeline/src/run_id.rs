//! Validated run identifiers.
//!
//! A run id becomes a directory name, so it is checked once, on
//! construction, and every other API takes a `RunId` instead of a string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest accepted run id, in bytes
pub const MAX_RUN_ID_LEN: usize = 128;

/// A string was rejected as a run id
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid run id {value:?}: {reason}")]
pub struct InvalidRunId {
    pub value: String,
    pub reason: &'static str,
}

/// Identifier of one run.
///
/// Only ASCII letters, digits, `-` and `_` are allowed, which rules out
/// path separators, `.`/`..` and anything a shell or filesystem would
/// treat specially.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RunId(String);

impl RunId {
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidRunId> {
        let value = value.into();
        let reason = if value.is_empty() {
            Some("must not be empty")
        } else if value.len() > MAX_RUN_ID_LEN {
            Some("longer than 128 bytes")
        } else if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            Some("only ASCII letters, digits, '-' and '_' are allowed")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(InvalidRunId { value, reason }),
            None => Ok(Self(value)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RunId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for RunId {
    type Err = InvalidRunId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RunId {
    type Error = InvalidRunId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RunId> for String {
    fn from(id: RunId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_ids() {
        for value in ["run-1", "a", "2024_10_19-xyz", "ABC123"] {
            assert_eq!(RunId::new(value).unwrap().as_str(), value);
        }
    }

    #[test]
    fn test_rejects_path_unsafe_ids() {
        for value in ["", ".", "..", "../etc", "a/b", "a\\b", "run 1", "run.json", "ünï"] {
            assert!(RunId::new(value).is_err(), "{value:?} should be rejected");
        }
    }

    #[test]
    fn test_length_limit() {
        assert!(RunId::new("x".repeat(MAX_RUN_ID_LEN)).is_ok());
        let err = RunId::new("x".repeat(MAX_RUN_ID_LEN + 1)).unwrap_err();
        assert_eq!(err.reason, "longer than 128 bytes");
    }

    #[test]
    fn test_serde_validates() {
        let id: RunId = serde_json::from_str("\"run-7\"").unwrap();
        assert_eq!(id.to_string(), "run-7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"run-7\"");
        assert!(serde_json::from_str::<RunId>("\"../run\"").is_err());
    }

    #[test]
    fn test_parse() {
        let id: RunId = "abc".parse().unwrap();
        assert_eq!(id.as_ref(), "abc");
    }
}
