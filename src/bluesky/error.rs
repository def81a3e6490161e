// Failure taxonomy for calls against the remote social graph.
//
// The retry wrapper only needs one question answered: is this failure
// worth another attempt? Transport-level classification happens in the
// client; `looks_transient` additionally pattern-matches the description
// so that upstream errors which lost their status still get a retry.

use std::sync::LazyLock;

use regex_lite::Regex;
use thiserror::Error;

static TRANSIENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)429|rate|timeout|temporar").expect("valid regex"));

/// An error from a single remote operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// Rate limited, timed out, or temporarily unavailable.
    #[error("transient failure: {0}")]
    Transient(String),

    /// Validation or other failure that will not resolve by retrying.
    #[error("permanent failure: {0}")]
    Permanent(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("authentication failed: {0}")]
    Auth(String),
}

impl RemoteError {
    /// Whether a retry could plausibly succeed.
    pub fn looks_transient(&self) -> bool {
        match self {
            RemoteError::Transient(_) => true,
            RemoteError::Permanent(msg) => TRANSIENT_PATTERN.is_match(msg),
            RemoteError::NotFound(_) | RemoteError::Auth(_) => false,
        }
    }
}
