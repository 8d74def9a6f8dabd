//! Error types for the scan core.

use thiserror::Error;

/// Errors raised while constructing scan inputs.
///
/// Both kinds surface at construction time: `Parse` when building a
/// [`crate::PolicyDocument`], `Configuration` when building
/// [`crate::Exclusions`]. Evaluation itself never fails; "no risk found"
/// is an empty result, not an error.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The policy document does not conform to the IAM policy grammar.
    #[error("malformed policy document: {0}")]
    Parse(String),

    /// The exclusions configuration has the wrong shape or value types.
    #[error("malformed exclusions configuration: {0}")]
    Configuration(String),
}

impl ScanError {
    /// Create a parse error with a formatted message
    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a configuration error with a formatted message
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Result alias used throughout the scan core
pub type ScanResult<T> = Result<T, ScanError>;
