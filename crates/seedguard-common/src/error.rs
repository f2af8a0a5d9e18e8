//! Error types for retention settings decoding
//!
//! Decode failures (syntax, duration format) are kept apart from semantic
//! policy violations, which live in the policy crate.

use thiserror::Error;

use crate::duration::DurationError;

/// Errors produced while turning a provider configuration blob into settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The provisioning path requires a payload but none was supplied
    #[error("providerConfig is either empty or nil")]
    MissingProviderConfig,

    /// The payload is not a valid JSON document of the expected shape
    #[error("error while parsing immutable settings: {source}")]
    Parse {
        /// The underlying decode failure
        #[source]
        source: serde_json::Error,
    },

    /// `retentionPeriod` is not a valid duration expression
    #[error("invalid retentionPeriod format: {source}")]
    InvalidPeriod {
        /// Parser complaint, quoting the offending input
        #[source]
        source: DurationError,
    },

    /// `retentionType` is not supported (provisioning contract only)
    #[error("invalid retentionType '{value}'; must be 'bucket'")]
    InvalidRetentionType {
        /// The rejected value, verbatim
        value: String,
    },
}

impl From<serde_json::Error> for SettingsError {
    fn from(source: serde_json::Error) -> Self {
        Self::Parse { source }
    }
}

impl From<DurationError> for SettingsError {
    fn from(source: DurationError) -> Self {
        Self::InvalidPeriod { source }
    }
}
