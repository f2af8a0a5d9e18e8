//! Storage error types

use seedguard_common::SettingsError;
use seedguard_policy::PolicyViolation;
use thiserror::Error;

/// Errors from bucket provisioning and cleanup
#[derive(Debug, Error)]
pub enum StorageError {
    /// The object-storage API returned an error
    #[error("{operation} failed for bucket {bucket}: {message}")]
    Api {
        /// Operation that failed (e.g. "create bucket")
        operation: &'static str,
        /// Bucket the operation targeted
        bucket: String,
        /// HTTP status reported by the provider, if any
        status: Option<u16>,
        /// Provider error message
        message: String,
    },

    /// The storage client could not be constructed
    #[error("storage client error: {0}")]
    Client(String),

    /// The provider configuration could not be decoded
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The decoded settings are not acceptable for a bucket lock
    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    /// Required configuration is missing or invalid
    #[error("configuration error: {0}")]
    Config(String),
}

impl StorageError {
    /// Create an API error
    pub fn api(
        operation: &'static str,
        bucket: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::Api {
            operation,
            bucket: bucket.into(),
            status,
            message: message.into(),
        }
    }

    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }
}
