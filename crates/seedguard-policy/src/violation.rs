//! Policy violations
//!
//! Every rejection the engine can produce. Display strings are user-visible:
//! they become the admission denial message verbatim.

use std::fmt;

use seedguard_common::{RetentionPeriod, SettingsError};
use thiserror::Error;

/// Which snapshot a settings payload was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsOrigin {
    /// The only snapshot of a create request
    Created,
    /// The stored object of an update request
    Old,
    /// The incoming object of an update request
    New,
}

impl fmt::Display for SettingsOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "immutable settings"),
            Self::Old => write!(f, "old immutable settings"),
            Self::New => write!(f, "new immutable settings"),
        }
    }
}

/// Reason a retention configuration or transition was rejected
#[derive(Debug, Error)]
pub enum PolicyViolation {
    /// The payload could not be decoded
    #[error("error parsing {origin}: {source}")]
    Settings {
        /// Snapshot the payload came from
        origin: SettingsOrigin,
        /// Underlying decode failure
        #[source]
        source: SettingsError,
    },

    /// Unsupported retention type
    #[error("invalid retentionType '{value}'; must be 'bucket'")]
    InvalidRetentionType {
        /// The rejected value, verbatim
        value: String,
    },

    /// Zero or negative retention period
    #[error("retentionPeriod must be greater than zero")]
    NonPositiveRetentionPeriod {
        /// The rejected period
        period: RetentionPeriod,
    },

    /// Settings were present and the update removes them
    #[error("disabling immutable settings is not allowed")]
    DisablingNotAllowed,

    /// The update shortens the retention period
    #[error("reducing the retention period is not allowed")]
    RetentionPeriodReduced {
        /// Period before the update
        old: RetentionPeriod,
        /// Requested period
        new: RetentionPeriod,
    },

    /// The update switches to a different retention type
    #[error("modifying the retention type is not allowed")]
    RetentionTypeChanged {
        /// Type before the update
        old: String,
        /// Requested type
        new: String,
    },
}

impl PolicyViolation {
    /// Wrap a decode failure with the snapshot it came from
    pub fn settings(origin: SettingsOrigin, source: SettingsError) -> Self {
        Self::Settings { origin, source }
    }

    /// Stable machine-readable reason, used as the admission status reason
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Settings { .. } => "ParseError",
            Self::InvalidRetentionType { .. } => "InvalidRetentionType",
            Self::NonPositiveRetentionPeriod { .. } => "NonPositiveRetentionPeriod",
            Self::DisablingNotAllowed => "DisablingNotAllowed",
            Self::RetentionPeriodReduced { .. } => "RetentionPeriodReduced",
            Self::RetentionTypeChanged { .. } => "RetentionTypeChanged",
        }
    }
}
