//! Common types for seedguard: Seed resource model, retention settings
//! parsing, and telemetry setup

#![deny(missing_docs)]

pub mod crd;
pub mod duration;
pub mod error;
pub mod settings;
pub mod telemetry;

pub use duration::RetentionPeriod;
pub use error::SettingsError;
pub use settings::{
    parse_immutable_settings, parse_provisioning_settings, ImmutableSettings,
    BUCKET_RETENTION_TYPE,
};

/// JSON path of the provider configuration inside a Seed, used in log fields
pub const PROVIDER_CONFIG_PATH: &str = "spec.backup.providerConfig";
