//! Backup bucket provisioning for Seeds
//!
//! - [`client`] - the narrow object-storage interface the provisioning code
//!   depends on
//! - [`provision`] - bucket creation and cleanup driven by a Seed's backup
//!   configuration
//! - [`config`] - environment-backed storage configuration
//! - `gcs` - Google Cloud Storage implementation (feature `gcs`)
//!
//! The policy engine does not depend on this crate, and nothing outside the
//! `gcs` module touches a cloud SDK type.

#![deny(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
#[cfg(feature = "gcs")]
pub mod gcs;
pub mod provision;

pub use client::StorageClient;
pub use config::{OsEnvConfig, StorageConfig, StorageEnvConfig};
pub use error::StorageError;
pub use provision::{
    cleanup_backup_entry, delete_backup_bucket, ensure_backup_bucket,
    ensure_immutable_backup_bucket,
};
