//! CLI commands

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{Error, Result};

#[cfg(feature = "gcs")]
pub mod bucket;
pub mod review;
pub mod settings;
pub mod validate;

/// Read a YAML or JSON manifest from disk
pub async fn read_manifest<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
    serde_yaml::from_str(&raw).map_err(|source| Error::Manifest {
        path: path.to_path_buf(),
        source,
    })
}
