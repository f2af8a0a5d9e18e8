//! Storage configuration from the environment
//!
//! Reading goes through [`StorageEnvConfig`] so tests can inject values
//! without touching process-global environment variables.

use crate::error::StorageError;

/// Environment variable holding the GCP project that owns backup buckets
pub const PROJECT_ID_ENV: &str = "GCP_PROJECT_ID";

/// Environment variable overriding the default bucket region
pub const REGION_ENV: &str = "BACKUP_REGION";

/// Region used when neither the Seed nor the environment names one
pub const DEFAULT_REGION: &str = "europe-west1";

/// Trait for reading storage configuration
#[cfg_attr(test, mockall::automock)]
pub trait StorageEnvConfig: Send + Sync {
    /// Project that owns the backup buckets
    fn project_id(&self) -> Option<String>;

    /// Default bucket region
    fn region(&self) -> Option<String>;
}

/// Default implementation that reads from environment variables
#[derive(Clone, Default)]
pub struct OsEnvConfig;

impl StorageEnvConfig for OsEnvConfig {
    fn project_id(&self) -> Option<String> {
        std::env::var(PROJECT_ID_ENV).ok()
    }

    fn region(&self) -> Option<String> {
        std::env::var(REGION_ENV).ok()
    }
}

/// Resolved storage configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Project that owns the backup buckets
    pub project_id: String,
    /// Region used when the Seed does not name one
    pub default_region: String,
}

impl StorageConfig {
    /// Build configuration from the given source.
    ///
    /// The project id is required; empty values count as unset.
    pub fn from_env(env: &dyn StorageEnvConfig) -> Result<Self, StorageError> {
        let project_id = env
            .project_id()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| StorageError::Config(format!("{PROJECT_ID_ENV} is not set")))?;

        let default_region = env
            .region()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        Ok(Self {
            project_id,
            default_region,
        })
    }

    /// Region for a bucket: the Seed's backup region if set, else the default
    pub fn region_for<'a>(&'a self, seed_region: Option<&'a str>) -> &'a str {
        seed_region
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.default_region)
    }
}
