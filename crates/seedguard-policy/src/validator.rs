//! Seed validator
//!
//! Object-level entry point: checks that the objects handed over by the
//! admission layer are Seeds, pulls `spec.backup.providerConfig` out of each,
//! and runs the policy engine on them.

use std::fmt;

use kube::core::DynamicObject;
use kube::ResourceExt;
use seedguard_common::crd::{Seed, SEED_API_VERSION, SEED_KIND};
use seedguard_common::PROVIDER_CONFIG_PATH;
use thiserror::Error;
use tracing::{debug, info};

use crate::engine::PolicyEngine;
use crate::violation::PolicyViolation;

/// Which side of an admission request an object is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectRole {
    /// Incoming object
    New,
    /// Stored object (updates only)
    Old,
}

impl fmt::Display for ObjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new object"),
            Self::Old => write!(f, "old object"),
        }
    }
}

/// Error type for Seed validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The object is not a `core.gardener.cloud/v1beta1` Seed
    #[error("wrong object type {kind} for {role}")]
    WrongObjectType {
        /// `apiVersion/kind` of the object received
        kind: String,
        /// Which side of the request it was
        role: ObjectRole,
    },

    /// The object claims to be a Seed but does not decode as one
    #[error("failed to decode Seed from {role}: {source}")]
    Decode {
        /// Which side of the request it was
        role: ObjectRole,
        /// Underlying serde failure
        #[source]
        source: serde_json::Error,
    },

    /// The retention policy rejected the request
    #[error(transparent)]
    Policy(#[from] PolicyViolation),
}

impl ValidationError {
    /// Machine-readable reason for admission responses
    pub fn reason(&self) -> &'static str {
        match self {
            Self::WrongObjectType { .. } => "WrongObjectType",
            Self::Decode { .. } => "DecodeError",
            Self::Policy(violation) => violation.reason(),
        }
    }
}

/// Validates create and update operations on Seed resources
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedValidator {
    engine: PolicyEngine,
}

impl SeedValidator {
    /// Create a validator backed by the default policy engine
    pub fn new() -> Self {
        Self {
            engine: PolicyEngine::new(),
        }
    }

    /// Validate untyped objects from an admission request.
    ///
    /// `old` is `None` on create.
    pub fn validate(
        &self,
        new: &DynamicObject,
        old: Option<&DynamicObject>,
    ) -> Result<(), ValidationError> {
        let new_seed = into_seed(new, ObjectRole::New)?;
        let old_seed = old.map(|o| into_seed(o, ObjectRole::Old)).transpose()?;
        self.validate_seeds(&new_seed, old_seed.as_ref())
    }

    /// Validate typed Seeds. `old` is `None` on create.
    pub fn validate_seeds(&self, new: &Seed, old: Option<&Seed>) -> Result<(), ValidationError> {
        let name = new.name_any();
        let is_create = old.is_none();

        let new_config = new
            .provider_config_bytes()
            .map_err(|source| ValidationError::Decode {
                role: ObjectRole::New,
                source,
            })?;
        let old_config = match old {
            Some(seed) => seed
                .provider_config_bytes()
                .map_err(|source| ValidationError::Decode {
                    role: ObjectRole::Old,
                    source,
                })?,
            None => None,
        };

        match self
            .engine
            .validate_configs(old_config.as_deref(), new_config.as_deref(), is_create)
        {
            Ok(()) => {
                debug!(
                    seed = %name,
                    create = is_create,
                    field = PROVIDER_CONFIG_PATH,
                    "Immutable settings accepted"
                );
                Ok(())
            }
            Err(violation) => {
                info!(
                    seed = %name,
                    create = is_create,
                    reason = violation.reason(),
                    error = %violation,
                    "Rejecting Seed backup configuration"
                );
                Err(violation.into())
            }
        }
    }
}

/// Check the object's type and decode it as a Seed
fn into_seed(obj: &DynamicObject, role: ObjectRole) -> Result<Seed, ValidationError> {
    let is_seed = obj
        .types
        .as_ref()
        .is_some_and(|t| t.api_version == SEED_API_VERSION && t.kind == SEED_KIND);
    if !is_seed {
        let kind = obj
            .types
            .as_ref()
            .map(|t| format!("{}/{}", t.api_version, t.kind))
            .unwrap_or_else(|| "<unknown>".to_string());
        return Err(ValidationError::WrongObjectType { kind, role });
    }

    serde_json::to_value(obj)
        .and_then(serde_json::from_value)
        .map_err(|source| ValidationError::Decode { role, source })
}
