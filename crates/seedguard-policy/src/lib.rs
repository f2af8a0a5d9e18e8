//! Immutable-retention policy for Seed backups
//!
//! - [`engine`] - create/update rules over parsed retention settings
//! - [`violation`] - rejection reasons and their user-visible messages
//! - [`validator`] - object-level validation of Seeds
//! - [`admission`] - AdmissionReview request/response mapping

#![deny(missing_docs)]

pub mod admission;
pub mod engine;
pub mod validator;
pub mod violation;

pub use engine::{validate_shape, PolicyEngine};
pub use validator::{ObjectRole, SeedValidator, ValidationError};
pub use violation::{PolicyViolation, SettingsOrigin};
