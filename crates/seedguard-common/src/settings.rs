//! Immutable settings carried in a Seed's backup provider configuration
//!
//! The provider configuration is an opaque JSON document. It is decoded in
//! two stages: raw bytes into a generic [`serde_json::Value`] (syntax), then
//! the `immutableSettings` member into a typed value (shape). Semantic checks
//! such as "the retention type must be `bucket`" are not done here on the
//! admission path; the policy engine owns them.
//!
//! Two contracts exist for the same payload:
//! - [`parse_immutable_settings`] (admission): settings are optional, an
//!   absent or empty payload means "not configured".
//! - [`parse_provisioning_settings`] (bucket provisioning): settings are
//!   required, and the retention type is checked while decoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::duration::{parse_go_duration, RetentionPeriod};
use crate::error::SettingsError;

/// The only retention type currently supported: bucket-level retention lock
pub const BUCKET_RETENTION_TYPE: &str = "bucket";

/// Key of the immutable settings object inside the provider configuration
const IMMUTABLE_SETTINGS_KEY: &str = "immutableSettings";

/// Parsed retention policy. Not shape-validated: the type may be anything
/// and the period may be zero or negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmutableSettings {
    /// Retention mechanism, verbatim from the payload
    pub retention_type: String,
    /// Minimum time backups must be kept before deletion is permitted
    pub retention_period: RetentionPeriod,
}

impl ImmutableSettings {
    /// Create settings from already-parsed parts
    pub fn new(retention_type: impl Into<String>, retention_period: RetentionPeriod) -> Self {
        Self {
            retention_type: retention_type.into(),
            retention_period,
        }
    }

    /// Bucket-locked settings with the given period
    pub fn bucket(retention_period: RetentionPeriod) -> Self {
        Self::new(BUCKET_RETENTION_TYPE, retention_period)
    }
}

/// Wire shape of `immutableSettings`
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImmutableSettingsJson {
    #[serde(default)]
    retention_type: Option<String>,
    #[serde(default)]
    retention_period: Option<String>,
}

impl ImmutableSettingsJson {
    fn into_settings(self) -> Result<ImmutableSettings, SettingsError> {
        let period = self.retention_period.unwrap_or_default();
        Ok(ImmutableSettings {
            retention_type: self.retention_type.unwrap_or_default(),
            retention_period: parse_go_duration(&period)?,
        })
    }
}

/// Stage one: bytes into a JSON document. `None` for absent or empty input.
fn decode_document(config: Option<&[u8]>) -> Result<Option<Value>, SettingsError> {
    match config {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => Ok(Some(serde_json::from_slice(raw)?)),
    }
}

/// Stage two: pull `immutableSettings` out of the document.
///
/// A `null` document decodes to nothing. Any other non-object is a shape
/// error. A missing or `null` member yields `None`.
fn decode_settings(document: Value) -> Result<Option<ImmutableSettingsJson>, SettingsError> {
    let mut object = match document {
        Value::Null => return Ok(None),
        Value::Object(object) => object,
        other => {
            let source = <serde_json::Error as serde::de::Error>::invalid_type(
                unexpected(&other),
                &"a provider configuration object",
            );
            return Err(SettingsError::Parse { source });
        }
    };

    match object.remove(IMMUTABLE_SETTINGS_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
    }
}

fn unexpected(value: &Value) -> serde::de::Unexpected<'_> {
    use serde::de::Unexpected;
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

/// Decode immutable settings for admission.
///
/// Returns `Ok(None)` when the payload is absent, empty, or has no
/// `immutableSettings` member. Fails on malformed JSON or an unparsable
/// `retentionPeriod`. The retention type and period sign are returned as-is.
pub fn parse_immutable_settings(
    config: Option<&[u8]>,
) -> Result<Option<ImmutableSettings>, SettingsError> {
    let Some(document) = decode_document(config)? else {
        return Ok(None);
    };
    decode_settings(document)?
        .map(ImmutableSettingsJson::into_settings)
        .transpose()
}

/// Decode immutable settings for bucket provisioning.
///
/// Stricter than [`parse_immutable_settings`]: a missing payload is an
/// error, a missing `immutableSettings` member decodes as empty settings,
/// and anything other than the `bucket` retention type is rejected.
pub fn parse_provisioning_settings(
    config: Option<&[u8]>,
) -> Result<ImmutableSettings, SettingsError> {
    let document = decode_document(config)?.ok_or(SettingsError::MissingProviderConfig)?;
    let wire = decode_settings(document)?.unwrap_or_default();

    let retention_type = wire.retention_type.clone().unwrap_or_default();
    if retention_type != BUCKET_RETENTION_TYPE {
        return Err(SettingsError::InvalidRetentionType {
            value: retention_type,
        });
    }
    wire.into_settings()
}
