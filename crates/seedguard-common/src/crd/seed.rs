//! Seed resource (`core.gardener.cloud/v1beta1`)
//!
//! A Seed optionally carries a backup configuration whose `providerConfig`
//! is an opaque, provider-specific JSON document. The immutable retention
//! settings live inside that document.

use k8s_openapi::api::core::v1::SecretReference;
use k8s_openapi::apimachinery::pkg::runtime::RawExtension;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// API group of the Seed resource
pub const SEED_GROUP: &str = "core.gardener.cloud";
/// API version of the Seed resource
pub const SEED_VERSION: &str = "v1beta1";
/// Kind of the Seed resource
pub const SEED_KIND: &str = "Seed";
/// Full apiVersion string (`group/version`)
pub const SEED_API_VERSION: &str = "core.gardener.cloud/v1beta1";

/// Backup configuration of a Seed
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeedBackup {
    /// Backup provider type (e.g. "gcp")
    #[serde(default)]
    pub provider: String,

    /// Provider-specific configuration, including `immutableSettings`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config: Option<RawExtension>,

    /// Region of the backup bucket, defaults to the Seed's region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Secret holding the backup provider credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<SecretReference>,
}

impl SeedBackup {
    /// Serialize `providerConfig` back to raw bytes for the settings parser.
    ///
    /// `None` when no provider configuration is set.
    pub fn provider_config_bytes(&self) -> Result<Option<Vec<u8>>, serde_json::Error> {
        self.provider_config
            .as_ref()
            .map(|raw| serde_json::to_vec(&raw.0))
            .transpose()
    }
}

/// Seed spec; fields other than `backup` are ignored
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[kube(
    group = "core.gardener.cloud",
    version = "v1beta1",
    kind = "Seed",
    plural = "seeds",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct SeedSpec {
    /// Backup configuration; absent when the Seed has no backups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup: Option<SeedBackup>,
}

impl Seed {
    /// Raw bytes of `spec.backup.providerConfig`, if any
    pub fn provider_config_bytes(&self) -> Result<Option<Vec<u8>>, serde_json::Error> {
        match &self.spec.backup {
            Some(backup) => backup.provider_config_bytes(),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::Resource;

    fn parse_seed(yaml: &str) -> Seed {
        serde_yaml::from_str(yaml).expect("parse seed")
    }

    #[test]
    fn test_seed_resource_identity() {
        assert_eq!(Seed::group(&()), SEED_GROUP);
        assert_eq!(Seed::version(&()), SEED_VERSION);
        assert_eq!(Seed::kind(&()), SEED_KIND);
        assert_eq!(Seed::api_version(&()), SEED_API_VERSION);
    }

    #[test]
    fn test_seed_with_provider_config() {
        let seed = parse_seed(
            r#"
apiVersion: core.gardener.cloud/v1beta1
kind: Seed
metadata:
  name: aws-eu1
spec:
  backup:
    provider: gcp
    region: europe-west1
    secretRef:
      name: backup-secret
      namespace: garden
    providerConfig:
      immutableSettings:
        retentionType: bucket
        retentionPeriod: 96h
  provider:
    type: aws
    region: eu-west-1
"#,
        );

        let backup = seed.spec.backup.as_ref().unwrap();
        assert_eq!(backup.provider, "gcp");
        assert_eq!(backup.region.as_deref(), Some("europe-west1"));

        let bytes = seed.provider_config_bytes().unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["immutableSettings"]["retentionPeriod"], "96h");
    }

    #[test]
    fn test_seed_without_backup() {
        let seed = parse_seed(
            r#"
apiVersion: core.gardener.cloud/v1beta1
kind: Seed
metadata:
  name: local
spec: {}
"#,
        );
        assert!(seed.spec.backup.is_none());
        assert_eq!(seed.provider_config_bytes().unwrap(), None);
    }

    #[test]
    fn test_backup_without_provider_config() {
        let backup = SeedBackup {
            provider: "gcp".to_string(),
            ..Default::default()
        };
        assert_eq!(backup.provider_config_bytes().unwrap(), None);
    }
}
