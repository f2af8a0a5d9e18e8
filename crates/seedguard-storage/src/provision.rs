//! Backup bucket provisioning
//!
//! Drives a [`StorageClient`] from a Seed's backup `providerConfig`. Settings
//! are shape-checked before any bucket is created: a locked retention policy
//! cannot be undone, so a bad period must never reach the provider.

use seedguard_common::{parse_immutable_settings, parse_provisioning_settings, ImmutableSettings};
use seedguard_policy::validate_shape;
use tracing::{debug, info};

use crate::client::StorageClient;
use crate::error::StorageError;

/// Create the backup bucket for a Seed.
///
/// Immutability is optional here: a payload without `immutableSettings`
/// yields a plain bucket. Returns the settings the bucket was locked with,
/// if any.
pub async fn ensure_backup_bucket(
    client: &dyn StorageClient,
    bucket: &str,
    region: &str,
    provider_config: Option<&[u8]>,
) -> Result<Option<ImmutableSettings>, StorageError> {
    let settings = parse_immutable_settings(provider_config)?;
    if let Some(settings) = &settings {
        validate_shape(settings)?;
    }

    client
        .create_bucket_if_not_exists(bucket, region, settings.as_ref())
        .await?;

    match &settings {
        Some(s) => info!(
            bucket = %bucket,
            region = %region,
            retention_period = %s.retention_period,
            "Backup bucket ready with locked retention policy"
        ),
        None => info!(bucket = %bucket, region = %region, "Backup bucket ready"),
    }
    Ok(settings)
}

/// Create an immutable backup bucket.
///
/// Unlike [`ensure_backup_bucket`], the provider configuration must carry
/// `immutableSettings` of type `bucket`; nothing is created otherwise.
pub async fn ensure_immutable_backup_bucket(
    client: &dyn StorageClient,
    bucket: &str,
    region: &str,
    provider_config: Option<&[u8]>,
) -> Result<ImmutableSettings, StorageError> {
    let settings = parse_provisioning_settings(provider_config)?;
    validate_shape(&settings)?;

    client
        .create_bucket_if_not_exists(bucket, region, Some(&settings))
        .await?;

    info!(
        bucket = %bucket,
        region = %region,
        retention_period = %settings.retention_period,
        "Immutable backup bucket ready"
    );
    Ok(settings)
}

/// Delete a Seed's backup bucket; a missing bucket is not an error
pub async fn delete_backup_bucket(
    client: &dyn StorageClient,
    bucket: &str,
) -> Result<(), StorageError> {
    client.delete_bucket_if_exists(bucket).await?;
    info!(bucket = %bucket, "Backup bucket deleted");
    Ok(())
}

/// Delete every object of one backup entry.
///
/// An empty prefix would match the whole bucket and is refused.
pub async fn cleanup_backup_entry(
    client: &dyn StorageClient,
    bucket: &str,
    prefix: &str,
) -> Result<(), StorageError> {
    if prefix.is_empty() {
        return Err(StorageError::Config(format!(
            "refusing to clean up bucket {bucket} with an empty prefix"
        )));
    }

    debug!(bucket = %bucket, prefix = %prefix, "Deleting backup entry objects");
    client.delete_objects_with_prefix(bucket, prefix).await?;
    info!(bucket = %bucket, prefix = %prefix, "Backup entry cleaned up");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockStorageClient;
    use seedguard_common::{RetentionPeriod, SettingsError};
    use seedguard_policy::PolicyViolation;
    use std::sync::{Arc, Mutex};

    /// Captured create call, so stories assert on what was provisioned
    /// rather than on mock wiring.
    #[derive(Clone, Default)]
    struct CreateCapture {
        calls: Arc<Mutex<Vec<(String, String, Option<ImmutableSettings>)>>>,
    }

    impl CreateCapture {
        fn client(&self) -> MockStorageClient {
            let calls = self.calls.clone();
            let mut mock = MockStorageClient::new();
            mock.expect_create_bucket_if_not_exists()
                .returning(move |bucket, region, settings| {
                    calls.lock().expect("mutex should not be poisoned").push((
                        bucket.to_string(),
                        region.to_string(),
                        settings.cloned(),
                    ));
                    Ok(())
                });
            mock
        }

        fn calls(&self) -> Vec<(String, String, Option<ImmutableSettings>)> {
            self.calls
                .lock()
                .expect("mutex should not be poisoned")
                .clone()
        }
    }

    fn payload(period: &str) -> Vec<u8> {
        format!(
            r#"{{"immutableSettings":{{"retentionType":"bucket","retentionPeriod":"{period}"}}}}"#
        )
        .into_bytes()
    }

    fn no_create() -> MockStorageClient {
        let mut mock = MockStorageClient::new();
        mock.expect_create_bucket_if_not_exists().never();
        mock
    }

    #[tokio::test]
    async fn story_plain_bucket_without_immutable_settings() {
        let capture = CreateCapture::default();
        let client = capture.client();

        let settings = ensure_backup_bucket(&client, "backups-eu1", "europe-west1", None)
            .await
            .unwrap();

        assert!(settings.is_none());
        assert_eq!(
            capture.calls(),
            vec![("backups-eu1".to_string(), "europe-west1".to_string(), None)]
        );
    }

    #[tokio::test]
    async fn story_bucket_locked_with_configured_period() {
        let capture = CreateCapture::default();
        let client = capture.client();
        let config = payload("96h");

        let settings = ensure_backup_bucket(&client, "backups-eu1", "europe-west1", Some(config.as_slice()))
            .await
            .unwrap();

        let expected = ImmutableSettings::bucket(RetentionPeriod::from_hours(96));
        assert_eq!(settings, Some(expected.clone()));
        assert_eq!(capture.calls()[0].2, Some(expected));
    }

    #[tokio::test]
    async fn story_negative_period_never_reaches_provider() {
        let client = no_create();
        let config = payload("-96h");

        let err = ensure_backup_bucket(&client, "backups-eu1", "europe-west1", Some(config.as_slice()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StorageError::Policy(PolicyViolation::NonPositiveRetentionPeriod { .. })
        ));
        assert_eq!(err.to_string(), "retentionPeriod must be greater than zero");
    }

    #[tokio::test]
    async fn story_immutable_bucket_requires_provider_config() {
        let client = no_create();

        let err = ensure_immutable_backup_bucket(&client, "backups-eu1", "europe-west1", None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StorageError::Settings(SettingsError::MissingProviderConfig)
        ));
    }

    #[tokio::test]
    async fn story_immutable_bucket_rejects_object_type() {
        let client = no_create();
        let config: &[u8] =
            br#"{"immutableSettings":{"retentionType":"object","retentionPeriod":"96h"}}"#;

        let err = ensure_immutable_backup_bucket(&client, "b", "europe-west1", Some(config))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid retentionType 'object'; must be 'bucket'"
        );
    }

    #[tokio::test]
    async fn story_immutable_bucket_created_and_locked() {
        let capture = CreateCapture::default();
        let client = capture.client();
        let config = payload("1h30m");

        let settings = ensure_immutable_backup_bucket(&client, "b", "us-east1", Some(config.as_slice()))
            .await
            .unwrap();

        assert_eq!(settings.retention_period.whole_seconds(), 5400);
        assert_eq!(capture.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_provider_error_is_propagated() {
        let mut client = MockStorageClient::new();
        client
            .expect_create_bucket_if_not_exists()
            .returning(|bucket, _, _| {
                Err(StorageError::api("create bucket", bucket, Some(403), "forbidden"))
            });

        let err = ensure_backup_bucket(&client, "b", "europe-west1", None)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test]
    async fn test_delete_backup_bucket() {
        let mut client = MockStorageClient::new();
        client
            .expect_delete_bucket_if_exists()
            .times(1)
            .returning(|_| Ok(()));

        delete_backup_bucket(&client, "b").await.unwrap();
    }

    #[tokio::test]
    async fn test_cleanup_backup_entry_deletes_prefix() {
        let mut client = MockStorageClient::new();
        client
            .expect_delete_objects_with_prefix()
            .times(1)
            .returning(|_, _| Ok(()));

        cleanup_backup_entry(&client, "b", "shoot--dev--app/etcd-main/")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cleanup_refuses_empty_prefix() {
        let mut client = MockStorageClient::new();
        client.expect_delete_objects_with_prefix().never();

        let err = cleanup_backup_entry(&client, "b", "").await.unwrap_err();
        assert!(matches!(err, StorageError::Config(_)));
    }
}
