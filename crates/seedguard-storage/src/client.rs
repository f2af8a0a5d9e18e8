//! Object-storage client interface
//!
//! Every operation is idempotent: re-running it after a partial failure or a
//! concurrent caller must not produce an error for work already done.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use seedguard_common::ImmutableSettings;

use crate::error::StorageError;

/// Bucket operations needed to provision and clean up Seed backups
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Create the bucket unless the caller already owns it.
    ///
    /// With `settings`, the bucket gets a retention policy of the given
    /// period, locked so it can never be shortened or removed.
    async fn create_bucket_if_not_exists<'a>(
        &self,
        bucket: &str,
        region: &str,
        settings: Option<&'a ImmutableSettings>,
    ) -> Result<(), StorageError>;

    /// Delete the bucket; a bucket that does not exist is not an error
    async fn delete_bucket_if_exists(&self, bucket: &str) -> Result<(), StorageError>;

    /// Delete every object whose name starts with `prefix`.
    ///
    /// Objects that vanish between listing and deletion are skipped. Listing
    /// errors are returned.
    async fn delete_objects_with_prefix(&self, bucket: &str, prefix: &str)
        -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedguard_common::RetentionPeriod;

    #[tokio::test]
    async fn test_mock_receives_borrowed_settings() {
        let mut client = MockStorageClient::new();
        client
            .expect_create_bucket_if_not_exists()
            .times(1)
            .returning(|_, _, settings| {
                assert_eq!(
                    settings.map(|s| s.retention_period),
                    Some(RetentionPeriod::from_hours(24))
                );
                Ok(())
            });

        let settings = ImmutableSettings::bucket(RetentionPeriod::from_hours(24));
        client
            .create_bucket_if_not_exists("b", "europe-west1", Some(&settings))
            .await
            .unwrap();
    }
}
