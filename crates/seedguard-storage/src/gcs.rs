//! Google Cloud Storage client
//!
//! Implements [`StorageClient`] with the `StorageControl` API. Credentials
//! come from application-default credentials; the owning project comes from
//! [`StorageConfig`].

use async_trait::async_trait;
use google_cloud_gax::error::rpc::Code;
use google_cloud_gax::paginator::ItemPaginator as _;
use google_cloud_storage::client::StorageControl;
use google_cloud_storage::model::bucket::iam_config::UniformBucketLevelAccess;
use google_cloud_storage::model::bucket::{IamConfig, RetentionPolicy, SoftDeletePolicy};
use google_cloud_storage::model::Bucket;
use google_cloud_wkt::FieldMask;
use seedguard_common::ImmutableSettings;
use tracing::{debug, info, warn};

use crate::client::StorageClient;
use crate::config::StorageConfig;
use crate::error::StorageError;

/// Parent used for bucket-level calls; the project is set on the bucket
const GLOBAL_PARENT: &str = "projects/_";

const STATUS_NOT_FOUND: u16 = 404;
const STATUS_CONFLICT: u16 = 409;

/// [`StorageClient`] backed by Google Cloud Storage
#[derive(Clone)]
pub struct GcsStorageClient {
    control: StorageControl,
    project_id: String,
}

impl GcsStorageClient {
    /// Connect with application-default credentials
    pub async fn new(project_id: impl Into<String>) -> Result<Self, StorageError> {
        let control = StorageControl::builder()
            .build()
            .await
            .map_err(|e| StorageError::Client(e.to_string()))?;
        Ok(Self {
            control,
            project_id: project_id.into(),
        })
    }

    /// Connect for the project named in `config`
    pub async fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        Self::new(config.project_id.clone()).await
    }

    /// Project that owns created buckets
    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

/// Resource name of a bucket in the control API
fn bucket_path(bucket: &str) -> String {
    format!("{GLOBAL_PARENT}/buckets/{bucket}")
}

/// Retention policy for the given settings. GCS counts whole seconds, so
/// sub-second remainders round up rather than collapsing to zero.
fn retention_policy(settings: &ImmutableSettings) -> RetentionPolicy {
    RetentionPolicy::new().set_retention_duration(google_cloud_wkt::Duration::clamp(
        settings.retention_period.ceil_seconds(),
        0,
    ))
}

/// Bucket resource for creation: uniform access, no soft delete, and an
/// (unlocked) retention policy when settings are given.
fn bucket_model(project_id: &str, region: &str, settings: Option<&ImmutableSettings>) -> Bucket {
    let bucket = Bucket::new()
        .set_project(format!("projects/{project_id}"))
        .set_location(region)
        .set_iam_config(
            IamConfig::new().set_uniform_bucket_level_access(
                UniformBucketLevelAccess::new().set_enabled(true),
            ),
        )
        .set_soft_delete_policy(
            SoftDeletePolicy::new().set_retention_duration(google_cloud_wkt::Duration::clamp(0, 0)),
        );

    match settings {
        Some(s) => bucket.set_retention_policy(retention_policy(s)),
        None => bucket,
    }
}

/// What a bucket still needs before its retention is write-once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockPlan {
    /// The policy is already locked
    Nothing,
    /// A policy is in place but unlocked, e.g. a previous lock call failed
    Lock,
    /// The bucket has no policy yet; set one, then lock it
    SetAndLock,
}

fn lock_plan(existing: &Bucket) -> LockPlan {
    match &existing.retention_policy {
        Some(policy) if policy.is_locked => LockPlan::Nothing,
        Some(_) => LockPlan::Lock,
        None => LockPlan::SetAndLock,
    }
}

/// Whether a failed call means the work was already done. Create treats
/// 409 as "already owned by us"; deletes treat 404 as "already gone".
fn already_done(status: Option<u16>, tolerated: u16) -> bool {
    status == Some(tolerated)
}

/// HTTP status of a provider error, mapping gRPC codes to their HTTP twins
fn status_of(err: &google_cloud_storage::Error) -> Option<u16> {
    if let Some(status) = err.http_status_code() {
        return Some(status);
    }
    match err.status().map(|s| &s.code) {
        Some(&Code::NotFound) => Some(STATUS_NOT_FOUND),
        Some(&Code::AlreadyExists) => Some(STATUS_CONFLICT),
        _ => None,
    }
}

fn api_error(operation: &'static str, bucket: &str, err: google_cloud_storage::Error) -> StorageError {
    StorageError::api(operation, bucket, status_of(&err), err.to_string())
}

#[async_trait]
impl StorageClient for GcsStorageClient {
    async fn create_bucket_if_not_exists<'a>(
        &self,
        bucket: &str,
        region: &str,
        settings: Option<&'a ImmutableSettings>,
    ) -> Result<(), StorageError> {
        let existing = match self
            .control
            .create_bucket()
            .set_parent(GLOBAL_PARENT)
            .set_bucket_id(bucket)
            .set_bucket(bucket_model(&self.project_id, region, settings))
            .send()
            .await
        {
            Ok(created) => {
                info!(bucket = %bucket, region = %region, "Created bucket");
                created
            }
            Err(e) if already_done(status_of(&e), STATUS_CONFLICT) => {
                debug!(bucket = %bucket, "Bucket already exists and is owned by us");
                if settings.is_none() {
                    return Ok(());
                }
                // A retry after a failed lock lands here; re-read to finish the job
                self.control
                    .get_bucket()
                    .set_name(bucket_path(bucket))
                    .send()
                    .await
                    .map_err(|e| api_error("get bucket", bucket, e))?
            }
            Err(e) => return Err(api_error("create bucket", bucket, e)),
        };

        let Some(settings) = settings else {
            return Ok(());
        };
        let existing = match lock_plan(&existing) {
            LockPlan::Nothing => {
                debug!(bucket = %bucket, "Retention policy already locked");
                return Ok(());
            }
            LockPlan::Lock => existing,
            LockPlan::SetAndLock => {
                warn!(bucket = %bucket, "Existing bucket has no retention policy, setting one");
                let metageneration = existing.metageneration;
                self.control
                    .update_bucket()
                    .set_bucket(existing.set_retention_policy(retention_policy(settings)))
                    .set_update_mask(FieldMask::default().set_paths(["retention_policy"]))
                    .set_if_metageneration_match(metageneration)
                    .send()
                    .await
                    .map_err(|e| api_error("set retention policy", bucket, e))?
            }
        };

        self.control
            .lock_bucket_retention_policy()
            .set_bucket(existing.name.clone())
            .set_if_metageneration_match(existing.metageneration)
            .send()
            .await
            .map_err(|e| api_error("lock retention policy", bucket, e))?;
        info!(bucket = %bucket, "Locked bucket retention policy");
        Ok(())
    }

    async fn delete_bucket_if_exists(&self, bucket: &str) -> Result<(), StorageError> {
        match self
            .control
            .delete_bucket()
            .set_name(bucket_path(bucket))
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if already_done(status_of(&e), STATUS_NOT_FOUND) => {
                debug!(bucket = %bucket, "Bucket already gone");
                Ok(())
            }
            Err(e) => Err(api_error("delete bucket", bucket, e)),
        }
    }

    async fn delete_objects_with_prefix(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<(), StorageError> {
        let mut objects = self
            .control
            .list_objects()
            .set_parent(bucket_path(bucket))
            .set_prefix(prefix)
            .by_item();

        let mut deleted = 0usize;
        while let Some(object) = objects.next().await {
            let object = object.map_err(|e| api_error("list objects", bucket, e))?;
            match self
                .control
                .delete_object()
                .set_bucket(bucket_path(bucket))
                .set_object(object.name.clone())
                .send()
                .await
            {
                Ok(_) => deleted += 1,
                Err(e) if already_done(status_of(&e), STATUS_NOT_FOUND) => {
                    warn!(bucket = %bucket, object = %object.name, "Object vanished before deletion");
                }
                Err(e) => return Err(api_error("delete object", bucket, e)),
            }
        }

        debug!(bucket = %bucket, prefix = %prefix, deleted, "Deleted objects with prefix");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedguard_common::RetentionPeriod;

    #[test]
    fn test_bucket_path() {
        assert_eq!(bucket_path("backups-eu1"), "projects/_/buckets/backups-eu1");
    }

    #[test]
    fn test_plain_bucket_model() {
        let bucket = bucket_model("garden-prod", "europe-west1", None);
        assert_eq!(bucket.project, "projects/garden-prod");
        assert_eq!(bucket.location, "europe-west1");
        assert!(bucket.retention_policy.is_none());
        let ubla = bucket
            .iam_config
            .and_then(|c| c.uniform_bucket_level_access)
            .expect("uniform access configured");
        assert!(ubla.enabled);
    }

    #[test]
    fn test_sub_second_period_rounds_up_to_one_second() {
        let settings = ImmutableSettings::bucket("500ms".parse().unwrap());
        let bucket = bucket_model("garden-prod", "europe-west1", Some(&settings));
        let duration = bucket
            .retention_policy
            .and_then(|p| p.retention_duration)
            .expect("retention configured");
        assert_eq!(duration.seconds(), 1);
    }

    #[test]
    fn test_lock_plan_for_fresh_bucket_locks() {
        let settings = ImmutableSettings::bucket(RetentionPeriod::from_hours(96));
        let created = bucket_model("garden-prod", "europe-west1", Some(&settings));
        assert_eq!(lock_plan(&created), LockPlan::Lock);
    }

    #[test]
    fn test_lock_plan_after_failed_lock_relocks() {
        // A retried create finds the bucket with its policy still unlocked
        let existing = Bucket::new().set_retention_policy(
            RetentionPolicy::new().set_retention_duration(google_cloud_wkt::Duration::clamp(60, 0)),
        );
        assert_eq!(lock_plan(&existing), LockPlan::Lock);
    }

    #[test]
    fn test_lock_plan_skips_locked_policy() {
        let existing = Bucket::new().set_retention_policy(RetentionPolicy::new().set_is_locked(true));
        assert_eq!(lock_plan(&existing), LockPlan::Nothing);
    }

    #[test]
    fn test_lock_plan_sets_missing_policy() {
        let existing = bucket_model("garden-prod", "europe-west1", None);
        assert_eq!(lock_plan(&existing), LockPlan::SetAndLock);
    }

    #[test]
    fn test_already_done_statuses() {
        // create: owned by us
        assert!(already_done(Some(409), STATUS_CONFLICT));
        // bucket or object delete: already gone
        assert!(already_done(Some(404), STATUS_NOT_FOUND));
        assert!(!already_done(Some(404), STATUS_CONFLICT));
        assert!(!already_done(Some(403), STATUS_NOT_FOUND));
        assert!(!already_done(Some(503), STATUS_CONFLICT));
        assert!(!already_done(None, STATUS_NOT_FOUND));
    }

    #[test]
    fn test_retention_bucket_model_uses_whole_seconds() {
        let settings = ImmutableSettings::bucket(RetentionPeriod::from_hours(96));
        let bucket = bucket_model("garden-prod", "europe-west1", Some(&settings));
        let duration = bucket
            .retention_policy
            .and_then(|p| p.retention_duration)
            .expect("retention configured");
        assert_eq!(duration.seconds(), 96 * 3600);
    }
}
