//! Bucket commands - provision and clean up Seed backup buckets on GCS

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Subcommand};
use seedguard_common::crd::Seed;
use seedguard_common::PROVIDER_CONFIG_PATH;
use seedguard_storage::gcs::GcsStorageClient;
use seedguard_storage::{
    cleanup_backup_entry, delete_backup_bucket, ensure_backup_bucket,
    ensure_immutable_backup_bucket, OsEnvConfig, StorageConfig,
};
use tracing::info;

use super::read_manifest;
use crate::{Error, Result};

#[derive(Subcommand, Debug)]
pub enum BucketCommand {
    /// Create the backup bucket described by a Seed
    Create(CreateArgs),

    /// Delete a backup bucket
    Delete(DeleteArgs),

    /// Delete every object of one backup entry
    Cleanup(CleanupArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Bucket name
    #[arg(long)]
    pub name: String,

    /// Seed manifest whose backup section configures the bucket
    #[arg(long, value_name = "FILE")]
    pub seed: PathBuf,

    /// Fail unless the Seed configures immutable settings
    #[arg(long)]
    pub require_immutable: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Bucket name
    #[arg(long)]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// Bucket name
    #[arg(long)]
    pub name: String,

    /// Object name prefix of the backup entry
    #[arg(long)]
    pub prefix: String,
}

pub async fn run(command: BucketCommand) -> Result<ExitCode> {
    let config = StorageConfig::from_env(&OsEnvConfig)?;
    let client = GcsStorageClient::from_config(&config).await?;

    match command {
        BucketCommand::Create(args) => create(&client, &config, args).await?,
        BucketCommand::Delete(args) => delete_backup_bucket(&client, &args.name).await?,
        BucketCommand::Cleanup(args) => {
            cleanup_backup_entry(&client, &args.name, &args.prefix).await?
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn create(client: &GcsStorageClient, config: &StorageConfig, args: CreateArgs) -> Result<()> {
    let seed: Seed = read_manifest(&args.seed).await?;
    let backup = seed.spec.backup.as_ref();
    let region = config.region_for(backup.and_then(|b| b.region.as_deref()));
    let provider_config = seed
        .provider_config_bytes()
        .map_err(|source| Error::ProviderConfig {
            field: PROVIDER_CONFIG_PATH,
            source,
        })?;

    info!(
        bucket = %args.name,
        region = %region,
        project = %client.project_id(),
        "Provisioning backup bucket"
    );

    if args.require_immutable {
        let settings =
            ensure_immutable_backup_bucket(client, &args.name, region, provider_config.as_deref())
                .await?;
        println!("{} locked for {}", args.name, settings.retention_period);
    } else {
        match ensure_backup_bucket(client, &args.name, region, provider_config.as_deref()).await? {
            Some(settings) => println!("{} locked for {}", args.name, settings.retention_period),
            None => println!("{} ready", args.name),
        }
    }
    Ok(())
}
