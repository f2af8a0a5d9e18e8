//! Seedguard - immutable backup-retention policy for Seed resources
//!
//! The library crates do the work; this crate wires them into a CLI.

pub mod commands;
pub mod error;

pub use error::{Error, Result};
pub use seedguard_common as common;
pub use seedguard_policy as policy;
pub use seedguard_storage as storage;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use seedguard_common::telemetry::LogFormat;

/// Seedguard - enforce immutable retention on Seed backup buckets
#[derive(Parser, Debug)]
#[command(name = "seedguard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log output format (json or text)
    #[arg(long, global = true, env = "SEEDGUARD_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a Seed create or update against the retention policy
    Validate(commands::validate::ValidateArgs),

    /// Print the immutable settings of a Seed manifest
    Settings(commands::settings::SettingsArgs),

    /// Answer an AdmissionReview read from a file
    Review(commands::review::ReviewArgs),

    /// Provision or clean up backup buckets
    #[cfg(feature = "gcs")]
    #[command(subcommand)]
    Bucket(commands::bucket::BucketCommand),
}

impl Cli {
    /// Run the CLI command
    pub async fn run(self) -> Result<ExitCode> {
        match self.command {
            Commands::Validate(args) => commands::validate::run(args).await,
            Commands::Settings(args) => commands::settings::run(args).await,
            Commands::Review(args) => commands::review::run(args).await,
            #[cfg(feature = "gcs")]
            Commands::Bucket(command) => commands::bucket::run(command).await,
        }
    }
}
