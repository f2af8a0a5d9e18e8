//! Seedguard CLI

use std::process::ExitCode;

use clap::Parser;

use seedguard::common::telemetry::{init_telemetry, TelemetryConfig};
use seedguard::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_telemetry(TelemetryConfig {
        format: cli.log_format,
        ..Default::default()
    })?;

    Ok(cli.run().await?)
}
