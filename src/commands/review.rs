//! Review command - answer an AdmissionReview offline
//!
//! Useful for replaying requests captured from the API server.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use kube::core::admission::AdmissionReview;
use kube::core::DynamicObject;
use seedguard_policy::admission::review_admission;
use seedguard_policy::SeedValidator;

use super::read_manifest;
use crate::Result;

#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// AdmissionReview request (JSON or YAML)
    pub file: PathBuf,
}

pub async fn run(args: ReviewArgs) -> Result<ExitCode> {
    let review: AdmissionReview<DynamicObject> = read_manifest(&args.file).await?;
    let answered = review_admission(&SeedValidator::new(), review);
    println!("{}", serde_json::to_string_pretty(&answered)?);
    Ok(ExitCode::SUCCESS)
}
