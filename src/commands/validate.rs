//! Validate command

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use kube::core::DynamicObject;
use seedguard_policy::SeedValidator;

use super::read_manifest;
use crate::Result;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Seed manifest being admitted (YAML or JSON)
    #[arg(long = "new", value_name = "FILE")]
    pub new: PathBuf,

    /// Currently stored Seed manifest; omit to validate a create
    #[arg(long = "old", value_name = "FILE")]
    pub old: Option<PathBuf>,
}

/// Outcome of validating one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Denied(String),
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allowed => write!(f, "allowed"),
            Self::Denied(message) => write!(f, "denied: {message}"),
        }
    }
}

/// Run the validator and fold the result into a verdict
pub fn verdict(
    validator: &SeedValidator,
    new: &DynamicObject,
    old: Option<&DynamicObject>,
) -> Verdict {
    match validator.validate(new, old) {
        Ok(()) => Verdict::Allowed,
        Err(e) => Verdict::Denied(e.to_string()),
    }
}

pub async fn run(args: ValidateArgs) -> Result<ExitCode> {
    let new: DynamicObject = read_manifest(&args.new).await?;
    let old: Option<DynamicObject> = match &args.old {
        Some(path) => Some(read_manifest(path).await?),
        None => None,
    };

    let verdict = verdict(&SeedValidator::new(), &new, old.as_ref());
    println!("{verdict}");

    Ok(match verdict {
        Verdict::Allowed => ExitCode::SUCCESS,
        Verdict::Denied(_) => ExitCode::FAILURE,
    })
}
