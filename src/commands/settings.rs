//! Settings command - show what a Seed's providerConfig decodes to

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use seedguard_common::crd::Seed;
use seedguard_common::{parse_immutable_settings, ImmutableSettings, PROVIDER_CONFIG_PATH};
use seedguard_policy::validate_shape;

use super::read_manifest;
use crate::{Error, Result};

#[derive(Args, Debug)]
pub struct SettingsArgs {
    /// Seed manifest (YAML or JSON)
    pub file: PathBuf,
}

/// Render settings the way the command prints them
pub fn describe(settings: Option<&ImmutableSettings>) -> String {
    match settings {
        None => "none".to_string(),
        Some(s) => {
            let mut out = format!(
                "retentionType: {}\nretentionPeriod: {}",
                s.retention_type, s.retention_period
            );
            if let Err(violation) = validate_shape(s) {
                out.push_str(&format!("\ninvalid: {violation}"));
            }
            out
        }
    }
}

pub async fn run(args: SettingsArgs) -> Result<ExitCode> {
    let seed: Seed = read_manifest(&args.file).await?;
    let config = seed
        .provider_config_bytes()
        .map_err(|source| Error::ProviderConfig {
            field: PROVIDER_CONFIG_PATH,
            source,
        })?;
    let settings = parse_immutable_settings(config.as_deref())?;

    println!("{}", describe(settings.as_ref()));
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedguard_common::RetentionPeriod;

    #[test]
    fn test_describe_absent() {
        assert_eq!(describe(None), "none");
    }

    #[test]
    fn test_describe_uses_canonical_duration() {
        let settings = ImmutableSettings::bucket(RetentionPeriod::from_hours(96));
        assert_eq!(
            describe(Some(&settings)),
            "retentionType: bucket\nretentionPeriod: 96h0m0s"
        );
    }

    #[test]
    fn test_describe_flags_invalid_shape() {
        let settings = ImmutableSettings::new("object", RetentionPeriod::from_hours(1));
        assert!(describe(Some(&settings))
            .ends_with("invalid: invalid retentionType 'object'; must be 'bucket'"));
    }
}
