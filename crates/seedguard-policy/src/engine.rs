//! Immutable-retention policy engine
//!
//! Decides whether retention settings may be created, and whether a change
//! from old to new settings is permitted. Settings may only be strengthened:
//! once enabled they cannot be removed, the period cannot shrink, and the
//! retention type cannot change.
//!
//! The engine is pure. Every call re-derives settings from the payloads it
//! is given, so concurrent admission requests for the same Seed never see
//! each other's state.

use seedguard_common::{
    parse_immutable_settings, ImmutableSettings, BUCKET_RETENTION_TYPE,
};

use crate::violation::{PolicyViolation, SettingsOrigin};

/// Check applied to a single settings value
type ShapeRule = fn(&ImmutableSettings) -> Result<(), PolicyViolation>;

/// Check applied to an old -> new transition where both sides are present
type TransitionRule = fn(&ImmutableSettings, &ImmutableSettings) -> Result<(), PolicyViolation>;

/// Shape rules, evaluated in order; the first failure is reported
const SHAPE_RULES: &[ShapeRule] = &[require_bucket_type, require_positive_period];

/// Transition rules, evaluated in order; the first failure is reported.
///
/// Period reduction is listed first so it wins when an update both shortens
/// the period and changes the type.
const TRANSITION_RULES: &[TransitionRule] = &[forbid_period_reduction, forbid_type_change];

fn require_bucket_type(settings: &ImmutableSettings) -> Result<(), PolicyViolation> {
    if settings.retention_type == BUCKET_RETENTION_TYPE {
        Ok(())
    } else {
        Err(PolicyViolation::InvalidRetentionType {
            value: settings.retention_type.clone(),
        })
    }
}

fn require_positive_period(settings: &ImmutableSettings) -> Result<(), PolicyViolation> {
    if settings.retention_period.is_positive() {
        Ok(())
    } else {
        Err(PolicyViolation::NonPositiveRetentionPeriod {
            period: settings.retention_period,
        })
    }
}

fn forbid_period_reduction(
    old: &ImmutableSettings,
    new: &ImmutableSettings,
) -> Result<(), PolicyViolation> {
    if new.retention_period < old.retention_period {
        Err(PolicyViolation::RetentionPeriodReduced {
            old: old.retention_period,
            new: new.retention_period,
        })
    } else {
        Ok(())
    }
}

fn forbid_type_change(
    old: &ImmutableSettings,
    new: &ImmutableSettings,
) -> Result<(), PolicyViolation> {
    if new.retention_type == old.retention_type {
        Ok(())
    } else {
        Err(PolicyViolation::RetentionTypeChanged {
            old: old.retention_type.clone(),
            new: new.retention_type.clone(),
        })
    }
}

/// Check that settings satisfy the domain constraints: type `bucket`, then
/// a strictly positive period.
pub fn validate_shape(settings: &ImmutableSettings) -> Result<(), PolicyViolation> {
    SHAPE_RULES.iter().try_for_each(|rule| rule(settings))
}

/// Stateless evaluator for create and update rules
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEngine;

impl PolicyEngine {
    /// Create a new policy engine
    pub fn new() -> Self {
        Self
    }

    /// Validate parsed settings.
    ///
    /// On create `old` is ignored; there is no prior state.
    pub fn validate(
        &self,
        old: Option<&ImmutableSettings>,
        new: Option<&ImmutableSettings>,
        is_create: bool,
    ) -> Result<(), PolicyViolation> {
        if is_create {
            self.validate_create(new)
        } else {
            self.validate_update(old, new)
        }
    }

    /// Create rule: absent settings are fine, present ones must be well-shaped
    pub fn validate_create(&self, new: Option<&ImmutableSettings>) -> Result<(), PolicyViolation> {
        match new {
            None => Ok(()),
            Some(settings) => validate_shape(settings),
        }
    }

    /// Update rule: settings may be introduced or strengthened, never
    /// removed or weakened
    pub fn validate_update(
        &self,
        old: Option<&ImmutableSettings>,
        new: Option<&ImmutableSettings>,
    ) -> Result<(), PolicyViolation> {
        match (old, new) {
            // Old settings are not re-validated; removal is refused outright
            (Some(_), None) => Err(PolicyViolation::DisablingNotAllowed),
            (Some(old), Some(new)) => TRANSITION_RULES
                .iter()
                .try_for_each(|rule| rule(old, new)),
            (None, Some(new)) => validate_shape(new),
            (None, None) => Ok(()),
        }
    }

    /// Parse raw provider configurations and validate them.
    ///
    /// Parse failures are reported with the snapshot they came from. On
    /// create only `new_config` is read.
    pub fn validate_configs(
        &self,
        old_config: Option<&[u8]>,
        new_config: Option<&[u8]>,
        is_create: bool,
    ) -> Result<(), PolicyViolation> {
        if is_create {
            let new = parse_immutable_settings(new_config)
                .map_err(|e| PolicyViolation::settings(SettingsOrigin::Created, e))?;
            return self.validate_create(new.as_ref());
        }

        let old = parse_immutable_settings(old_config)
            .map_err(|e| PolicyViolation::settings(SettingsOrigin::Old, e))?;
        let new = parse_immutable_settings(new_config)
            .map_err(|e| PolicyViolation::settings(SettingsOrigin::New, e))?;
        self.validate_update(old.as_ref(), new.as_ref())
    }
}
