//! Sensor-driven pass/fail rules for automated assessment.

use brewqa_core::{Batch, CheckParameters, Recipe, SensorReadings, Time};
use tracing::debug;

use crate::config::AssessmentConfig;
use crate::error::{QualityError, Result};

/// Label of the automated temperature check.
pub const TEMPERATURE_CHECK: &str = "temperature_automated";
/// Label of the automated gravity check.
pub const GRAVITY_CHECK: &str = "gravity_automated";
/// Label of the automated pH check.
pub const PH_CHECK: &str = "ph_automated";

/// Result of one sensor rule, ready to be recorded as a check.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorOutcome {
    /// Check label
    pub check_type: &'static str,
    /// Whether the reading is within tolerance
    pub passed: bool,
    /// Reading, expectation and deviation
    pub parameters: CheckParameters,
}

/// Temperature passes within `tolerance` degrees of the recipe target.
pub fn evaluate_temperature(reading: f64, recipe: &Recipe, config: &AssessmentConfig) -> SensorOutcome {
    let deviation = (reading - recipe.fermentation_temp).abs();
    SensorOutcome {
        check_type: TEMPERATURE_CHECK,
        passed: deviation <= config.temperature_tolerance,
        parameters: CheckParameters::Temperature {
            reading,
            target: recipe.fermentation_temp,
            deviation,
            tolerance: config.temperature_tolerance,
        },
    }
}

/// Gravity expected after `days` of fermentation, on a linear attenuation curve.
pub fn expected_gravity(original_gravity: f64, days: f64, estimated_days: u32, attenuation: f64) -> f64 {
    let progress = if estimated_days == 0 {
        1.0
    } else {
        (days / f64::from(estimated_days)).min(1.0)
    };
    original_gravity - original_gravity * attenuation * progress
}

/// Gravity passes within `gravity_tolerance` of the expected gravity.
pub fn evaluate_gravity(
    reading: f64,
    batch: &Batch,
    recipe: &Recipe,
    now: Time,
    config: &AssessmentConfig,
) -> Result<SensorOutcome> {
    let original_gravity = batch.original_gravity.ok_or_else(|| {
        QualityError::InvalidInput(format!(
            "batch {} has no original gravity to assess gravity against",
            batch.id
        ))
    })?;

    let expected = expected_gravity(
        original_gravity,
        batch.days_since_start(now),
        recipe.estimated_days,
        config.expected_attenuation,
    );
    let deviation = (reading - expected).abs();

    Ok(SensorOutcome {
        check_type: GRAVITY_CHECK,
        passed: deviation <= config.gravity_tolerance,
        parameters: CheckParameters::Gravity {
            reading,
            expected,
            deviation,
            tolerance: config.gravity_tolerance,
        },
    })
}

/// pH passes inside `[ph_min, ph_max]`.
pub fn evaluate_ph(reading: f64, config: &AssessmentConfig) -> SensorOutcome {
    SensorOutcome {
        check_type: PH_CHECK,
        passed: (config.ph_min..=config.ph_max).contains(&reading),
        parameters: CheckParameters::Ph {
            ph: reading,
            min: config.ph_min,
            max: config.ph_max,
        },
    }
}

/// Evaluate every scored reading. Turbidity and color are accepted but have
/// no rule and produce no outcome.
///
/// Either every supplied reading is evaluated or an error is returned, so an
/// invalid reading stops the assessment before anything is recorded. Store
/// failures while recording the outcomes are outside this guarantee.
pub fn evaluate(
    readings: &SensorReadings,
    batch: &Batch,
    recipe: &Recipe,
    now: Time,
    config: &AssessmentConfig,
) -> Result<Vec<SensorOutcome>> {
    let mut outcomes = Vec::new();

    if let Some(temperature) = readings.temperature {
        outcomes.push(evaluate_temperature(temperature, recipe, config));
    }
    if let Some(gravity) = readings.gravity {
        outcomes.push(evaluate_gravity(gravity, batch, recipe, now, config)?);
    }
    if let Some(ph) = readings.ph {
        outcomes.push(evaluate_ph(ph, config));
    }

    if readings.turbidity.is_some() || readings.color.is_some() {
        debug!(
            batch = %batch.id,
            turbidity = ?readings.turbidity,
            color = ?readings.color,
            "readings without a scoring rule ignored"
        );
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn recipe() -> Recipe {
        Recipe::new("Pale Ale", "APA", 18.5, 10)
    }

    #[test]
    fn test_temperature_rule() {
        let config = AssessmentConfig::default();
        let on_target = evaluate_temperature(18.5, &recipe(), &config);
        assert!(on_target.passed);
        assert_eq!(on_target.parameters.deviation(), Some(0.0));

        assert!(evaluate_temperature(20.5, &recipe(), &config).passed);
        assert!(!evaluate_temperature(21.0, &recipe(), &config).passed);
        assert!(!evaluate_temperature(16.0, &recipe(), &config).passed);
    }

    #[test]
    fn test_expected_gravity_curve() {
        assert_eq!(expected_gravity(1.0, 0.0, 10, 0.75), 1.0);
        assert!((expected_gravity(1.0, 5.0, 10, 0.75) - 0.625).abs() < 1e-12);
        assert!((expected_gravity(1.0, 30.0, 10, 0.75) - 0.25).abs() < 1e-12);
        assert!((expected_gravity(1.0, 0.0, 0, 0.75) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_gravity_rule() {
        let config = AssessmentConfig::default();
        let now = Utc::now();
        let mut batch = Batch::new(recipe().id, "B-1");
        batch.original_gravity = Some(1.048);
        batch.start_date = Some(now - Duration::days(20));

        // Fully attenuated: expected 1.048 * 0.25 = 0.262
        let pass = evaluate_gravity(0.264, &batch, &recipe(), now, &config).unwrap();
        assert!(pass.passed);
        let fail = evaluate_gravity(1.010, &batch, &recipe(), now, &config).unwrap();
        assert!(!fail.passed);
    }

    #[test]
    fn test_gravity_without_original_gravity_is_rejected() {
        let batch = Batch::new(recipe().id, "B-1");
        let err = evaluate_gravity(1.01, &batch, &recipe(), Utc::now(), &AssessmentConfig::default())
            .unwrap_err();
        assert!(matches!(err, QualityError::InvalidInput(_)));
    }

    #[test]
    fn test_ph_rule_bounds_inclusive() {
        let config = AssessmentConfig::default();
        assert!(evaluate_ph(3.8, &config).passed);
        assert!(evaluate_ph(4.6, &config).passed);
        assert!(!evaluate_ph(3.79, &config).passed);
        assert!(!evaluate_ph(4.7, &config).passed);
    }

    #[test]
    fn test_unscored_readings_produce_nothing() {
        let batch = Batch::new(recipe().id, "B-1");
        let readings = SensorReadings {
            turbidity: Some(12.0),
            color: Some(8.0),
            ..Default::default()
        };
        let outcomes =
            evaluate(&readings, &batch, &recipe(), Utc::now(), &AssessmentConfig::default()).unwrap();
        assert!(outcomes.is_empty());
    }
}
