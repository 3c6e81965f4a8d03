//! Assessment tolerances and limits.

use serde::{Deserialize, Serialize};

/// How the overall score treats dimensions scoring exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Zero scores are left out of the mean, same as missing dimensions.
    #[default]
    Legacy,
    /// Only missing dimensions are left out; a zero score counts.
    Strict,
}

/// Tunable rules used by the engine. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentConfig {
    /// Allowed fermentation temperature deviation from the recipe target, °C
    pub temperature_tolerance: f64,

    /// Allowed deviation from the expected specific gravity
    pub gravity_tolerance: f64,

    /// Lowest acceptable pH
    pub ph_min: f64,

    /// Highest acceptable pH
    pub ph_max: f64,

    /// Fraction of original gravity consumed by the end of fermentation.
    ///
    /// This is a flat simplification, not a brewing-accurate attenuation model.
    pub expected_attenuation: f64,

    /// Default trailing window for trend analysis, days
    pub trend_window_days: u32,

    /// Default number of failed checks returned
    pub failed_checks_limit: usize,

    /// Largest page size accepted when listing checks
    pub max_page_limit: usize,

    /// Overall score averaging mode
    pub scoring_mode: ScoringMode,
}

impl AssessmentConfig {
    /// Expected final gravity as a fraction of original gravity.
    pub fn final_gravity_factor(&self) -> f64 {
        1.0 - self.expected_attenuation
    }
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            temperature_tolerance: 2.0,
            gravity_tolerance: 0.005,
            ph_min: 3.8,
            ph_max: 4.6,
            expected_attenuation: 0.75,
            trend_window_days: 30,
            failed_checks_limit: 20,
            max_page_limit: 1000,
            scoring_mode: ScoringMode::Legacy,
        }
    }
}
