//! Derived assessment views - metrics, trends, statistics and checklists.
//!
//! None of these are persisted; they are recomputed from stored checks on
//! every request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use crate::id::BatchId;
use crate::Time;

/// Quality snapshot for one batch.
///
/// Dimension scores are percentages in `[0, 100]`. `None` means the batch has
/// no checks in that dimension, which is distinct from `Some(0.0)` where every
/// check failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Batch the metrics were computed for
    pub batch_id: BatchId,

    /// Mean of the contributing dimension scores, two decimals
    pub overall_score: f64,

    /// Visual inspection pass rate
    pub visual_score: Option<f64>,

    /// Taste pass rate
    pub taste_score: Option<f64>,

    /// Aroma pass rate
    pub aroma_score: Option<f64>,

    /// Measured final gravity against the expected final gravity
    pub gravity_accuracy: Option<f64>,

    /// pH of the most recent pH check
    pub ph_level: Option<f64>,

    /// No microbiological failures recorded
    pub microbiological_pass: bool,

    /// Every non-empty note on the batch, in check order
    pub notes: Vec<String>,
}

/// Direction of a quality trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Pass rate is rising
    Improving,
    /// Pass rate is falling
    Declining,
    /// No significant change
    Stable,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Improving => "improving",
            Self::Declining => "declining",
            Self::Stable => "stable",
        };
        f.write_str(s)
    }
}

/// One point of a trend: a single check result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// When the check was recorded
    pub date: Time,

    /// 1.0 if passed, 0.0 if failed
    pub value: f64,

    /// Batch the check belongs to
    pub batch_id: BatchId,
}

/// Time-ordered results of one check type with their classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityTrend {
    /// Check label
    pub check_type: String,

    /// Points, oldest first
    pub points: Vec<TrendPoint>,

    /// Classification
    pub trend: TrendDirection,
}

/// Counts for one check type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeStatistics {
    /// Checks recorded
    pub total: usize,

    /// Checks passed
    pub passed: usize,

    /// Checks failed
    pub failed: usize,

    /// Pass percentage, two decimals
    pub pass_rate: f64,
}

/// Aggregate pass/fail statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityStatistics {
    /// Checks recorded
    pub total_checks: usize,

    /// Checks passed
    pub passed_checks: usize,

    /// Checks failed
    pub failed_checks: usize,

    /// Pass percentage, two decimals; 0 when there are no checks
    pub pass_rate: f64,

    /// Breakdown per check label
    pub checks_by_type: BTreeMap<String, TypeStatistics>,
}

/// Outstanding inspection items for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityChecklist {
    /// Mandatory checks not yet recorded
    pub required: Vec<String>,

    /// Recommended checks not yet recorded
    pub recommended: Vec<String>,

    /// Checks run by sensors on every assessment
    pub automated: Vec<String>,
}

/// Sensor readings submitted for automated assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReadings {
    /// Fermentation temperature in degrees Celsius
    #[serde(default)]
    pub temperature: Option<f64>,

    /// Specific gravity
    #[serde(default)]
    pub gravity: Option<f64>,

    /// pH
    #[serde(default)]
    pub ph: Option<f64>,

    /// Turbidity, accepted but not scored
    #[serde(default)]
    pub turbidity: Option<f64>,

    /// Color, accepted but not scored
    #[serde(default)]
    pub color: Option<f64>,
}
