//! Quality check model - one inspection event recorded against a batch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use crate::id::{BatchId, QualityCheckId, UserId};
use crate::Time;

/// One inspection event, manual or automated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityCheck {
    /// Unique identifier
    pub id: QualityCheckId,

    /// Batch this check was recorded against
    pub batch_id: BatchId,

    /// Who recorded the check
    pub inspector_id: UserId,

    /// Free-text check label, e.g. `visual_inspection` or `gravity_automated`
    pub check_type: String,

    /// Pass/fail result
    pub passed: bool,

    /// Measurements backing the result
    pub parameters: CheckParameters,

    /// Inspector notes
    pub notes: Option<String>,

    /// When recorded
    pub created_at: Time,
}

impl QualityCheck {
    /// Create a new check stamped with the current time.
    pub fn new(
        batch_id: BatchId,
        inspector_id: UserId,
        check_type: impl Into<String>,
        passed: bool,
        parameters: CheckParameters,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: QualityCheckId::new(),
            batch_id,
            inspector_id,
            check_type: check_type.into(),
            passed,
            parameters,
            notes,
            created_at: chrono::Utc::now(),
        }
    }

    /// Overwrite the fields present in `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: QualityCheckPatch) {
        if let Some(check_type) = patch.check_type {
            self.check_type = check_type;
        }
        if let Some(passed) = patch.passed {
            self.passed = passed;
        }
        if let Some(parameters) = patch.parameters {
            self.parameters = parameters;
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
    }
}

/// Measurements recorded with a check.
///
/// Known shapes get their own variant; anything else is kept as an opaque
/// key-value map so new check types can be recorded without a model change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckParameters {
    /// Fermentation temperature against the recipe target
    Temperature {
        /// Measured temperature, °C
        reading: f64,
        /// Recipe target, °C
        target: f64,
        /// Absolute difference from the target
        deviation: f64,
        /// Allowed deviation
        tolerance: f64,
    },
    /// Specific gravity against the expected attenuation curve
    Gravity {
        /// Measured specific gravity
        reading: f64,
        /// Expected specific gravity at this point of fermentation
        expected: f64,
        /// Absolute difference from the expectation
        deviation: f64,
        /// Allowed deviation
        tolerance: f64,
    },
    /// pH against the accepted range
    Ph {
        /// Measured pH
        ph: f64,
        /// Lowest acceptable pH
        min: f64,
        /// Highest acceptable pH
        max: f64,
    },
    /// Anything else
    Generic(BTreeMap<String, serde_json::Value>),
}

impl CheckParameters {
    /// Empty generic parameter bag.
    pub fn empty() -> Self {
        Self::Generic(BTreeMap::new())
    }

    /// pH reading carried by these parameters, if any.
    pub fn ph(&self) -> Option<f64> {
        match self {
            Self::Ph { ph, .. } => Some(*ph),
            Self::Generic(values) => values.get("ph").and_then(|v| v.as_f64()),
            _ => None,
        }
    }

    /// Deviation from the expected value, if any.
    pub fn deviation(&self) -> Option<f64> {
        match self {
            Self::Temperature { deviation, .. } | Self::Gravity { deviation, .. } => Some(*deviation),
            Self::Generic(values) => values.get("deviation").and_then(|v| v.as_f64()),
            Self::Ph { .. } => None,
        }
    }
}

impl Default for CheckParameters {
    fn default() -> Self {
        Self::empty()
    }
}

/// Partial update of a quality check. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityCheckPatch {
    /// New check label
    #[serde(default)]
    pub check_type: Option<String>,

    /// New result
    #[serde(default)]
    pub passed: Option<bool>,

    /// New parameters
    #[serde(default)]
    pub parameters: Option<CheckParameters>,

    /// New notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl QualityCheckPatch {
    /// True if the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.check_type.is_none()
            && self.passed.is_none()
            && self.parameters.is_none()
            && self.notes.is_none()
    }
}
