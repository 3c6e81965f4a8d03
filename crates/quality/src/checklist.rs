//! Inspection checklists.

use std::collections::HashSet;

use brewqa_core::QualityChecklist;

use crate::automated::{GRAVITY_CHECK, PH_CHECK, TEMPERATURE_CHECK};

/// Checks every batch must have before release.
pub const REQUIRED_CHECKS: [&str; 5] = [
    "visual_inspection",
    "taste_test",
    "aroma_evaluation",
    "gravity_reading",
    "ph_measurement",
];

/// Checks worth recording when time allows.
pub const RECOMMENDED_CHECKS: [&str; 4] = [
    "microbiological_test",
    "color_analysis",
    "clarity_check",
    "carbonation_check",
];

/// Sensor checks repeated on every automated assessment.
pub const AUTOMATED_CHECKS: [&str; 3] = [TEMPERATURE_CHECK, GRAVITY_CHECK, PH_CHECK];

/// Build the checklist for a batch given the labels it already has checks for.
///
/// Required and recommended items drop out once recorded; automated items
/// always stay listed.
pub fn build<'a>(recorded: impl IntoIterator<Item = &'a str>) -> QualityChecklist {
    let recorded: HashSet<&str> = recorded.into_iter().collect();
    let outstanding = |candidates: &[&str]| -> Vec<String> {
        candidates
            .iter()
            .filter(|c| !recorded.contains(*c))
            .map(|c| c.to_string())
            .collect()
    };

    QualityChecklist {
        required: outstanding(&REQUIRED_CHECKS),
        recommended: outstanding(&RECOMMENDED_CHECKS),
        automated: AUTOMATED_CHECKS.iter().map(|c| c.to_string()).collect(),
    }
}
