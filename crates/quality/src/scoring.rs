//! Batch scoring - dimension pass rates, gravity accuracy and the overall score.

use brewqa_core::{Batch, QualityCheck, QualityMetrics};

use crate::config::{AssessmentConfig, ScoringMode};

/// Semantic category a check label contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Appearance, clarity, color
    Visual,
    /// Tasting panel
    Taste,
    /// Smell
    Aroma,
    /// Specific gravity readings
    Gravity,
    /// pH readings
    Ph,
    /// Contamination tests
    Microbiological,
}

impl Dimension {
    /// Keyword order decides ties: a label containing several keywords
    /// belongs to the first one listed here.
    pub const ALL: [Dimension; 6] = [
        Dimension::Visual,
        Dimension::Taste,
        Dimension::Aroma,
        Dimension::Gravity,
        Dimension::Ph,
        Dimension::Microbiological,
    ];

    /// Keyword matched against check labels.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Taste => "taste",
            Self::Aroma => "aroma",
            Self::Gravity => "gravity",
            Self::Ph => "ph",
            Self::Microbiological => "microbiological",
        }
    }

    /// Classify a check label by case-insensitive keyword containment.
    pub fn classify(check_type: &str) -> Option<Dimension> {
        let label = check_type.to_lowercase();
        Self::ALL.into_iter().find(|d| label.contains(d.keyword()))
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of passed checks, or `None` for an empty set.
pub fn pass_rate<'a>(checks: impl IntoIterator<Item = &'a QualityCheck>) -> Option<f64> {
    let (total, passed) = checks
        .into_iter()
        .fold((0usize, 0usize), |(t, p), c| (t + 1, p + usize::from(c.passed)));
    if total == 0 {
        None
    } else {
        Some(passed as f64 / total as f64 * 100.0)
    }
}

/// How close the measured final gravity is to the expected one, in percent.
///
/// Expected final gravity is `original_gravity * final_gravity_factor`, a flat
/// simplification of attenuation.
pub fn gravity_accuracy(original_gravity: f64, final_gravity: f64, final_gravity_factor: f64) -> f64 {
    let expected = original_gravity * final_gravity_factor;
    if expected <= 0.0 {
        return 0.0;
    }
    ((1.0 - (expected - final_gravity).abs() / expected) * 100.0).max(0.0)
}

/// Mean of the contributing scores, rounded to two decimals. 0 if none contribute.
pub fn overall_score(scores: &[Option<f64>], mode: ScoringMode) -> f64 {
    let contributing: Vec<f64> = scores
        .iter()
        .flatten()
        .copied()
        .filter(|s| match mode {
            ScoringMode::Legacy => *s != 0.0,
            ScoringMode::Strict => true,
        })
        .collect();

    if contributing.is_empty() {
        return 0.0;
    }
    round2(contributing.iter().sum::<f64>() / contributing.len() as f64)
}

/// Compute the quality snapshot of a batch.
///
/// Returns `None` when the batch has no checks. `checks` may come in any
/// order; notes are collected oldest first.
pub fn compute_metrics(
    batch: &Batch,
    checks: &[QualityCheck],
    config: &AssessmentConfig,
) -> Option<QualityMetrics> {
    if checks.is_empty() {
        return None;
    }

    let mut ordered: Vec<&QualityCheck> = checks.iter().collect();
    ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

    let bucket = |dimension: Dimension| -> Vec<&QualityCheck> {
        ordered
            .iter()
            .copied()
            .filter(|c| Dimension::classify(&c.check_type) == Some(dimension))
            .collect()
    };

    let visual_score = pass_rate(bucket(Dimension::Visual));
    let taste_score = pass_rate(bucket(Dimension::Taste));
    let aroma_score = pass_rate(bucket(Dimension::Aroma));

    let gravity_accuracy = if bucket(Dimension::Gravity).is_empty() {
        None
    } else {
        match (batch.original_gravity, batch.final_gravity) {
            (Some(og), Some(fg)) => Some(gravity_accuracy(og, fg, config.final_gravity_factor())),
            _ => None,
        }
    };

    let ph_level = bucket(Dimension::Ph).last().and_then(|c| c.parameters.ph());

    let microbiological_pass = bucket(Dimension::Microbiological).iter().all(|c| c.passed);

    let overall_score = overall_score(
        &[visual_score, taste_score, aroma_score, gravity_accuracy],
        config.scoring_mode,
    );

    let notes = ordered
        .iter()
        .filter_map(|c| c.notes.as_deref())
        .filter(|n| !n.trim().is_empty())
        .map(str::to_string)
        .collect();

    Some(QualityMetrics {
        batch_id: batch.id,
        overall_score,
        visual_score,
        taste_score,
        aroma_score,
        gravity_accuracy,
        ph_level,
        microbiological_pass,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewqa_core::{CheckParameters, RecipeId, UserId};
    use chrono::{Duration, Utc};

    fn check(batch: &Batch, check_type: &str, passed: bool, minutes_ago: i64) -> QualityCheck {
        let mut check = QualityCheck::new(
            batch.id,
            UserId::new(),
            check_type,
            passed,
            CheckParameters::empty(),
            None,
        );
        check.created_at = Utc::now() - Duration::minutes(minutes_ago);
        check
    }

    #[test]
    fn test_classify_keywords() {
        assert_eq!(Dimension::classify("visual_inspection"), Some(Dimension::Visual));
        assert_eq!(Dimension::classify("Taste_Panel"), Some(Dimension::Taste));
        assert_eq!(Dimension::classify("gravity_automated"), Some(Dimension::Gravity));
        assert_eq!(Dimension::classify("ph_measurement"), Some(Dimension::Ph));
        assert_eq!(Dimension::classify("MICROBIOLOGICAL_swab"), Some(Dimension::Microbiological));
        assert_eq!(Dimension::classify("temperature_automated"), None);
    }

    #[test]
    fn test_classify_first_keyword_wins() {
        assert_eq!(Dimension::classify("aroma_and_taste"), Some(Dimension::Taste));
        assert_eq!(Dimension::classify("gravity_ph_combo"), Some(Dimension::Gravity));
    }

    #[test]
    fn test_empty_checks_have_no_metrics() {
        let batch = Batch::new(RecipeId::new(), "B-1");
        assert!(compute_metrics(&batch, &[], &AssessmentConfig::default()).is_none());
    }

    #[test]
    fn test_dimension_scores() {
        let batch = Batch::new(RecipeId::new(), "B-1");
        let checks = vec![
            check(&batch, "visual_inspection", true, 4),
            check(&batch, "visual_clarity", false, 3),
            check(&batch, "taste_test", true, 2),
            check(&batch, "temperature_automated", false, 1),
        ];

        let metrics = compute_metrics(&batch, &checks, &AssessmentConfig::default()).unwrap();
        assert_eq!(metrics.visual_score, Some(50.0));
        assert_eq!(metrics.taste_score, Some(100.0));
        assert_eq!(metrics.aroma_score, None);
        assert_eq!(metrics.gravity_accuracy, None);
        assert_eq!(metrics.overall_score, 75.0);
        assert!(metrics.microbiological_pass);
    }

    #[test]
    fn test_overall_score_modes() {
        let scores = [Some(0.0), Some(100.0), None, Some(50.0)];
        assert_eq!(overall_score(&scores, ScoringMode::Legacy), 75.0);
        assert_eq!(overall_score(&scores, ScoringMode::Strict), 50.0);
        assert_eq!(overall_score(&[Some(100.0), Some(50.0), Some(50.0)], ScoringMode::Legacy), 66.67);
        assert_eq!(overall_score(&[None, Some(0.0)], ScoringMode::Legacy), 0.0);
    }

    #[test]
    fn test_gravity_accuracy_requires_readings_and_check() {
        let mut batch = Batch::new(RecipeId::new(), "B-1");
        batch.original_gravity = Some(1.0);
        batch.final_gravity = Some(0.25);
        let config = AssessmentConfig::default();

        let no_gravity_check = vec![check(&batch, "taste_test", true, 1)];
        let metrics = compute_metrics(&batch, &no_gravity_check, &config).unwrap();
        assert_eq!(metrics.gravity_accuracy, None);

        let with_gravity = vec![check(&batch, "gravity_reading", true, 1)];
        let metrics = compute_metrics(&batch, &with_gravity, &config).unwrap();
        assert_eq!(metrics.gravity_accuracy, Some(100.0));

        batch.final_gravity = None;
        let metrics = compute_metrics(&batch, &with_gravity, &config).unwrap();
        assert_eq!(metrics.gravity_accuracy, None);
    }

    #[test]
    fn test_gravity_accuracy_is_clamped() {
        assert_eq!(gravity_accuracy(1.0, 0.75, 0.25), 0.0);
        assert_eq!(gravity_accuracy(1.0, 3.0, 0.25), 0.0);
        assert!((gravity_accuracy(1.0, 0.3, 0.25) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_ph_level_from_latest_check() {
        let batch = Batch::new(RecipeId::new(), "B-1");
        let mut old = check(&batch, "ph_measurement", true, 10);
        old.parameters = CheckParameters::Ph { ph: 4.0, min: 3.8, max: 4.6 };
        let mut new = check(&batch, "ph_automated", true, 1);
        new.parameters = CheckParameters::Ph { ph: 4.3, min: 3.8, max: 4.6 };

        let metrics = compute_metrics(&batch, &[new, old], &AssessmentConfig::default()).unwrap();
        assert_eq!(metrics.ph_level, Some(4.3));
    }

    #[test]
    fn test_microbiological_failure_and_notes() {
        let batch = Batch::new(RecipeId::new(), "B-1");
        let mut first = check(&batch, "microbiological_test", false, 5);
        first.notes = Some("lactobacillus detected".to_string());
        let mut second = check(&batch, "aroma_evaluation", true, 2);
        second.notes = Some("   ".to_string());
        let mut third = check(&batch, "visual_inspection", true, 1);
        third.notes = Some("bright".to_string());

        let metrics =
            compute_metrics(&batch, &[third, first, second], &AssessmentConfig::default()).unwrap();
        assert!(!metrics.microbiological_pass);
        assert_eq!(metrics.notes, vec!["lactobacillus detected", "bright"]);
    }

    #[test]
    fn test_scores_are_percentages() {
        let batch = Batch::new(RecipeId::new(), "B-1");
        let checks: Vec<_> = (0..7)
            .map(|i| check(&batch, "aroma_evaluation", i % 3 == 0, i))
            .collect();
        let metrics = compute_metrics(&batch, &checks, &AssessmentConfig::default()).unwrap();
        let aroma = metrics.aroma_score.unwrap();
        assert!((0.0..=100.0).contains(&aroma));
        assert_eq!(metrics.overall_score, round2(aroma));
    }
}
