//! Trend analysis - per check type pass/fail history and its direction.

use std::collections::HashMap;

use brewqa_core::{QualityCheck, QualityTrend, TrendDirection, TrendPoint};

/// Points in the recent window.
pub const RECENT_WINDOW: usize = 5;

/// Points considered in total: the recent window plus the one before it.
pub const HISTORY_WINDOW: usize = 10;

/// Fewer points than this are always stable.
pub const MIN_POINTS: usize = 3;

/// Mean difference between windows that counts as a change.
pub const CHANGE_THRESHOLD: f64 = 0.1;

/// Classify a time-ordered series of 0/1 values.
///
/// Compares the mean of the last [`RECENT_WINDOW`] values with the mean of the
/// values in `[n - HISTORY_WINDOW, n - RECENT_WINDOW)`. With fewer than
/// [`MIN_POINTS`] values, or nothing before the recent window, the series is
/// stable.
pub fn classify(values: &[f64]) -> TrendDirection {
    let n = values.len();
    if n < MIN_POINTS {
        return TrendDirection::Stable;
    }

    let recent = &values[n.saturating_sub(RECENT_WINDOW)..];
    let earlier = &values[n.saturating_sub(HISTORY_WINDOW)..n.saturating_sub(RECENT_WINDOW)];
    if earlier.is_empty() {
        return TrendDirection::Stable;
    }

    let diff = mean(recent) - mean(earlier);
    if diff > CHANGE_THRESHOLD {
        TrendDirection::Improving
    } else if diff < -CHANGE_THRESHOLD {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Group checks by type and classify each group.
///
/// Groups come out in order of each type's first (oldest) appearance; points
/// inside a group are oldest first.
pub fn build_trends(checks: &[QualityCheck]) -> Vec<QualityTrend> {
    let mut ordered: Vec<&QualityCheck> = checks.iter().collect();
    ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<TrendPoint>)> = Vec::new();

    for check in ordered {
        let slot = *index.entry(check.check_type.as_str()).or_insert_with(|| {
            groups.push((check.check_type.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(TrendPoint {
            date: check.created_at,
            value: if check.passed { 1.0 } else { 0.0 },
            batch_id: check.batch_id,
        });
    }

    groups
        .into_iter()
        .map(|(check_type, points)| {
            let values: Vec<f64> = points.iter().map(|p| p.value).collect();
            QualityTrend {
                check_type,
                trend: classify(&values),
                points,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewqa_core::{BatchId, CheckParameters, UserId};
    use chrono::{Duration, Utc};

    #[test]
    fn test_two_points_are_stable() {
        assert_eq!(classify(&[0.0, 1.0]), TrendDirection::Stable);
        assert_eq!(classify(&[1.0, 0.0]), TrendDirection::Stable);
    }

    #[test]
    fn test_no_earlier_window_is_stable() {
        assert_eq!(classify(&[0.0, 0.0, 1.0, 1.0, 1.0]), TrendDirection::Stable);
    }

    #[test]
    fn test_improving_with_overlap() {
        // Last five average 1.0, the three before them average 0.0.
        let values = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        assert_eq!(classify(&values), TrendDirection::Improving);
    }

    #[test]
    fn test_declining() {
        let values = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0];
        assert_eq!(classify(&values), TrendDirection::Declining);
    }

    #[test]
    fn test_small_change_is_stable() {
        // 0.6 vs 0.6
        let values = [1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0];
        assert_eq!(classify(&values), TrendDirection::Stable);
    }

    #[test]
    fn test_only_last_ten_points_count() {
        // The leading failures fall outside the history window.
        let mut values = vec![0.0; 20];
        values.extend([1.0; 10]);
        assert_eq!(classify(&values), TrendDirection::Stable);
    }

    #[test]
    fn test_build_trends_groups_in_first_appearance_order() {
        let batch_id = BatchId::new();
        let inspector = UserId::new();
        let now = Utc::now();
        let make = |check_type: &str, passed: bool, minutes_ago: i64| {
            let mut check = QualityCheck::new(
                batch_id,
                inspector,
                check_type,
                passed,
                CheckParameters::empty(),
                None,
            );
            check.created_at = now - Duration::minutes(minutes_ago);
            check
        };

        let checks = vec![
            make("taste_test", true, 5),
            make("visual_inspection", false, 10),
            make("taste_test", false, 1),
            make("visual_inspection", true, 3),
        ];

        let trends = build_trends(&checks);
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].check_type, "visual_inspection");
        assert_eq!(trends[1].check_type, "taste_test");

        let values: Vec<f64> = trends[1].points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 0.0]);
        assert_eq!(trends[1].trend, TrendDirection::Stable);
        assert!(trends[0].points[0].date < trends[0].points[1].date);
    }
}
