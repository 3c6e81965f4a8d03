//! Query model - filtering, sorting and paging quality checks.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use crate::id::BatchId;
use crate::quality::QualityCheck;
use crate::Time;

/// Filter for listing and counting quality checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckFilter {
    /// Restrict to these batches
    pub batch_ids: Option<Vec<BatchId>>,

    /// Restrict to one exact check label
    pub check_type: Option<String>,

    /// Restrict by result
    pub passed: Option<bool>,

    /// Only checks recorded at or after this time
    pub since: Option<Time>,
}

impl CheckFilter {
    /// Filter for every check of one batch.
    pub fn for_batch(batch_id: BatchId) -> Self {
        Self {
            batch_ids: Some(vec![batch_id]),
            ..Default::default()
        }
    }

    /// Whether a check satisfies every condition of this filter.
    pub fn matches(&self, check: &QualityCheck) -> bool {
        if let Some(batch_ids) = &self.batch_ids {
            if !batch_ids.contains(&check.batch_id) {
                return false;
            }
        }
        if let Some(check_type) = &self.check_type {
            if &check.check_type != check_type {
                return false;
            }
        }
        if let Some(passed) = self.passed {
            if check.passed != passed {
                return false;
            }
        }
        if let Some(since) = self.since {
            if check.created_at < since {
                return false;
            }
        }
        true
    }
}

/// Page-based pagination. Pages start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number
    pub page: usize,

    /// Page size
    pub limit: usize,
}

impl Pagination {
    /// Create pagination for a page.
    pub fn new(page: usize, limit: usize) -> Self {
        Self { page, limit }
    }

    /// Number of records to skip.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Slice one page out of an already sorted list.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.offset()).take(self.limit).collect()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

/// Field to sort checks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Recording time
    CreatedAt,
    /// Check label
    CheckType,
    /// Pass/fail result
    Passed,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

/// Error returned when parsing an unknown sort field or order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort value: {0}")]
pub struct ParseSortError(pub String);

impl std::str::FromStr for SortField {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" | "timestamp" => Ok(Self::CreatedAt),
            "check_type" => Ok(Self::CheckType),
            "passed" => Ok(Self::Passed),
            other => Err(ParseSortError(other.to_string())),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ParseSortError(other.to_string())),
        }
    }
}

/// Sort specification. Defaults to newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSort {
    /// Field to sort by
    pub field: SortField,

    /// Direction
    pub order: SortOrder,
}

impl CheckSort {
    /// Create a sort specification.
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Compare two checks. Ties fall back to the id so the order is total.
    pub fn compare(&self, a: &QualityCheck, b: &QualityCheck) -> Ordering {
        let ord = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::CheckType => a.check_type.cmp(&b.check_type),
            SortField::Passed => a.passed.cmp(&b.passed),
        }
        .then_with(|| a.id.cmp(&b.id));

        match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }

    /// Sort checks in place.
    pub fn sort(&self, checks: &mut [QualityCheck]) {
        checks.sort_by(|a, b| self.compare(a, b));
    }
}

impl Default for CheckSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CheckParameters, UserId};
    use chrono::{Duration, Utc};

    fn check_at(batch_id: BatchId, check_type: &str, passed: bool, minutes_ago: i64) -> QualityCheck {
        let mut check = QualityCheck::new(
            batch_id,
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
    fn test_filter_matches() {
        let batch = BatchId::new();
        let check = check_at(batch, "ph_measurement", false, 5);

        assert!(CheckFilter::for_batch(batch).matches(&check));
        assert!(!CheckFilter::for_batch(BatchId::new()).matches(&check));

        let failed_only = CheckFilter { passed: Some(false), ..Default::default() };
        assert!(failed_only.matches(&check));

        let recent = CheckFilter {
            since: Some(Utc::now() - Duration::minutes(1)),
            ..Default::default()
        };
        assert!(!recent.matches(&check));
    }

    #[test]
    fn test_default_sort_is_newest_first() {
        let batch = BatchId::new();
        let mut checks = vec![
            check_at(batch, "a", true, 30),
            check_at(batch, "b", true, 10),
            check_at(batch, "c", true, 20),
        ];
        CheckSort::default().sort(&mut checks);
        let order: Vec<_> = checks.iter().map(|c| c.check_type.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_pagination_apply() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(Pagination::new(1, 3).apply(items.clone()), vec![1, 2, 3]);
        assert_eq!(Pagination::new(3, 3).apply(items.clone()), vec![7]);
        assert!(Pagination::new(4, 3).apply(items).is_empty());
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!("timestamp".parse::<SortField>().unwrap(), SortField::CreatedAt);
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("color".parse::<SortField>().is_err());
    }
}
