//! Recipe and batch model - the production runs quality checks belong to.

use serde::{Deserialize, Serialize};
use crate::id::{BatchId, RecipeId};
use crate::Time;

/// A recipe a batch is brewed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique identifier
    pub id: RecipeId,

    /// Recipe name
    pub name: String,

    /// Beer style
    pub style: String,

    /// Target fermentation temperature in degrees Celsius
    pub fermentation_temp: f64,

    /// Estimated fermentation duration in days
    pub estimated_days: u32,
}

impl Recipe {
    /// Create a new recipe.
    pub fn new(
        name: impl Into<String>,
        style: impl Into<String>,
        fermentation_temp: f64,
        estimated_days: u32,
    ) -> Self {
        Self {
            id: RecipeId::new(),
            name: name.into(),
            style: style.into(),
            fermentation_temp,
            estimated_days,
        }
    }
}

/// A single production run of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// Unique identifier
    pub id: BatchId,

    /// Recipe this batch is brewed from
    pub recipe_id: RecipeId,

    /// Human-facing batch number
    pub batch_number: String,

    /// When brewing started
    pub start_date: Option<Time>,

    /// Specific gravity before fermentation
    pub original_gravity: Option<f64>,

    /// Specific gravity after fermentation
    pub final_gravity: Option<f64>,

    /// When created
    pub created_at: Time,
}

impl Batch {
    /// Create a new batch with no readings yet.
    pub fn new(recipe_id: RecipeId, batch_number: impl Into<String>) -> Self {
        Self {
            id: BatchId::new(),
            recipe_id,
            batch_number: batch_number.into(),
            start_date: None,
            original_gravity: None,
            final_gravity: None,
            created_at: chrono::Utc::now(),
        }
    }

    /// Days elapsed since brewing started, or zero if it has not started.
    pub fn days_since_start(&self, now: Time) -> f64 {
        match self.start_date {
            Some(start) => ((now - start).num_seconds() as f64 / 86_400.0).max(0.0),
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_days_since_start() {
        let now = Utc::now();
        let mut batch = Batch::new(RecipeId::new(), "B-001");
        assert_eq!(batch.days_since_start(now), 0.0);

        batch.start_date = Some(now - Duration::hours(36));
        assert!((batch.days_since_start(now) - 1.5).abs() < 1e-9);

        batch.start_date = Some(now + Duration::days(2));
        assert_eq!(batch.days_since_start(now), 0.0);
    }
}
