//! brewqa core data models.
//!
//! Records owned by the production side of the brewery (recipes, batches,
//! inspectors), the quality checks recorded against batches, and the derived
//! views the assessment engine computes from them.

#![warn(missing_docs)]

// Core identities
mod id;

// Production records
mod batch;
mod user;

// Quality records and queries
mod quality;
mod query;
mod assessment;

// Re-exports
pub use id::*;

pub use batch::{Batch, Recipe};
pub use user::{ParseRoleError, User, UserRole};

pub use quality::{CheckParameters, QualityCheck, QualityCheckPatch};
pub use query::{CheckFilter, CheckSort, Pagination, ParseSortError, SortField, SortOrder};
pub use assessment::{
    QualityChecklist, QualityMetrics, QualityStatistics, QualityTrend, SensorReadings,
    TrendDirection, TrendPoint, TypeStatistics,
};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
