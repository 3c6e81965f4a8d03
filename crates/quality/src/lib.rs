//! Quality assessment for brewery batches.
//!
//! Records inspection checks against production batches and derives batch
//! scores, historical trends, pass/fail statistics and outstanding
//! inspection checklists from them.

#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod config;
pub mod scoring;
pub mod trend;
pub mod automated;
pub mod checklist;

pub use engine::{CheckPage, QualityAssessmentEngine};
pub use error::{EntityKind, QualityError, Result};
pub use config::{AssessmentConfig, ScoringMode};
pub use scoring::Dimension;
