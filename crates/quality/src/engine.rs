//! Quality assessment engine.
//!
//! Every operation is a single request-scoped pass over the store: look up,
//! compute, optionally write once. The engine keeps no state of its own
//! besides its configuration, so one instance can serve concurrent callers.

use std::sync::Arc;

use brewqa_core::{
    Batch, BatchId, CheckFilter, CheckParameters, CheckSort, Pagination, QualityCheck,
    QualityCheckId, QualityCheckPatch, QualityChecklist, QualityMetrics, QualityStatistics,
    QualityTrend, Recipe, RecipeId, SensorReadings, SortField, SortOrder, UserId,
};
use brewqa_storage::{BatchStore, QualityCheckStore, Storage, UserStore};
use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::AssessmentConfig;
use crate::error::{EntityKind, QualityError, Result};
use crate::scoring::round2;
use crate::{automated, checklist, scoring, trend};

/// One page of a batch's checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckPage {
    /// Checks on this page
    pub checks: Vec<QualityCheck>,

    /// Checks recorded for the batch in total
    pub total: usize,
}

/// Quality assessment engine over a pluggable store.
pub struct QualityAssessmentEngine<S: Storage> {
    storage: Arc<S>,
    config: AssessmentConfig,
}

impl<S: Storage> QualityAssessmentEngine<S> {
    /// Create an engine with default rules.
    pub fn new(storage: S) -> Self {
        Self::from_shared(Arc::new(storage))
    }

    /// Create an engine over a store shared with other components.
    pub fn from_shared(storage: Arc<S>) -> Self {
        Self {
            storage,
            config: AssessmentConfig::default(),
        }
    }

    /// Replace the assessment rules.
    pub fn with_config(mut self, config: AssessmentConfig) -> Self {
        self.config = config;
        self
    }

    /// Underlying store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Active rules.
    pub fn config(&self) -> &AssessmentConfig {
        &self.config
    }

    // === Check records ===

    /// Record a check against a batch.
    ///
    /// Fails with `NotFound` if the batch or the inspector does not exist.
    pub async fn create_check(
        &self,
        batch_id: BatchId,
        inspector_id: UserId,
        check_type: &str,
        passed: bool,
        parameters: CheckParameters,
        notes: Option<String>,
    ) -> Result<QualityCheck> {
        validate_check_type(check_type)?;
        self.require_batch(batch_id).await?;
        if self.storage.load_user(inspector_id).await?.is_none() {
            return Err(QualityError::not_found(EntityKind::User, inspector_id));
        }

        let check = QualityCheck::new(batch_id, inspector_id, check_type, passed, parameters, notes);
        self.storage.create_check(&check).await?;

        info!(
            check = %check.id,
            batch = %batch_id,
            check_type = %check.check_type,
            passed,
            "quality check recorded"
        );
        Ok(check)
    }

    /// One page of a batch's checks plus the batch's total check count.
    pub async fn list_checks(
        &self,
        batch_id: BatchId,
        pagination: Pagination,
        sort: CheckSort,
    ) -> Result<CheckPage> {
        if pagination.page == 0 {
            return Err(QualityError::InvalidInput("page must be at least 1".to_string()));
        }
        if pagination.limit == 0 || pagination.limit > self.config.max_page_limit {
            return Err(QualityError::InvalidInput(format!(
                "limit must be between 1 and {}",
                self.config.max_page_limit
            )));
        }
        self.require_batch(batch_id).await?;

        let filter = CheckFilter::for_batch(batch_id);
        let checks = self.storage.find_checks(&filter, &sort, Some(pagination)).await?;
        let total = self.storage.count_checks(&filter).await?;

        debug!(batch = %batch_id, page = pagination.page, returned = checks.len(), total, "listed checks");
        Ok(CheckPage { checks, total })
    }

    /// Look up a check.
    pub async fn get_check(&self, id: QualityCheckId) -> Result<QualityCheck> {
        self.storage
            .load_check(id)
            .await?
            .ok_or_else(|| QualityError::not_found(EntityKind::QualityCheck, id))
    }

    /// Overwrite the fields present in `patch`. Concurrent updates to the same
    /// check are last-write-wins.
    pub async fn update_check(&self, id: QualityCheckId, patch: QualityCheckPatch) -> Result<QualityCheck> {
        if let Some(check_type) = &patch.check_type {
            validate_check_type(check_type)?;
        }

        let mut check = self.get_check(id).await?;
        check.apply(patch);
        self.storage.update_check(&check).await?;

        debug!(check = %id, "quality check updated");
        Ok(check)
    }

    /// Delete a check.
    pub async fn delete_check(&self, id: QualityCheckId) -> Result<()> {
        if !self.storage.delete_check(id).await? {
            return Err(QualityError::not_found(EntityKind::QualityCheck, id));
        }
        info!(check = %id, "quality check deleted");
        Ok(())
    }

    // === Derived views ===

    /// Quality snapshot for a batch, or `None` if it has no checks yet.
    pub async fn compute_metrics(&self, batch_id: BatchId) -> Result<Option<QualityMetrics>> {
        let batch = self.require_batch(batch_id).await?;
        let checks = self
            .storage
            .find_checks(&CheckFilter::for_batch(batch_id), &oldest_first(), None)
            .await?;

        debug!(batch = %batch_id, checks = checks.len(), "computing metrics");
        Ok(scoring::compute_metrics(&batch, &checks, &self.config))
    }

    /// Per check type trends over the trailing `window_days` (default from config).
    pub async fn compute_trends(
        &self,
        recipe_id: Option<RecipeId>,
        check_type: Option<&str>,
        window_days: Option<u32>,
    ) -> Result<Vec<QualityTrend>> {
        let window_days = window_days.unwrap_or(self.config.trend_window_days);
        if window_days == 0 {
            return Err(QualityError::InvalidInput("window must be at least one day".to_string()));
        }

        let Some(mut filter) = self.batch_scope(recipe_id).await?.filter() else {
            return Ok(Vec::new());
        };
        filter.check_type = check_type.map(str::to_string);
        // A window reaching past the earliest representable instant covers everything.
        filter.since = Duration::try_days(i64::from(window_days))
            .and_then(|window| Utc::now().checked_sub_signed(window));
        let checks = self.storage.find_checks(&filter, &oldest_first(), None).await?;

        debug!(?recipe_id, ?check_type, window_days, checks = checks.len(), "computing trends");
        Ok(trend::build_trends(&checks))
    }

    /// Pass/fail counts overall and per check type, optionally for one recipe.
    pub async fn get_statistics(&self, recipe_id: Option<RecipeId>) -> Result<QualityStatistics> {
        let Some(filter) = self.batch_scope(recipe_id).await?.filter() else {
            return Ok(QualityStatistics::default());
        };
        let checks = self.storage.find_checks(&filter, &oldest_first(), None).await?;

        let mut stats = QualityStatistics::default();
        for check in &checks {
            let entry = stats.checks_by_type.entry(check.check_type.clone()).or_default();
            entry.total += 1;
            if check.passed {
                entry.passed += 1;
                stats.passed_checks += 1;
            } else {
                entry.failed += 1;
                stats.failed_checks += 1;
            }
        }
        stats.total_checks = checks.len();
        stats.pass_rate = percentage(stats.passed_checks, stats.total_checks);
        for entry in stats.checks_by_type.values_mut() {
            entry.pass_rate = percentage(entry.passed, entry.total);
        }

        Ok(stats)
    }

    /// Most recent failed checks, newest first (limit defaults from config).
    pub async fn get_failed_checks(&self, limit: Option<usize>) -> Result<Vec<QualityCheck>> {
        let limit = limit.unwrap_or(self.config.failed_checks_limit);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let filter = CheckFilter {
            passed: Some(false),
            ..Default::default()
        };
        let checks = self
            .storage
            .find_checks(&filter, &CheckSort::default(), Some(Pagination::new(1, limit)))
            .await?;
        Ok(checks)
    }

    // === Automation ===

    /// Score sensor readings against the batch's recipe and record one check
    /// per scored reading. Returns only the checks created.
    pub async fn run_automated_assessment(
        &self,
        batch_id: BatchId,
        inspector_id: UserId,
        readings: SensorReadings,
    ) -> Result<Vec<QualityCheck>> {
        let batch = self.require_batch(batch_id).await?;
        let recipe = self.require_recipe(batch.recipe_id).await?;

        let outcomes = automated::evaluate(&readings, &batch, &recipe, Utc::now(), &self.config)?;

        // No transaction: a store error mid-loop keeps the checks already written.
        let mut created = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            let check = self
                .create_check(
                    batch_id,
                    inspector_id,
                    outcome.check_type,
                    outcome.passed,
                    outcome.parameters,
                    None,
                )
                .await?;
            created.push(check);
        }

        info!(
            batch = %batch_id,
            created = created.len(),
            failed = created.iter().filter(|c| !c.passed).count(),
            "automated assessment complete"
        );
        Ok(created)
    }

    /// Outstanding inspection items for a batch.
    pub async fn generate_checklist(&self, batch_id: BatchId) -> Result<QualityChecklist> {
        self.require_batch(batch_id).await?;
        let checks = self
            .storage
            .find_checks(&CheckFilter::for_batch(batch_id), &oldest_first(), None)
            .await?;
        Ok(checklist::build(checks.iter().map(|c| c.check_type.as_str())))
    }

    // === Lookups ===

    async fn require_batch(&self, id: BatchId) -> Result<Batch> {
        self.storage
            .load_batch(id)
            .await?
            .ok_or_else(|| QualityError::not_found(EntityKind::Batch, id))
    }

    async fn require_recipe(&self, id: RecipeId) -> Result<Recipe> {
        self.storage
            .load_recipe(id)
            .await?
            .ok_or_else(|| QualityError::not_found(EntityKind::Recipe, id))
    }

    async fn batch_scope(&self, recipe_id: Option<RecipeId>) -> Result<BatchScope> {
        let Some(recipe_id) = recipe_id else {
            return Ok(BatchScope::All);
        };
        let batch_ids: Vec<BatchId> = self
            .storage
            .list_batches(Some(recipe_id))
            .await?
            .into_iter()
            .map(|b| b.id)
            .collect();
        if batch_ids.is_empty() {
            Ok(BatchScope::Empty)
        } else {
            Ok(BatchScope::Batches(batch_ids))
        }
    }
}

/// Batches a recipe-scoped query covers.
enum BatchScope {
    /// No recipe given
    All,
    /// The recipe's batches
    Batches(Vec<BatchId>),
    /// The recipe has no batches
    Empty,
}

impl BatchScope {
    /// Base filter for the scope, or `None` if nothing can match.
    fn filter(self) -> Option<CheckFilter> {
        match self {
            Self::All => Some(CheckFilter::default()),
            Self::Batches(ids) => Some(CheckFilter {
                batch_ids: Some(ids),
                ..Default::default()
            }),
            Self::Empty => None,
        }
    }
}

fn validate_check_type(check_type: &str) -> Result<()> {
    if check_type.trim().is_empty() {
        return Err(QualityError::InvalidInput("check type must not be empty".to_string()));
    }
    Ok(())
}

fn oldest_first() -> CheckSort {
    CheckSort::new(SortField::CreatedAt, SortOrder::Asc)
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(part as f64 / total as f64 * 100.0)
    }
}
