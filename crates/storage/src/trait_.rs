//! Storage trait abstraction.

use async_trait::async_trait;
use brewqa_core::{
    Batch, BatchId, CheckFilter, CheckSort, Pagination, QualityCheck, QualityCheckId, Recipe,
    RecipeId, User, UserId,
};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Recipes and batches, owned by the production side.
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Save a recipe (create or replace).
    async fn save_recipe(&self, recipe: &Recipe) -> Result<()>;

    /// Load a recipe by ID.
    async fn load_recipe(&self, id: RecipeId) -> Result<Option<Recipe>>;

    /// List all recipes.
    async fn list_recipes(&self) -> Result<Vec<Recipe>>;

    /// Save a batch (create or replace).
    async fn save_batch(&self, batch: &Batch) -> Result<()>;

    /// Load a batch by ID.
    async fn load_batch(&self, id: BatchId) -> Result<Option<Batch>>;

    /// List batches, optionally only those brewed from one recipe.
    async fn list_batches(&self, recipe_id: Option<RecipeId>) -> Result<Vec<Batch>>;
}

/// Users, used to validate inspector identity.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Save a user (create or replace).
    async fn save_user(&self, user: &User) -> Result<()>;

    /// Load a user by ID.
    async fn load_user(&self, id: UserId) -> Result<Option<User>>;
}

/// Persisted quality check records.
#[async_trait]
pub trait QualityCheckStore: Send + Sync {
    /// Persist a new check.
    async fn create_check(&self, check: &QualityCheck) -> Result<()>;

    /// Load a check by ID.
    async fn load_check(&self, id: QualityCheckId) -> Result<Option<QualityCheck>>;

    /// Find checks matching `filter`, sorted, optionally restricted to one page.
    async fn find_checks(
        &self,
        filter: &CheckFilter,
        sort: &CheckSort,
        page: Option<Pagination>,
    ) -> Result<Vec<QualityCheck>>;

    /// Count checks matching `filter`.
    async fn count_checks(&self, filter: &CheckFilter) -> Result<usize>;

    /// Replace an existing check. Fails with `NotFound` if it does not exist.
    async fn update_check(&self, check: &QualityCheck) -> Result<()>;

    /// Delete a check. Returns whether it existed.
    async fn delete_check(&self, id: QualityCheckId) -> Result<bool>;
}

/// Everything the assessment engine needs from a backend.
pub trait Storage: BatchStore + UserStore + QualityCheckStore {}

impl<T: BatchStore + UserStore + QualityCheckStore> Storage for T {}

/// Filter, sort and page an in-memory list of checks.
pub(crate) fn select_checks(
    checks: impl IntoIterator<Item = QualityCheck>,
    filter: &CheckFilter,
    sort: &CheckSort,
    page: Option<Pagination>,
) -> Vec<QualityCheck> {
    let mut selected: Vec<QualityCheck> = checks.into_iter().filter(|c| filter.matches(c)).collect();
    sort.sort(&mut selected);
    match page {
        Some(page) => page.apply(selected),
        None => selected,
    }
}
