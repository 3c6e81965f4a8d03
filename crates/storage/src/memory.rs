//! In-memory storage backend.
//!
//! Nothing survives the process. Used for tests and for embedding the engine
//! where records are owned elsewhere.

use std::collections::HashMap;

use async_trait::async_trait;
use brewqa_core::{
    Batch, BatchId, CheckFilter, CheckSort, Pagination, QualityCheck, QualityCheckId, Recipe,
    RecipeId, User, UserId,
};
use tokio::sync::RwLock;

use super::trait_::{select_checks, BatchStore, QualityCheckStore, Result, StorageError, UserStore};

/// Map-backed storage.
#[derive(Default)]
pub struct MemoryStorage {
    recipes: RwLock<HashMap<RecipeId, Recipe>>,
    batches: RwLock<HashMap<BatchId, Batch>>,
    users: RwLock<HashMap<UserId, User>>,
    checks: RwLock<HashMap<QualityCheckId, QualityCheck>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BatchStore for MemoryStorage {
    async fn save_recipe(&self, recipe: &Recipe) -> Result<()> {
        self.recipes.write().await.insert(recipe.id, recipe.clone());
        Ok(())
    }

    async fn load_recipe(&self, id: RecipeId) -> Result<Option<Recipe>> {
        Ok(self.recipes.read().await.get(&id).cloned())
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>> {
        let mut recipes: Vec<Recipe> = self.recipes.read().await.values().cloned().collect();
        recipes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(recipes)
    }

    async fn save_batch(&self, batch: &Batch) -> Result<()> {
        self.batches.write().await.insert(batch.id, batch.clone());
        Ok(())
    }

    async fn load_batch(&self, id: BatchId) -> Result<Option<Batch>> {
        Ok(self.batches.read().await.get(&id).cloned())
    }

    async fn list_batches(&self, recipe_id: Option<RecipeId>) -> Result<Vec<Batch>> {
        let mut batches: Vec<Batch> = self
            .batches
            .read()
            .await
            .values()
            .filter(|b| recipe_id.map_or(true, |r| b.recipe_id == r))
            .cloned()
            .collect();
        batches.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(batches)
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn save_user(&self, user: &User) -> Result<()> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }

    async fn load_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl QualityCheckStore for MemoryStorage {
    async fn create_check(&self, check: &QualityCheck) -> Result<()> {
        self.checks.write().await.insert(check.id, check.clone());
        Ok(())
    }

    async fn load_check(&self, id: QualityCheckId) -> Result<Option<QualityCheck>> {
        Ok(self.checks.read().await.get(&id).cloned())
    }

    async fn find_checks(
        &self,
        filter: &CheckFilter,
        sort: &CheckSort,
        page: Option<Pagination>,
    ) -> Result<Vec<QualityCheck>> {
        let checks = self.checks.read().await;
        Ok(select_checks(checks.values().cloned(), filter, sort, page))
    }

    async fn count_checks(&self, filter: &CheckFilter) -> Result<usize> {
        Ok(self.checks.read().await.values().filter(|c| filter.matches(c)).count())
    }

    async fn update_check(&self, check: &QualityCheck) -> Result<()> {
        let mut checks = self.checks.write().await;
        match checks.get_mut(&check.id) {
            Some(existing) => {
                *existing = check.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound(format!("quality check {}", check.id))),
        }
    }

    async fn delete_check(&self, id: QualityCheckId) -> Result<bool> {
        Ok(self.checks.write().await.remove(&id).is_some())
    }
}
