//! JSON file storage implementation.
//!
//! Stores every record as a pretty-printed JSON file under a root directory,
//! one subdirectory per record kind:
//!
//! ```text
//! <root>/recipes/<id>.json
//! <root>/batches/<id>.json
//! <root>/users/<id>.json
//! <root>/checks/<id>.json
//! ```
//!
//! Listing reads the whole directory, so this backend suits a single brewery's
//! volume rather than a shared service.

use std::path::{Path, PathBuf};

use brewqa_core::{
    Batch, BatchId, CheckFilter, CheckSort, Pagination, QualityCheck, QualityCheckId, Recipe,
    RecipeId, User, UserId,
};
use serde::Serialize;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

use super::trait_::{select_checks, BatchStore, QualityCheckStore, Result, StorageError, UserStore};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
    // Serializes read-modify-write sequences (update, delete).
    write_lock: Mutex<()>,
}

impl JsonStorage {
    /// Create storage, creating the record directories under `root` if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("recipes")).await?;
        fs::create_dir_all(root.join("batches")).await?;
        fs::create_dir_all(root.join("users")).await?;
        fs::create_dir_all(root.join("checks")).await?;

        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn recipe_path(&self, id: RecipeId) -> PathBuf {
        self.root.join("recipes").join(format!("{}.json", id))
    }
    fn batch_path(&self, id: BatchId) -> PathBuf {
        self.root.join("batches").join(format!("{}.json", id))
    }
    fn user_path(&self, id: UserId) -> PathBuf {
        self.root.join("users").join(format!("{}.json", id))
    }
    fn check_path(&self, id: QualityCheckId) -> PathBuf {
        self.root.join("checks").join(format!("{}.json", id))
    }
}

#[async_trait::async_trait]
impl BatchStore for JsonStorage {
    async fn save_recipe(&self, recipe: &Recipe) -> Result<()> {
        write_json(&self.recipe_path(recipe.id), recipe).await
    }

    async fn load_recipe(&self, id: RecipeId) -> Result<Option<Recipe>> {
        read_json(&self.recipe_path(id)).await
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>> {
        let mut recipes: Vec<Recipe> = list_dir(&self.root.join("recipes")).await?;
        recipes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(recipes)
    }

    async fn save_batch(&self, batch: &Batch) -> Result<()> {
        write_json(&self.batch_path(batch.id), batch).await
    }

    async fn load_batch(&self, id: BatchId) -> Result<Option<Batch>> {
        read_json(&self.batch_path(id)).await
    }

    async fn list_batches(&self, recipe_id: Option<RecipeId>) -> Result<Vec<Batch>> {
        let all: Vec<Batch> = list_dir(&self.root.join("batches")).await?;
        let mut batches: Vec<Batch> = all
            .into_iter()
            .filter(|b| recipe_id.map_or(true, |r| b.recipe_id == r))
            .collect();
        batches.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(batches)
    }
}

#[async_trait::async_trait]
impl UserStore for JsonStorage {
    async fn save_user(&self, user: &User) -> Result<()> {
        write_json(&self.user_path(user.id), user).await
    }

    async fn load_user(&self, id: UserId) -> Result<Option<User>> {
        read_json(&self.user_path(id)).await
    }
}

#[async_trait::async_trait]
impl QualityCheckStore for JsonStorage {
    async fn create_check(&self, check: &QualityCheck) -> Result<()> {
        write_json(&self.check_path(check.id), check).await
    }

    async fn load_check(&self, id: QualityCheckId) -> Result<Option<QualityCheck>> {
        read_json(&self.check_path(id)).await
    }

    async fn find_checks(
        &self,
        filter: &CheckFilter,
        sort: &CheckSort,
        page: Option<Pagination>,
    ) -> Result<Vec<QualityCheck>> {
        let all: Vec<QualityCheck> = list_dir(&self.root.join("checks")).await?;
        Ok(select_checks(all, filter, sort, page))
    }

    async fn count_checks(&self, filter: &CheckFilter) -> Result<usize> {
        let all: Vec<QualityCheck> = list_dir(&self.root.join("checks")).await?;
        Ok(all.iter().filter(|c| filter.matches(c)).count())
    }

    async fn update_check(&self, check: &QualityCheck) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let path = self.check_path(check.id);
        if !fs::try_exists(&path).await? {
            return Err(StorageError::NotFound(format!("quality check {}", check.id)));
        }
        write_json(&path, check).await
    }

    async fn delete_check(&self, id: QualityCheckId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(self.check_path(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json.as_bytes()).await?;
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        let item = read_json(&path).await.inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "unreadable record");
        })?;
        if let Some(item) = item {
            items.push(item);
        }
    }
    Ok(items)
}
