//! The Client: one handle for the leaderboard, meal detail and remix pages.
//!
//! A client owns a [`SyncCore`] over some [`RemoteStore`]. Queries hand back
//! cached snapshots; commands write through and invalidate.

use tracing::info;

use struggle_meals_core::{Author, Meal, MealId, MealInput, Remix, RemixId, RemixInput};
use struggle_meals_store::{Gateway, MemoryStore, RemoteStore, SqliteStore};
use struggle_meals_sync::{CacheKey, CacheStats, QueryState, SyncCore};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::seed::{self, SeedReport};

/// Cached access to meals and remixes.
pub struct Client<S> {
    core: SyncCore<S>,
}

impl Client<MemoryStore> {
    /// A client over an empty in-process store.
    pub fn in_memory(config: ClientConfig) -> Self {
        Self::new(MemoryStore::new(), config)
    }
}

impl Client<SqliteStore> {
    /// A client over SQLite at `config.database_path`, or an in-memory
    /// database when no path is set.
    pub fn open(config: ClientConfig) -> Result<Self> {
        let store = match &config.database_path {
            Some(path) => {
                info!(path = %path.display(), "opening database");
                SqliteStore::open(path)?
            }
            None => SqliteStore::open_memory()?,
        };
        Ok(Self::new(store, config))
    }
}

impl<S: RemoteStore> Client<S> {
    pub fn new(store: S, config: ClientConfig) -> Self {
        let gateway = Gateway::with_config(store, config.gateway);
        Self {
            core: SyncCore::with_config(gateway, config.sync),
        }
    }

    /// The synchronization core, for cache inspection and refetching.
    pub fn sync(&self) -> &SyncCore<S> {
        &self.core
    }

    pub fn store(&self) -> &S {
        self.core.gateway().store()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn leaderboard(&self) -> QueryState<Vec<Meal>> {
        self.core.meals().await
    }

    /// The newest meals, `limit` defaulting to the configured count.
    pub async fn recent_meals(&self, limit: Option<usize>) -> QueryState<Vec<Meal>> {
        self.core.recent_meals(limit).await
    }

    pub async fn meal(&self, id: &MealId) -> QueryState<Meal> {
        self.core.meal(id).await
    }

    pub async fn remixes_for_meal(&self, meal_id: &MealId) -> QueryState<Vec<Remix>> {
        self.core.remixes_for_meal(meal_id).await
    }

    pub async fn remix(&self, id: &RemixId) -> QueryState<Remix> {
        self.core.remix(id).await
    }

    pub async fn latest_remixes(&self, limit: Option<usize>) -> QueryState<Vec<Remix>> {
        self.core.latest_remixes(limit).await
    }

    /// Refetch every entry a write has made stale. Returns how many were
    /// refetched.
    pub async fn refresh(&self) -> usize {
        self.core.refetch_stale().await
    }

    pub fn stats(&self) -> CacheStats {
        self.core.stats()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn create_meal(&self, input: MealInput) -> Result<Meal> {
        Ok(self.core.create_meal(input).await?)
    }

    pub async fn update_meal(&self, id: &MealId, input: MealInput) -> Result<Meal> {
        Ok(self.core.update_meal(id, input).await?)
    }

    pub async fn delete_meal(&self, id: &MealId) -> Result<()> {
        Ok(self.core.delete_meal(id).await?)
    }

    /// Toggle a meal's verification optimistically.
    pub async fn verify_meal(&self, id: &MealId, verified: bool) -> Result<Meal> {
        Ok(self.core.verify_meal(id, verified, None).await?)
    }

    pub async fn create_remix(&self, input: RemixInput) -> Result<Remix> {
        Ok(self.core.create_remix(input).await?)
    }

    pub async fn update_remix(&self, id: &RemixId, input: RemixInput) -> Result<Remix> {
        Ok(self.core.update_remix(id, input).await?)
    }

    pub async fn delete_remix(&self, id: &RemixId) -> Result<()> {
        Ok(self.core.delete_remix(id).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Drafts
    // ─────────────────────────────────────────────────────────────────────────

    /// A new-remix form prefilled from `meal_id`.
    ///
    /// `None` when the meal does not exist or could not be loaded.
    pub async fn remix_draft(&self, meal_id: &MealId) -> Option<RemixInput> {
        let meal = self.core.meal(meal_id).await.data?;
        Some(RemixInput::from_meal(&meal, Author::default_remixer()))
    }

    /// An edit form prefilled from an existing remix.
    pub async fn edit_draft(&self, remix_id: &RemixId) -> Option<RemixInput> {
        let remix = self.core.remix(remix_id).await.data?;
        Some(RemixInput::from_remix(&remix))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Demo data
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the store's contents with the demo meals and remixes.
    ///
    /// The store is written directly, so every cached entry is dropped.
    pub async fn seed_demo_data(&self) -> Result<SeedReport> {
        let report = seed::seed_demo_data(self.store()).await?;
        self.core.clear();
        Ok(report)
    }

    /// Drop one cached entry, forcing the next read to fetch.
    pub fn evict(&self, key: &CacheKey) -> bool {
        self.core.evict(key)
    }
}
