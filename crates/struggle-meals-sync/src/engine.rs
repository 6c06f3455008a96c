//! The synchronization core: cached queries and cache-aware commands.
//!
//! All state lives behind one mutex that is only ever held between
//! suspension points, never across a gateway call. Logical operations
//! therefore interleave only where they await the network.

use std::sync::{Mutex, MutexGuard, PoisonError};

use struggle_meals_core::{
    next_verification, validate_meal_input, validate_remix_input, Meal, MealId, MealInput, Remix,
    RemixId, RemixInput,
};
use struggle_meals_store::{Gateway, RemoteStore, StoreError};

use crate::cache::{Cache, CacheEntry, CacheStats, CacheValue, EntryStatus};
use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::invalidation::{invalidation_set, Mutation, ParentHint};
use crate::key::CacheKey;
use crate::optimistic::{MutationLedger, MutationToken, Settlement};

/// What a query hands to the UI: a snapshot, never a live reference.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    /// `None` while loading, after an error, or when a lookup found nothing.
    pub data: Option<T>,
    pub status: EntryStatus,
    pub error: Option<String>,
    pub is_stale: bool,
}

impl QueryState<CacheValue> {
    fn from_entry(entry: Option<&CacheEntry>) -> Self {
        match entry {
            Some(entry) => Self {
                data: entry.value.clone(),
                status: entry.status,
                error: entry.error.clone(),
                is_stale: entry.is_stale(),
            },
            None => Self {
                data: None,
                status: EntryStatus::Empty,
                error: None,
                is_stale: false,
            },
        }
    }
}

impl<T> QueryState<T> {
    /// Convert the data, keeping status and flags.
    pub fn map<U>(self, f: impl FnOnce(T) -> Option<U>) -> QueryState<U> {
        QueryState {
            data: self.data.and_then(f),
            status: self.status,
            error: self.error,
            is_stale: self.is_stale,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(
            self.status,
            EntryStatus::Ready | EntryStatus::OptimisticallyUpdated
        )
    }

    pub fn is_errored(&self) -> bool {
        self.status == EntryStatus::Errored
    }
}

fn meals_of(value: CacheValue) -> Option<Vec<Meal>> {
    match value {
        CacheValue::Meals(meals) => Some(meals),
        _ => None,
    }
}

fn meal_of(value: CacheValue) -> Option<Meal> {
    match value {
        CacheValue::Meal(meal) => meal,
        _ => None,
    }
}

fn remixes_of(value: CacheValue) -> Option<Vec<Remix>> {
    match value {
        CacheValue::Remixes(remixes) => Some(remixes),
        _ => None,
    }
}

fn remix_of(value: CacheValue) -> Option<Remix> {
    match value {
        CacheValue::Remix(remix) => remix,
        _ => None,
    }
}

#[derive(Default)]
struct State {
    cache: Cache,
    ledger: MutationLedger,
}

// A panic while holding the lock leaves the cache consistent at the last
// completed step, so a poisoned lock is still usable.
fn lock_state(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn apply_invalidation(cache: &mut Cache, mutation: &Mutation) {
    let set = invalidation_set(mutation);
    let keys = cache.invalidate(|key| set.contains(key));
    tracing::debug!(?mutation, count = keys.len(), "applied invalidation set");
}

/// A verification toggle between its optimistic write and its settlement.
///
/// Dropping it unsettled, as happens when the caller stops polling
/// `verify_meal`, rolls the write back and queues the meal for refetch,
/// since the outcome of the request is unknown.
struct PendingToggle<'a> {
    state: &'a Mutex<State>,
    id: MealId,
    token: Option<MutationToken>,
}

impl PendingToggle<'_> {
    fn finish(mut self, result: &std::result::Result<Meal, StoreError>) {
        if let Some(token) = self.token.take() {
            self.settle(&token, Some(result));
        }
    }

    fn settle(
        &self,
        token: &MutationToken,
        result: Option<&std::result::Result<Meal, StoreError>>,
    ) {
        let mut state = lock_state(self.state);
        let State { cache, ledger } = &mut *state;
        let id = &self.id;
        match (ledger.settle(token), result) {
            (Settlement::Latest { .. }, Some(Ok(meal))) => {
                cache.patch_meal(meal, false);
            }
            (Settlement::Latest { base }, Some(Err(e))) => {
                tracing::warn!(%id, error = %e, "verification failed, rolling back");
                cache.revert_meal(id, &base);
            }
            (Settlement::Latest { base }, None) => {
                tracing::warn!(%id, "verification abandoned, rolling back");
                cache.revert_meal(id, &base);
            }
            (Settlement::Superseded, _) => {}
        }
        apply_invalidation(cache, &Mutation::VerifyMeal(id.clone()));
    }
}

impl Drop for PendingToggle<'_> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            self.settle(&token, None);
        }
    }
}

/// Cache owner and the single entry point for reads and writes.
pub struct SyncCore<S> {
    gateway: Gateway<S>,
    config: SyncConfig,
    state: Mutex<State>,
}

impl<S: RemoteStore> SyncCore<S> {
    pub fn new(gateway: Gateway<S>) -> Self {
        Self::with_config(gateway, SyncConfig::default())
    }

    pub fn with_config(gateway: Gateway<S>, config: SyncConfig) -> Self {
        Self {
            gateway,
            config,
            state: Mutex::new(State::default()),
        }
    }

    pub fn gateway(&self) -> &Gateway<S> {
        &self.gateway
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock_state(&self.state)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// The leaderboard, highest struggle score first.
    pub async fn meals(&self) -> QueryState<Vec<Meal>> {
        self.read(CacheKey::Meals).await.map(meals_of)
    }

    /// The newest meals; `None` uses the configured default limit.
    pub async fn recent_meals(&self, limit: Option<usize>) -> QueryState<Vec<Meal>> {
        let limit = limit.unwrap_or(self.config.default_recent_meals_limit);
        self.read(CacheKey::RecentMeals { limit })
            .await
            .map(meals_of)
    }

    /// One meal. A ready state with no data means the meal does not exist.
    pub async fn meal(&self, id: &MealId) -> QueryState<Meal> {
        self.read(CacheKey::Meal(id.clone())).await.map(meal_of)
    }

    pub async fn remixes_for_meal(&self, meal_id: &MealId) -> QueryState<Vec<Remix>> {
        self.read(CacheKey::RemixesForMeal(meal_id.clone()))
            .await
            .map(remixes_of)
    }

    /// One remix. A ready state with no data means the remix does not exist.
    pub async fn remix(&self, id: &RemixId) -> QueryState<Remix> {
        self.read(CacheKey::Remix(id.clone())).await.map(remix_of)
    }

    /// The newest remixes; `None` uses the configured default limit.
    pub async fn latest_remixes(&self, limit: Option<usize>) -> QueryState<Vec<Remix>> {
        let limit = limit.unwrap_or(self.config.default_latest_remixes_limit);
        self.read(CacheKey::LatestRemixes { limit })
            .await
            .map(remixes_of)
    }

    /// Force a fetch of `key`, whatever its state. This is also how an
    /// errored entry is retried.
    pub async fn refetch(&self, key: &CacheKey) -> QueryState<CacheValue> {
        self.fetch(key).await
    }

    /// Refetch every queued key that is still stale.
    ///
    /// Returns how many came back ready.
    pub async fn refetch_stale(&self) -> usize {
        let keys = self.lock().cache.drain_stale();
        let mut refreshed = 0;
        for key in keys {
            if self.fetch(&key).await.status == EntryStatus::Ready {
                refreshed += 1;
            }
        }
        tracing::debug!(refreshed, "background refetch done");
        refreshed
    }

    /// Current snapshot of `key`; no I/O.
    pub fn peek(&self, key: &CacheKey) -> QueryState<CacheValue> {
        QueryState::from_entry(self.lock().cache.get(key))
    }

    pub fn peek_meals(&self) -> QueryState<Vec<Meal>> {
        self.peek(&CacheKey::Meals).map(meals_of)
    }

    pub fn peek_meal(&self, id: &MealId) -> QueryState<Meal> {
        self.peek(&CacheKey::Meal(id.clone())).map(meal_of)
    }

    pub fn peek_remixes_for_meal(&self, meal_id: &MealId) -> QueryState<Vec<Remix>> {
        self.peek(&CacheKey::RemixesForMeal(meal_id.clone()))
            .map(remixes_of)
    }

    pub fn peek_latest_remixes(&self, limit: usize) -> QueryState<Vec<Remix>> {
        self.peek(&CacheKey::LatestRemixes { limit })
            .map(remixes_of)
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().cache.stats()
    }

    /// Keys waiting for [`refetch_stale`](Self::refetch_stale).
    pub fn pending_refetches(&self) -> usize {
        self.lock().cache.queued()
    }

    pub fn evict(&self, key: &CacheKey) -> bool {
        self.lock().cache.evict(key)
    }

    pub fn clear(&self) {
        self.lock().cache.clear();
    }

    async fn read(&self, key: CacheKey) -> QueryState<CacheValue> {
        let needs_fetch = {
            let state = self.lock();
            match state.cache.get(&key) {
                None => true,
                Some(entry) => match entry.status {
                    EntryStatus::Empty => true,
                    // Errors stick until an explicit refetch; optimistic
                    // values stay put until their mutation settles.
                    EntryStatus::Errored | EntryStatus::OptimisticallyUpdated => false,
                    EntryStatus::Loading => {
                        entry.value.is_none()
                            || (entry.is_stale() && self.config.refetch_stale_on_read)
                    }
                    EntryStatus::Ready => entry.is_stale() && self.config.refetch_stale_on_read,
                },
            }
        };

        if needs_fetch {
            self.fetch(&key).await
        } else {
            self.peek(&key)
        }
    }

    async fn fetch(&self, key: &CacheKey) -> QueryState<CacheValue> {
        let ticket = self.lock().cache.begin_fetch(key);

        let outcome = self.load(key).await.map_err(|e| {
            tracing::warn!(%key, error = %e, "fetch failed");
            e.to_string()
        });

        let mut state = self.lock();
        state.cache.complete_fetch(key, ticket, outcome);
        QueryState::from_entry(state.cache.get(key))
    }

    async fn load(&self, key: &CacheKey) -> std::result::Result<CacheValue, StoreError> {
        Ok(match key {
            CacheKey::Meals => CacheValue::Meals(self.gateway.list_meals().await?),
            CacheKey::RecentMeals { limit } => {
                CacheValue::Meals(self.gateway.list_recent_meals(*limit).await?)
            }
            CacheKey::Meal(id) => CacheValue::Meal(self.gateway.get_meal(id).await?),
            CacheKey::RemixesForMeal(id) => {
                CacheValue::Remixes(self.gateway.list_remixes_for_meal(id).await?)
            }
            CacheKey::Remix(id) => CacheValue::Remix(self.gateway.get_remix(id).await?),
            CacheKey::LatestRemixes { limit } => {
                CacheValue::Remixes(self.gateway.list_latest_remixes(*limit).await?)
            }
        })
    }

    fn invalidate(&self, mutation: &Mutation) {
        apply_invalidation(&mut self.lock().cache, mutation);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn create_meal(&self, input: MealInput) -> Result<Meal> {
        let input = input.sanitized();
        validate_meal_input(&input)?;

        let meal = self.gateway.create_meal(&input).await?;
        self.invalidate(&Mutation::CreateMeal(meal.id.clone()));
        Ok(meal)
    }

    /// Replace a meal's content. Its counters are left as they are.
    pub async fn update_meal(&self, id: &MealId, input: MealInput) -> Result<Meal> {
        let input = input.sanitized();
        validate_meal_input(&input)?;

        let meal = self.gateway.update_meal(id, &input).await?;
        self.invalidate(&Mutation::UpdateMeal(id.clone()));
        Ok(meal)
    }

    pub async fn delete_meal(&self, id: &MealId) -> Result<()> {
        self.gateway.delete_meal(id).await?;
        self.invalidate(&Mutation::DeleteMeal(id.clone()));
        Ok(())
    }

    pub async fn create_remix(&self, input: RemixInput) -> Result<Remix> {
        let input = input.sanitized();
        validate_remix_input(&input)?;

        let remix = self.gateway.create_remix(&input).await?;
        self.invalidate(&Mutation::CreateRemix {
            parent: remix.parent_meal_id.clone(),
        });
        Ok(remix)
    }

    pub async fn update_remix(&self, id: &RemixId, input: RemixInput) -> Result<Remix> {
        let input = input.sanitized();
        validate_remix_input(&input)?;

        let previous_parent = ParentHint::from(self.lock().cache.cached_remix_parent(id));
        let remix = self.gateway.update_remix(id, &input).await?;
        self.invalidate(&Mutation::UpdateRemix {
            id: id.clone(),
            parent: remix.parent_meal_id.clone(),
            previous_parent,
        });
        Ok(remix)
    }

    pub async fn delete_remix(&self, id: &RemixId) -> Result<()> {
        let parent = ParentHint::from(self.lock().cache.cached_remix_parent(id));
        self.gateway.delete_remix(id).await?;
        self.invalidate(&Mutation::DeleteRemix {
            id: id.clone(),
            parent,
        });
        Ok(())
    }

    /// Toggle a meal's verification, showing the result before the server
    /// confirms it.
    ///
    /// `count` overrides the derived counter. On failure the meal's rows
    /// are put back as they were before the toggle, leaving other meals'
    /// rows alone. Either way the meal and the meal lists are queued for
    /// refetch.
    pub async fn verify_meal(
        &self,
        id: &MealId,
        verified: bool,
        count: Option<u32>,
    ) -> Result<Meal> {
        let cached = self.lock().cache.cached_meal(id).cloned();
        let current = match cached {
            Some(meal) => meal,
            None => self
                .gateway
                .get_meal(id)
                .await?
                .ok_or_else(|| SyncError::MealNotFound(id.clone()))?,
        };

        let update = next_verification(current.verifications, verified, count);
        let optimistic = current.with_verification(update);

        let pending = {
            let mut state = self.lock();
            let State { cache, ledger } = &mut *state;
            let token = ledger.begin(id, || {
                cache.snapshot(|key| {
                    key.is_meal_list() || matches!(key, CacheKey::Meal(m) if m == id)
                })
            });
            cache.patch_meal(&optimistic, true);
            PendingToggle {
                state: &self.state,
                id: id.clone(),
                token: Some(token),
            }
        };

        let result = self.gateway.set_meal_verification(id, update).await;
        pending.finish(&result);
        result.map_err(SyncError::from)
    }
}
