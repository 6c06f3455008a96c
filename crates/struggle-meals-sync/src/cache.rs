//! The query cache and its entry state machine.
//!
//! Every entry moves `Empty -> Loading -> Ready | Errored`. A ready entry
//! goes back to `Loading` on refetch, and to `OptimisticallyUpdated` while
//! a mutation is in flight. All markers come from one logical clock owned
//! by the cache, so "newer" is a plain integer comparison.

use std::collections::{HashMap, HashSet, VecDeque};

use struggle_meals_core::{Meal, MealId, Remix, RemixId};

use crate::key::CacheKey;

/// Lifecycle state of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryStatus {
    Empty,
    Loading,
    Ready,
    Errored,
    OptimisticallyUpdated,
}

/// A cached query result.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    Meals(Vec<Meal>),
    Meal(Option<Meal>),
    Remixes(Vec<Remix>),
    Remix(Option<Remix>),
}

impl CacheValue {
    /// The meal with `id`, if this value holds it.
    pub fn find_meal(&self, id: &MealId) -> Option<&Meal> {
        match self {
            CacheValue::Meals(meals) => meals.iter().find(|m| &m.id == id),
            CacheValue::Meal(Some(meal)) if &meal.id == id => Some(meal),
            _ => None,
        }
    }

    /// The remix with `id`, if this value holds it.
    pub fn find_remix(&self, id: &RemixId) -> Option<&Remix> {
        match self {
            CacheValue::Remixes(remixes) => remixes.iter().find(|r| &r.id == id),
            CacheValue::Remix(Some(remix)) if &remix.id == id => Some(remix),
            _ => None,
        }
    }

    /// Whether this value holds any of `ids`.
    fn holds_any_meal(&self, ids: &HashSet<MealId>) -> bool {
        match self {
            CacheValue::Meals(meals) => meals.iter().any(|m| ids.contains(&m.id)),
            CacheValue::Meal(Some(meal)) => ids.contains(&meal.id),
            _ => false,
        }
    }

    /// Replace the meal with the same id. Returns whether anything changed.
    fn replace_meal(&mut self, meal: &Meal) -> bool {
        match self {
            CacheValue::Meals(meals) => match meals.iter_mut().find(|m| m.id == meal.id) {
                Some(slot) => {
                    *slot = meal.clone();
                    true
                }
                None => false,
            },
            CacheValue::Meal(Some(slot)) if slot.id == meal.id => {
                *slot = meal.clone();
                true
            }
            _ => false,
        }
    }
}

/// One entry of the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub value: Option<CacheValue>,
    pub status: EntryStatus,
    pub error: Option<String>,
    /// Clock reading of the data currently held.
    pub updated_at: u64,
    /// Clock reading of the last invalidation; 0 if never invalidated.
    pub invalidated_at: u64,
    /// Ticket of the fetch allowed to write this entry.
    pub in_flight: Option<u64>,
}

impl CacheEntry {
    fn empty() -> Self {
        Self {
            value: None,
            status: EntryStatus::Empty,
            error: None,
            updated_at: 0,
            invalidated_at: 0,
            in_flight: None,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.invalidated_at > self.updated_at
    }
}

/// Entries captured before an optimistic write, restored on rollback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: Vec<(CacheKey, CacheEntry)>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    /// The captured copy of a meal, preferring the one held under `key`.
    fn meal_under(&self, key: &CacheKey, id: &MealId) -> Option<&Meal> {
        let own = self
            .get(key)
            .and_then(|e| e.value.as_ref())
            .and_then(|v| v.find_meal(id));
        own.or_else(|| {
            self.entries
                .iter()
                .find_map(|(_, e)| e.value.as_ref().and_then(|v| v.find_meal(id)))
        })
    }
}

/// Entry counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub empty: usize,
    pub loading: usize,
    pub ready: usize,
    pub errored: usize,
    pub optimistic: usize,
    pub stale: usize,
}

impl CacheStats {
    pub fn total(&self) -> usize {
        self.empty + self.loading + self.ready + self.errored + self.optimistic
    }
}

/// The cache proper. Not synchronized; the owner wraps it in a lock.
#[derive(Debug, Default)]
pub struct Cache {
    entries: HashMap<CacheKey, CacheEntry>,
    clock: u64,
    stale_queue: VecDeque<CacheKey>,
    /// Meals whose cached rows carry a write the server has not confirmed.
    unconfirmed: HashSet<MealId>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    pub fn get(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.entries.keys()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fetch lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Start a fetch for `key` and return its ticket.
    ///
    /// The new ticket supersedes any fetch already in flight for the key.
    /// Data already held is kept while loading.
    pub fn begin_fetch(&mut self, key: &CacheKey) -> u64 {
        let ticket = self.tick();
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(CacheEntry::empty);
        if let Some(previous) = entry.in_flight.replace(ticket) {
            tracing::debug!(%key, previous, ticket, "fetch superseded");
        }
        entry.status = EntryStatus::Loading;
        ticket
    }

    /// Store the outcome of a fetch.
    ///
    /// Returns `false` and changes nothing when `ticket` is no longer the
    /// key's current fetch. A failure discards the held value.
    pub fn complete_fetch(
        &mut self,
        key: &CacheKey,
        ticket: u64,
        outcome: std::result::Result<CacheValue, String>,
    ) -> bool {
        let entry = match self.entries.get_mut(key) {
            Some(entry) if entry.in_flight == Some(ticket) => entry,
            _ => {
                tracing::debug!(%key, ticket, "dropping outdated fetch result");
                return false;
            }
        };

        entry.in_flight = None;
        // Data is as fresh as the moment the fetch began, so an
        // invalidation that landed mid-flight still leaves it stale.
        entry.updated_at = ticket;
        match outcome {
            Ok(value) => {
                entry.value = Some(value);
                entry.status = EntryStatus::Ready;
                entry.error = None;
            }
            Err(message) => {
                entry.value = None;
                entry.status = EntryStatus::Errored;
                entry.error = Some(message);
            }
        }
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Optimistic writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Capture every entry whose key satisfies `pred`.
    pub fn snapshot(&self, mut pred: impl FnMut(&CacheKey) -> bool) -> Snapshot {
        Snapshot {
            entries: self
                .entries
                .iter()
                .filter(|&(key, _)| pred(key))
                .map(|(key, entry)| (key.clone(), entry.clone()))
                .collect(),
        }
    }

    /// Undo the optimistic write of one meal.
    ///
    /// The meal's own entry is put back as captured. Inside shared lists
    /// only that meal's row is reverted, so rows of other meals written
    /// since the capture survive. Returns the number of entries touched.
    pub fn revert_meal(&mut self, id: &MealId, snapshot: &Snapshot) -> usize {
        self.unconfirmed.remove(id);
        let own_key = CacheKey::Meal(id.clone());
        let mut touched = 0;

        if let Some(captured) = snapshot.get(&own_key) {
            let mut entry = captured.clone();
            entry.in_flight = None;
            if entry.status == EntryStatus::Loading {
                entry.status = if entry.value.is_some() {
                    EntryStatus::Ready
                } else {
                    EntryStatus::Empty
                };
            }
            self.entries.insert(own_key, entry);
            touched += 1;
        }

        for (key, entry) in self.entries.iter_mut() {
            if !key.is_meal_list() {
                continue;
            }
            let Some(previous) = snapshot.meal_under(key, id) else {
                continue;
            };
            let Some(value) = entry.value.as_mut() else {
                continue;
            };
            if !value.replace_meal(previous) {
                continue;
            }

            touched += 1;
            if entry.status == EntryStatus::OptimisticallyUpdated
                && !value.holds_any_meal(&self.unconfirmed)
            {
                entry.status = EntryStatus::Ready;
            }
        }

        tracing::debug!(%id, touched, "reverted meal");
        touched
    }

    /// Most recent cached copy of a meal, looking at its own entry first.
    pub fn cached_meal(&self, id: &MealId) -> Option<&Meal> {
        let own = self
            .entries
            .get(&CacheKey::Meal(id.clone()))
            .and_then(|e| e.value.as_ref())
            .and_then(|v| v.find_meal(id));
        own.or_else(|| {
            self.entries
                .iter()
                .filter(|(key, _)| key.is_meal_list())
                .find_map(|(_, e)| e.value.as_ref().and_then(|v| v.find_meal(id)))
        })
    }

    /// Parent of a remix as far as the cache knows.
    ///
    /// `None` means the remix is not cached at all; `Some(None)` means it is
    /// cached and has no parent.
    pub fn cached_remix_parent(&self, id: &RemixId) -> Option<Option<MealId>> {
        self.entries
            .iter()
            .filter(|(key, _)| matches!(key, CacheKey::Remix(_)) || key.is_remix_list())
            .find_map(|(_, e)| e.value.as_ref().and_then(|v| v.find_remix(id)))
            .map(|remix| remix.parent_meal_id.clone())
    }

    /// Write `meal` into every meal list and meal entry holding it.
    ///
    /// With `optimistic` set the touched entries become
    /// `OptimisticallyUpdated` and their in-flight fetches are cancelled;
    /// otherwise they become `Ready` as of now, unless they still hold
    /// another meal's unconfirmed write. Returns the number of entries
    /// touched.
    pub fn patch_meal(&mut self, meal: &Meal, optimistic: bool) -> usize {
        let now = self.tick();
        let mut touched = 0;
        if optimistic {
            self.unconfirmed.insert(meal.id.clone());
        } else {
            self.unconfirmed.remove(&meal.id);
        }

        for (key, entry) in self.entries.iter_mut() {
            let holds_meal = key.is_meal_list() || *key == CacheKey::Meal(meal.id.clone());
            if !holds_meal {
                continue;
            }
            let Some(value) = entry.value.as_mut() else {
                continue;
            };
            if !value.replace_meal(meal) {
                continue;
            }

            touched += 1;
            if optimistic {
                entry.status = EntryStatus::OptimisticallyUpdated;
                entry.in_flight = None;
            } else {
                entry.updated_at = now;
                if !value.holds_any_meal(&self.unconfirmed) {
                    entry.status = EntryStatus::Ready;
                }
            }
        }

        tracing::debug!(id = %meal.id, touched, optimistic, "patched meal");
        touched
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Invalidation
    // ─────────────────────────────────────────────────────────────────────────

    /// Mark every entry matching `pred` stale and queue it for refetch.
    ///
    /// Returns the invalidated keys.
    pub fn invalidate(&mut self, mut pred: impl FnMut(&CacheKey) -> bool) -> Vec<CacheKey> {
        let now = self.tick();
        let mut hit = Vec::new();

        for (key, entry) in self.entries.iter_mut() {
            if pred(key) {
                entry.invalidated_at = now;
                hit.push(key.clone());
            }
        }

        for key in &hit {
            if !self.stale_queue.contains(key) {
                self.stale_queue.push_back(key.clone());
            }
        }

        if !hit.is_empty() {
            tracing::debug!(count = hit.len(), "invalidated entries");
        }
        hit
    }

    /// Take the refetch queue, keeping only keys that are still stale.
    pub fn drain_stale(&mut self) -> Vec<CacheKey> {
        let queued: Vec<CacheKey> = self.stale_queue.drain(..).collect();
        queued
            .into_iter()
            .filter(|key| self.entries.get(key).map_or(false, CacheEntry::is_stale))
            .collect()
    }

    /// Number of keys waiting for a background refetch.
    pub fn queued(&self) -> usize {
        self.stale_queue.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Housekeeping
    // ─────────────────────────────────────────────────────────────────────────

    pub fn evict(&mut self, key: &CacheKey) -> bool {
        self.stale_queue.retain(|k| k != key);
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.stale_queue.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        for entry in self.entries.values() {
            match entry.status {
                EntryStatus::Empty => stats.empty += 1,
                EntryStatus::Loading => stats.loading += 1,
                EntryStatus::Ready => stats.ready += 1,
                EntryStatus::Errored => stats.errored += 1,
                EntryStatus::OptimisticallyUpdated => stats.optimistic += 1,
            }
            if entry.is_stale() {
                stats.stale += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use struggle_meals_core::Author;

    fn meal(id: &str, verifications: u32) -> Meal {
        Meal {
            id: MealId::new(id),
            title: id.to_uppercase(),
            description: None,
            image: String::new(),
            ingredients: Vec::new(),
            tools: Vec::new(),
            steps: Vec::new(),
            time_in_minutes: 5,
            estimated_cost: 1.0,
            struggle_score: 10,
            verifications,
            remixes: 0,
            is_verified: false,
            author: Author::new("a", "a"),
            created_at: 0,
        }
    }

    fn ready(cache: &mut Cache, key: CacheKey, value: CacheValue) {
        let ticket = cache.begin_fetch(&key);
        assert!(cache.complete_fetch(&key, ticket, Ok(value)));
    }

    #[test]
    fn test_fetch_lifecycle() {
        let mut cache = Cache::new();
        let key = CacheKey::Meals;

        let ticket = cache.begin_fetch(&key);
        assert_eq!(cache.get(&key).unwrap().status, EntryStatus::Loading);

        cache.complete_fetch(&key, ticket, Ok(CacheValue::Meals(vec![meal("a", 0)])));
        let entry = cache.get(&key).unwrap();
        assert_eq!(entry.status, EntryStatus::Ready);
        assert!(!entry.is_stale());
    }

    #[test]
    fn test_older_ticket_cannot_overwrite() {
        let mut cache = Cache::new();
        let key = CacheKey::Meals;

        let first = cache.begin_fetch(&key);
        let second = cache.begin_fetch(&key);

        assert!(cache.complete_fetch(&key, second, Ok(CacheValue::Meals(vec![meal("new", 0)]))));
        assert!(!cache.complete_fetch(&key, first, Ok(CacheValue::Meals(vec![]))));

        match &cache.get(&key).unwrap().value {
            Some(CacheValue::Meals(meals)) => assert_eq!(meals.len(), 1),
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn test_failed_fetch_discards_value() {
        let mut cache = Cache::new();
        let key = CacheKey::Meal(MealId::new("a"));
        ready(&mut cache, key.clone(), CacheValue::Meal(Some(meal("a", 1))));

        let ticket = cache.begin_fetch(&key);
        cache.complete_fetch(&key, ticket, Err("offline".into()));

        let entry = cache.get(&key).unwrap();
        assert_eq!(entry.status, EntryStatus::Errored);
        assert_eq!(entry.value, None);
        assert_eq!(entry.error.as_deref(), Some("offline"));
    }

    #[test]
    fn test_invalidation_during_fetch_stays_stale() {
        let mut cache = Cache::new();
        let key = CacheKey::Meals;
        ready(&mut cache, key.clone(), CacheValue::Meals(vec![]));

        let ticket = cache.begin_fetch(&key);
        cache.invalidate(|k| k == &CacheKey::Meals);
        cache.complete_fetch(&key, ticket, Ok(CacheValue::Meals(vec![])));

        assert!(cache.get(&key).unwrap().is_stale());
        assert_eq!(cache.drain_stale(), vec![CacheKey::Meals]);
        assert_eq!(cache.queued(), 0);
    }

    #[test]
    fn test_optimistic_patch_cancels_fetch() {
        let mut cache = Cache::new();
        let key = CacheKey::Meals;
        ready(&mut cache, key.clone(), CacheValue::Meals(vec![meal("a", 1), meal("b", 2)]));

        let ticket = cache.begin_fetch(&key);
        let touched = cache.patch_meal(&meal("a", 5), true);
        assert_eq!(touched, 1);

        assert!(!cache.complete_fetch(&key, ticket, Ok(CacheValue::Meals(vec![]))));
        let entry = cache.get(&key).unwrap();
        assert_eq!(entry.status, EntryStatus::OptimisticallyUpdated);
        assert_eq!(cache.cached_meal(&MealId::new("a")).unwrap().verifications, 5);
    }

    #[test]
    fn test_revert_restores_own_entry_exactly() {
        let mut cache = Cache::new();
        let id = MealId::new("a");
        ready(&mut cache, CacheKey::Meals, CacheValue::Meals(vec![meal("a", 1)]));
        ready(&mut cache, CacheKey::Meal(id.clone()), CacheValue::Meal(Some(meal("a", 1))));
        let list_before = cache.get(&CacheKey::Meals).unwrap().clone();
        let own_before = cache.get(&CacheKey::Meal(id.clone())).unwrap().clone();

        let snapshot = cache.snapshot(|_| true);
        cache.patch_meal(&meal("a", 9), true);
        assert_eq!(cache.revert_meal(&id, &snapshot), 2);

        assert_eq!(cache.get(&CacheKey::Meals).unwrap(), &list_before);
        assert_eq!(cache.get(&CacheKey::Meal(id)).unwrap(), &own_before);
    }

    #[test]
    fn test_revert_keeps_other_meals_rows() {
        let mut cache = Cache::new();
        let list = CacheValue::Meals(vec![meal("a", 1), meal("b", 2)]);
        ready(&mut cache, CacheKey::Meals, list);

        let snapshot_a = cache.snapshot(CacheKey::is_meal_list);
        cache.patch_meal(&meal("a", 5), true);
        cache.patch_meal(&meal("b", 6), true);

        // a fails while b is still unconfirmed.
        cache.revert_meal(&MealId::new("a"), &snapshot_a);
        let entry = cache.get(&CacheKey::Meals).unwrap();
        assert_eq!(entry.status, EntryStatus::OptimisticallyUpdated);
        assert_eq!(cache.cached_meal(&MealId::new("a")).unwrap().verifications, 1);
        assert_eq!(cache.cached_meal(&MealId::new("b")).unwrap().verifications, 6);

        cache.patch_meal(&meal("b", 6), false);
        assert_eq!(cache.get(&CacheKey::Meals).unwrap().status, EntryStatus::Ready);
    }

    #[test]
    fn test_commit_waits_for_other_unconfirmed_rows() {
        let mut cache = Cache::new();
        ready(&mut cache, CacheKey::Meals, CacheValue::Meals(vec![meal("a", 1), meal("b", 2)]));

        cache.patch_meal(&meal("a", 5), true);
        cache.patch_meal(&meal("b", 6), true);
        cache.patch_meal(&meal("a", 5), false);
        assert_eq!(
            cache.get(&CacheKey::Meals).unwrap().status,
            EntryStatus::OptimisticallyUpdated
        );
        assert_eq!(cache.stats().optimistic, 1);
    }

    #[test]
    fn test_stats_and_evict() {
        let mut cache = Cache::new();
        ready(&mut cache, CacheKey::Meals, CacheValue::Meals(vec![]));
        cache.begin_fetch(&CacheKey::Remix(RemixId::new("r")));
        cache.invalidate(|k| k.is_meal_list());

        let stats = cache.stats();
        assert_eq!(stats.ready, 1);
        assert_eq!(stats.loading, 1);
        assert_eq!(stats.stale, 1);
        assert_eq!(stats.total(), 2);

        assert!(cache.evict(&CacheKey::Meals));
        assert_eq!(cache.queued(), 0);
        assert!(!cache.evict(&CacheKey::Meals));
    }
}
