//! Test fixtures and helpers.
//!
//! Common setup code for integration tests. Rows are written straight into
//! the store, behind the cache's back, so tests can control ids and
//! timestamps.

use struggle_meals_core::{Author, Meal, MealId, MealInput, Remix, RemixInput, Timestamp};
use struggle_meals_store::mapping::{meal_from_row, new_meal_values, remix_from_row, remix_values};
use struggle_meals_store::{Column, Gateway, MemoryStore, RemoteStore, Table};
use struggle_meals_sync::{SyncConfig, SyncCore};

/// A sync core over a store the test can also write to directly.
pub struct TestFixture<S = MemoryStore> {
    pub core: SyncCore<S>,
}

impl TestFixture<MemoryStore> {
    /// A fixture over an empty memory store.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Default for TestFixture<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RemoteStore> TestFixture<S> {
    pub fn with_store(store: S) -> Self {
        Self::with_config(store, SyncConfig::default())
    }

    pub fn with_config(store: S, config: SyncConfig) -> Self {
        Self {
            core: SyncCore::with_config(Gateway::new(store), config),
        }
    }

    pub fn store(&self) -> &S {
        self.core.gateway().store()
    }

    /// Insert a meal row with a fixed id.
    pub async fn insert_meal(&self, id: &str, input: &MealInput) -> Meal {
        let values = new_meal_values(input).set(Column::Id, id);
        let row = self
            .store()
            .insert(Table::Meals, &values)
            .await
            .expect("insert meal");
        meal_from_row(
            row.into_meal().expect("meals row"),
            self.core.gateway().config(),
        )
    }

    /// Insert a remix row with a fixed id and creation time.
    pub async fn insert_remix(&self, id: &str, input: &RemixInput, created_at: Timestamp) -> Remix {
        let values = remix_values(input)
            .set(Column::Id, id)
            .set(Column::CreatedAt, created_at);
        let row = self
            .store()
            .insert(Table::Remixes, &values)
            .await
            .expect("insert remix");
        remix_from_row(
            row.into_remix().expect("remixes row"),
            self.core.gateway().config(),
        )
    }

    /// What the store holds for a meal, bypassing the cache.
    pub async fn stored_meal(&self, id: &str) -> Option<Meal> {
        self.core
            .gateway()
            .get_meal(&MealId::new(id))
            .await
            .expect("read meal")
    }
}

/// A meal input with an explicit score and zeroed counters.
pub fn meal_input(title: &str, score: u32) -> MealInput {
    let mut input = MealInput::new(title, Author::new("broke_chef", "broke_chef"));
    input.struggle_score = Some(score);
    input.verifications = Some(0);
    input.remixes = Some(0);
    input.is_verified = Some(false);
    input
}

/// A remix input under `parent`.
pub fn remix_input(title: &str, parent: Option<&str>) -> RemixInput {
    let mut input = RemixInput::new(title, Author::default_remixer());
    input.parent_meal_id = parent.map(MealId::new);
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use struggle_meals_core::RemixId;

    #[tokio::test]
    async fn test_fixture_inserts_with_fixed_ids() {
        let fixture = TestFixture::new();
        let meal = fixture.insert_meal("m1", &meal_input("Toast", 40)).await;

        assert_eq!(meal.id, MealId::new("m1"));
        assert_eq!(meal.struggle_score, 40);
        assert_eq!(fixture.store().row_count(Table::Meals), 1);
        assert_eq!(fixture.stored_meal("m1").await, Some(meal));
    }

    #[tokio::test]
    async fn test_fixture_remix_keeps_timestamp() {
        let fixture = TestFixture::new();
        let remix = fixture
            .insert_remix("r1", &remix_input("Toast Remix", Some("m1")), 42)
            .await;

        assert_eq!(remix.id, RemixId::new("r1"));
        assert_eq!(remix.created_at, 42);
        assert_eq!(remix.parent_meal_id, Some(MealId::new("m1")));
    }

    #[tokio::test]
    async fn test_fixture_writes_bypass_cache() {
        let fixture = TestFixture::new();
        fixture.core.meals().await;
        fixture.insert_meal("m1", &meal_input("Toast", 40)).await;

        let cached = fixture.core.peek_meals();
        assert_eq!(cached.data.unwrap().len(), 0);
        assert!(!cached.is_stale);
    }
}
