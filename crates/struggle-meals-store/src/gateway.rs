//! The remote data gateway: typed operations over a [`RemoteStore`].
//!
//! This is the only place that knows table and column names. It applies
//! the row mapping, turns "no rows" lookups into `None`, and does nothing
//! else: no caching, no retries.

use serde::{Deserialize, Serialize};
use tracing::debug;

use struggle_meals_core::{
    Meal, MealId, MealInput, Remix, RemixId, RemixInput, VerificationUpdate, FALLBACK_AVATAR_URI,
    FALLBACK_IMAGE_URI,
};

use crate::error::Result;
use crate::mapping;
use crate::query::{Column, Direction, Filter, Select, Table};
use crate::row::Row;
use crate::traits::RemoteStore;

/// Defaults substituted for null columns when reading rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub fallback_image: String,
    pub fallback_avatar: String,
    pub unknown_meal_author: String,
    pub unknown_remix_author: String,
    pub unknown_handle: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            fallback_image: FALLBACK_IMAGE_URI.to_owned(),
            fallback_avatar: FALLBACK_AVATAR_URI.to_owned(),
            unknown_meal_author: "unknown_chef".to_owned(),
            unknown_remix_author: "remix_unknown".to_owned(),
            unknown_handle: "unknown".to_owned(),
        }
    }
}

/// Typed access to meals and remixes.
pub struct Gateway<S> {
    store: S,
    config: GatewayConfig,
}

fn by_id(id: &str) -> [Filter; 1] {
    [Filter::eq(Column::Id, id)]
}

// Single-row lookups: a miss is `None`, anything else propagates.
fn optional(result: Result<Row>) -> Result<Option<Row>> {
    match result {
        Ok(row) => Ok(Some(row)),
        Err(e) if e.is_no_rows() => Ok(None),
        Err(e) => Err(e),
    }
}

impl<S: RemoteStore> Gateway<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, GatewayConfig::default())
    }

    pub fn with_config(store: S, config: GatewayConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn meals_from(&self, rows: Vec<Row>) -> Result<Vec<Meal>> {
        rows.into_iter()
            .map(|row| Ok(mapping::meal_from_row(row.into_meal()?, &self.config)))
            .collect()
    }

    fn remixes_from(&self, rows: Vec<Row>) -> Result<Vec<Remix>> {
        rows.into_iter()
            .map(|row| Ok(mapping::remix_from_row(row.into_remix()?, &self.config)))
            .collect()
    }

    fn meal_from(&self, row: Row) -> Result<Meal> {
        Ok(mapping::meal_from_row(row.into_meal()?, &self.config))
    }

    fn remix_from(&self, row: Row) -> Result<Remix> {
        Ok(mapping::remix_from_row(row.into_remix()?, &self.config))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Meals
    // ─────────────────────────────────────────────────────────────────────────

    /// Every meal, highest struggle score first.
    pub async fn list_meals(&self) -> Result<Vec<Meal>> {
        let rows = self
            .store
            .select(
                &Select::from(Table::Meals)
                    .order_by(Column::StruggleScore, Direction::Descending),
            )
            .await?;
        self.meals_from(rows)
    }

    /// The newest meals, at most `limit` of them.
    pub async fn list_recent_meals(&self, limit: usize) -> Result<Vec<Meal>> {
        let rows = self
            .store
            .select(
                &Select::from(Table::Meals)
                    .order_by(Column::CreatedAt, Direction::Descending)
                    .limit(limit),
            )
            .await?;
        self.meals_from(rows)
    }

    pub async fn get_meal(&self, id: &MealId) -> Result<Option<Meal>> {
        let row = optional(
            self.store
                .select_single(&Select::from(Table::Meals).filter(Filter::eq(Column::Id, id.as_str())))
                .await,
        )?;
        row.map(|r| self.meal_from(r)).transpose()
    }

    pub async fn create_meal(&self, input: &MealInput) -> Result<Meal> {
        let row = self
            .store
            .insert(Table::Meals, &mapping::new_meal_values(input))
            .await?;
        debug!(id = row.id(), "created meal");
        self.meal_from(row)
    }

    /// Replace a meal's content. Verification and remix counters are kept.
    pub async fn update_meal(&self, id: &MealId, input: &MealInput) -> Result<Meal> {
        let row = self
            .store
            .update(
                Table::Meals,
                &by_id(id.as_str()),
                &mapping::meal_update_values(input),
            )
            .await?;
        self.meal_from(row)
    }

    pub async fn delete_meal(&self, id: &MealId) -> Result<()> {
        let removed = self.store.delete(Table::Meals, &by_id(id.as_str())).await?;
        debug!(%id, removed, "deleted meal");
        Ok(())
    }

    /// Write the verification fields of one meal and return it.
    pub async fn set_meal_verification(
        &self,
        id: &MealId,
        update: VerificationUpdate,
    ) -> Result<Meal> {
        let row = self
            .store
            .update(
                Table::Meals,
                &by_id(id.as_str()),
                &mapping::verification_values(update),
            )
            .await?;
        self.meal_from(row)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Remixes
    // ─────────────────────────────────────────────────────────────────────────

    /// Remixes of one meal, newest first.
    pub async fn list_remixes_for_meal(&self, meal_id: &MealId) -> Result<Vec<Remix>> {
        let rows = self
            .store
            .select(
                &Select::from(Table::Remixes)
                    .filter(Filter::eq(Column::ParentMealId, meal_id.as_str()))
                    .order_by(Column::CreatedAt, Direction::Descending),
            )
            .await?;
        self.remixes_from(rows)
    }

    /// The newest remixes across all meals.
    pub async fn list_latest_remixes(&self, limit: usize) -> Result<Vec<Remix>> {
        let rows = self
            .store
            .select(
                &Select::from(Table::Remixes)
                    .order_by(Column::CreatedAt, Direction::Descending)
                    .limit(limit),
            )
            .await?;
        self.remixes_from(rows)
    }

    pub async fn get_remix(&self, id: &RemixId) -> Result<Option<Remix>> {
        let row = optional(
            self.store
                .select_single(
                    &Select::from(Table::Remixes).filter(Filter::eq(Column::Id, id.as_str())),
                )
                .await,
        )?;
        row.map(|r| self.remix_from(r)).transpose()
    }

    pub async fn create_remix(&self, input: &RemixInput) -> Result<Remix> {
        let row = self
            .store
            .insert(Table::Remixes, &mapping::remix_values(input))
            .await?;
        debug!(id = row.id(), parent = ?input.parent_meal_id, "created remix");
        self.remix_from(row)
    }

    pub async fn update_remix(&self, id: &RemixId, input: &RemixInput) -> Result<Remix> {
        let row = self
            .store
            .update(
                Table::Remixes,
                &by_id(id.as_str()),
                &mapping::remix_values(input),
            )
            .await?;
        self.remix_from(row)
    }

    pub async fn delete_remix(&self, id: &RemixId) -> Result<()> {
        let removed = self
            .store
            .delete(Table::Remixes, &by_id(id.as_str()))
            .await?;
        debug!(%id, removed, "deleted remix");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::query::Values;
    use struggle_meals_core::Author;

    fn meal_input(title: &str, score: u32) -> MealInput {
        let mut input = MealInput::new(title, Author::new("chef", "chef"));
        input.struggle_score = Some(score);
        input
    }

    #[tokio::test]
    async fn test_list_meals_by_score() {
        let gateway = Gateway::new(MemoryStore::new());
        gateway.create_meal(&meal_input("A", 10)).await.unwrap();
        gateway.create_meal(&meal_input("B", 90)).await.unwrap();

        let titles: Vec<_> = gateway
            .list_meals()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn test_missing_meal_is_none() {
        let gateway = Gateway::new(MemoryStore::new());
        let meal = gateway.get_meal(&MealId::new("nope")).await.unwrap();
        assert!(meal.is_none());
    }

    #[tokio::test]
    async fn test_update_of_missing_meal_is_error() {
        let gateway = Gateway::new(MemoryStore::new());
        let err = gateway
            .set_meal_verification(
                &MealId::new("nope"),
                VerificationUpdate {
                    is_verified: true,
                    verifications: 1,
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_no_rows());
    }

    #[tokio::test]
    async fn test_update_meal_keeps_counters() {
        let gateway = Gateway::new(MemoryStore::new());
        let mut input = meal_input("A", 10);
        input.verifications = Some(4);
        input.is_verified = Some(true);
        let meal = gateway.create_meal(&input).await.unwrap();

        let mut edit = meal_input("A prime", 20);
        edit.verifications = Some(0);
        let updated = gateway.update_meal(&meal.id, &edit).await.unwrap();

        assert_eq!(updated.title, "A prime");
        assert_eq!(updated.verifications, 4);
        assert!(updated.is_verified);
    }

    #[tokio::test]
    async fn test_remixes_for_meal_newest_first() {
        let store = MemoryStore::new();
        for (id, ts) in [("r1", 1i64), ("r2", 3), ("r3", 2)] {
            store
                .insert(
                    Table::Remixes,
                    &Values::new()
                        .set(Column::Id, id)
                        .set(Column::Title, id)
                        .set(Column::ParentMealId, "m1")
                        .set(Column::CreatedAt, ts),
                )
                .await
                .unwrap();
        }
        store
            .insert(
                Table::Remixes,
                &Values::new()
                    .set(Column::Id, "other")
                    .set(Column::Title, "other")
                    .set(Column::ParentMealId, "m2")
                    .set(Column::CreatedAt, 9i64),
            )
            .await
            .unwrap();
        let gateway = Gateway::new(store);

        let ids: Vec<_> = gateway
            .list_remixes_for_meal(&MealId::new("m1"))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id.into_inner())
            .collect();
        assert_eq!(ids, vec!["r2", "r3", "r1"]);

        let latest = gateway.list_latest_remixes(2).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].id.as_str(), "other");
    }

    #[tokio::test]
    async fn test_remix_round_trip() {
        let gateway = Gateway::new(MemoryStore::new());
        let mut input = RemixInput::new("Chaos Toast", Author::default_remixer());
        input.parent_meal_id = Some(MealId::new("m1"));
        let remix = gateway.create_remix(&input).await.unwrap();

        let fetched = gateway.get_remix(&remix.id).await.unwrap().unwrap();
        assert_eq!(fetched, remix);
        assert_eq!(fetched.parent_meal_id, Some(MealId::new("m1")));

        gateway.delete_remix(&remix.id).await.unwrap();
        assert!(gateway.get_remix(&remix.id).await.unwrap().is_none());
    }
}
