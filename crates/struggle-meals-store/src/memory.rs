//! In-memory implementation of the RemoteStore trait.
//!
//! Same request semantics as the SQLite backend with no persistence. Used
//! by tests and demos as the remote end of the gateway.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use struggle_meals_core::{now_millis, MealId};

use crate::error::{Result, StoreError};
use crate::query::{Column, Direction, Filter, Select, Table, Value, Values};
use crate::row::Row;
use crate::traits::{check_filters, RemoteStore};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        let mut tables = HashMap::new();
        tables.insert(Table::Meals, Vec::new());
        tables.insert(Table::Remixes, Vec::new());
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Number of rows currently in `table`.
    pub fn row_count(&self, table: Table) -> usize {
        self.read().get(&table).map_or(0, Vec::len)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Table, Vec<Row>>> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Table, Vec<Row>>> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn row_matches(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|f| f.matches(&row.get(f.column())))
}

fn require_filters(table: Table, filters: &[Filter], operation: &'static str) -> Result<()> {
    if filters.is_empty() {
        return Err(StoreError::MissingFilter { table, operation });
    }
    check_filters(table, filters)
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn select(&self, query: &Select) -> Result<Vec<Row>> {
        check_filters(query.table, &query.filters)?;
        let tables = self.read();

        let mut rows: Vec<Row> = tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row_matches(row, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = query.order {
            rows.sort_by(|a, b| {
                let ord = a.get(order.column).compare(&b.get(order.column));
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn insert(&self, table: Table, values: &Values) -> Result<Row> {
        if values.get(Column::Title).map_or(true, Value::is_null) {
            return Err(StoreError::MissingColumn {
                table,
                column: Column::Title,
            });
        }

        let id = match values.get(Column::Id) {
            Some(Value::Text(id)) => id.clone(),
            _ => MealId::generate().into_inner(),
        };
        let created_at = match values.get(Column::CreatedAt) {
            Some(Value::Integer(ts)) => *ts,
            _ => now_millis(),
        };

        let mut row = Row::empty(table, id, created_at);
        row.apply(values)?;

        let mut tables = self.write();
        let rows = tables.entry(table).or_default();
        if rows.iter().any(|r| r.id() == row.id()) {
            return Err(StoreError::DuplicateKey {
                table,
                id: row.id().to_owned(),
            });
        }
        rows.push(row.clone());

        Ok(row)
    }

    async fn update(&self, table: Table, filters: &[Filter], values: &Values) -> Result<Row> {
        require_filters(table, filters, "update")?;

        let mut tables = self.write();
        let rows = tables.entry(table).or_default();

        let matching: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row_matches(row, filters))
            .map(|(i, _)| i)
            .collect();

        let index = match matching.as_slice() {
            [] => return Err(StoreError::NoRows(table)),
            [index] => *index,
            many => {
                return Err(StoreError::MultipleRows {
                    table,
                    count: many.len(),
                })
            }
        };

        let mut updated = rows[index].clone();
        updated.apply(values)?;
        rows[index] = updated.clone();

        Ok(updated)
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<u64> {
        require_filters(table, filters, "delete")?;

        let mut tables = self.write();
        let rows = tables.entry(table).or_default();
        let before = rows.len();
        rows.retain(|row| !row_matches(row, filters));

        Ok((before - rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal_values(title: &str, score: i64) -> Values {
        Values::new()
            .set(Column::Title, title)
            .set(Column::StruggleScore, score)
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamp() {
        let store = MemoryStore::new();
        let row = store
            .insert(Table::Meals, &meal_values("Ramen Pizza", 88))
            .await
            .unwrap();

        assert_eq!(row.id().len(), 32);
        let meal = row.into_meal().unwrap();
        assert!(meal.created_at > 0);
        assert_eq!(meal.struggle_score, Some(88));
        assert_eq!(meal.verifications, None);
    }

    #[tokio::test]
    async fn test_insert_requires_title() {
        let store = MemoryStore::new();
        let err = store
            .insert(Table::Meals, &Values::new().set(Column::StruggleScore, 3i64))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingColumn { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = MemoryStore::new();
        let values = meal_values("A", 1).set(Column::Id, "fixed");
        store.insert(Table::Meals, &values).await.unwrap();
        let err = store.insert(Table::Meals, &values).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_select_orders_and_limits() {
        let store = MemoryStore::new();
        store.insert(Table::Meals, &meal_values("A", 10)).await.unwrap();
        store.insert(Table::Meals, &meal_values("B", 90)).await.unwrap();
        store.insert(Table::Meals, &meal_values("C", 50)).await.unwrap();

        let rows = store
            .select(
                &Select::from(Table::Meals)
                    .order_by(Column::StruggleScore, Direction::Descending)
                    .limit(2),
            )
            .await
            .unwrap();

        let titles: Vec<_> = rows
            .into_iter()
            .map(|r| r.into_meal().unwrap().title)
            .collect();
        assert_eq!(titles, vec!["B", "C"]);
    }

    #[tokio::test]
    async fn test_select_single_no_rows() {
        let store = MemoryStore::new();
        let err = store
            .select_single(&Select::from(Table::Meals).filter(Filter::eq(Column::Id, "missing")))
            .await
            .unwrap_err();
        assert!(err.is_no_rows());
    }

    #[tokio::test]
    async fn test_update_single_row() {
        let store = MemoryStore::new();
        let row = store.insert(Table::Meals, &meal_values("A", 10)).await.unwrap();
        let id = row.id().to_owned();

        let updated = store
            .update(
                Table::Meals,
                &[Filter::eq(Column::Id, id.as_str())],
                &Values::new().set(Column::IsVerified, true),
            )
            .await
            .unwrap()
            .into_meal()
            .unwrap();
        assert_eq!(updated.is_verified, Some(true));
        assert_eq!(updated.title, "A");

        let err = store
            .update(
                Table::Meals,
                &[Filter::eq(Column::Id, "missing")],
                &Values::new().set(Column::IsVerified, true),
            )
            .await
            .unwrap_err();
        assert!(err.is_no_rows());
    }

    #[tokio::test]
    async fn test_delete_requires_filter() {
        let store = MemoryStore::new();
        store.insert(Table::Remixes, &meal_values("R", 1)).await.unwrap();

        let err = store.delete(Table::Remixes, &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingFilter { .. }));

        let removed = store
            .delete(Table::Remixes, &[Filter::NotNull(Column::Id)])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.row_count(Table::Remixes), 0);
    }

    #[tokio::test]
    async fn test_filter_on_foreign_column_rejected() {
        let store = MemoryStore::new();
        let err = store
            .select(&Select::from(Table::Meals).filter(Filter::eq(Column::ParentMealId, "m")))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownColumn { .. }));
    }
}
