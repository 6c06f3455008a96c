//! RemoteStore trait: the row-oriented interface of the remote data store.
//!
//! Requests are addressed by table and filter predicates, mirroring the
//! generated CRUD endpoints the application talks to. Implementations
//! include an in-memory store (tests, demos) and SQLite.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::query::{Filter, Select, Table, Values};
use crate::row::Row;

/// The remote store: async row-level CRUD.
///
/// # Design Notes
///
/// - **Single-row requests**: `select_single` and `update` fail with
///   [`StoreError::NoRows`] when nothing matches, so callers can tell an
///   empty lookup from a transport failure.
/// - **Guarded deletes**: `delete` refuses an empty filter list.
/// - **Store-assigned keys**: `insert` fills `id` and `created_at` when the
///   values do not carry them, and returns the stored row.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read every row matching the request.
    async fn select(&self, query: &Select) -> Result<Vec<Row>>;

    /// Read exactly one row.
    async fn select_single(&self, query: &Select) -> Result<Row> {
        let mut rows = self.select(query).await?;
        match rows.len() {
            0 => Err(StoreError::NoRows(query.table)),
            1 => Ok(rows.remove(0)),
            count => Err(StoreError::MultipleRows {
                table: query.table,
                count,
            }),
        }
    }

    /// Insert one row and return it as stored.
    async fn insert(&self, table: Table, values: &Values) -> Result<Row>;

    /// Update the single row matching `filters` and return it as stored.
    async fn update(&self, table: Table, filters: &[Filter], values: &Values) -> Result<Row>;

    /// Delete every row matching `filters`, returning how many went.
    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<u64>;
}

#[async_trait]
impl<S: RemoteStore + ?Sized> RemoteStore for Arc<S> {
    async fn select(&self, query: &Select) -> Result<Vec<Row>> {
        (**self).select(query).await
    }

    async fn select_single(&self, query: &Select) -> Result<Row> {
        (**self).select_single(query).await
    }

    async fn insert(&self, table: Table, values: &Values) -> Result<Row> {
        (**self).insert(table, values).await
    }

    async fn update(&self, table: Table, filters: &[Filter], values: &Values) -> Result<Row> {
        (**self).update(table, filters, values).await
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<u64> {
        (**self).delete(table, filters).await
    }
}

/// Reject filters naming columns the table does not have.
pub(crate) fn check_filters(table: Table, filters: &[Filter]) -> Result<()> {
    for filter in filters {
        let column = filter.column();
        if !table.has_column(column) {
            return Err(StoreError::UnknownColumn { table, column });
        }
    }
    Ok(())
}
