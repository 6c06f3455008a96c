//! SQLite implementation of the RemoteStore trait.
//!
//! The persistent backend. Uses rusqlite with bundled SQLite, wrapped in
//! async via tokio::spawn_blocking. List columns are stored as CBOR arrays.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};

use struggle_meals_core::{now_millis, MealId};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::query::{Column, Direction, Filter, OrderBy, Select, Table, Value, Values};
use crate::row::Row;
use crate::traits::{check_filters, RemoteStore};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|e| {
                StoreError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                    Some(format!("mutex poisoned: {}", e)),
                ))
            })?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            StoreError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!("spawn_blocking failed: {}", e)),
            ))
        })?
    }
}

// Encode a value for binding. Booleans become 0/1, lists become CBOR.
fn to_sql(value: &Value) -> Result<SqlValue> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Integer(n) => SqlValue::Integer(*n),
        Value::Real(n) => SqlValue::Real(*n),
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::TextList(items) => {
            let mut buf = Vec::new();
            ciborium::into_writer(items, &mut buf)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            SqlValue::Blob(buf)
        }
    })
}

// Decode a stored cell back into a value for `column`.
fn from_sql(column: Column, cell: SqlValue) -> Result<Value> {
    Ok(match cell {
        SqlValue::Null => Value::Null,
        SqlValue::Blob(bytes) if column.is_list() => {
            let items: Vec<String> = ciborium::from_reader(&bytes[..])
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            Value::TextList(items)
        }
        SqlValue::Integer(n) if column == Column::IsVerified => Value::Bool(n != 0),
        SqlValue::Integer(n) => Value::Integer(n),
        SqlValue::Real(n) => Value::Real(n),
        SqlValue::Text(s) => Value::Text(s),
        SqlValue::Blob(_) => {
            return Err(StoreError::TypeMismatch {
                column,
                expected: "scalar",
            })
        }
    })
}

fn column_list(table: Table) -> String {
    table
        .columns()
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn where_clause(filters: &[Filter], params: &mut Vec<SqlValue>) -> Result<String> {
    if filters.is_empty() {
        return Ok(String::new());
    }

    let mut parts = Vec::with_capacity(filters.len());
    for filter in filters {
        match filter {
            Filter::Eq(column, value) => {
                params.push(to_sql(value)?);
                parts.push(format!("{} = ?{}", column, params.len()));
            }
            Filter::IsNull(column) => parts.push(format!("{} IS NULL", column)),
            Filter::NotNull(column) => parts.push(format!("{} IS NOT NULL", column)),
        }
    }

    Ok(format!(" WHERE {}", parts.join(" AND ")))
}

/// Rows matching the request, each paired with its rowid.
fn query_rows(
    conn: &Connection,
    table: Table,
    filters: &[Filter],
    order: Option<OrderBy>,
    limit: Option<usize>,
) -> Result<Vec<(i64, Row)>> {
    let mut params = Vec::new();
    let mut sql = format!("SELECT rowid, {} FROM {}", column_list(table), table);
    sql.push_str(&where_clause(filters, &mut params)?);

    // rowid breaks ties so equal keys come back in insertion order
    match order {
        Some(OrderBy { column, direction }) => {
            let dir = match direction {
                Direction::Ascending => "ASC",
                Direction::Descending => "DESC",
            };
            sql.push_str(&format!(" ORDER BY {} {}, rowid ASC", column, dir));
        }
        None => sql.push_str(" ORDER BY rowid ASC"),
    }

    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    let columns = table.columns();
    let mut stmt = conn.prepare(&sql)?;
    let raw = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            let rowid: i64 = row.get(0)?;
            let cells = (0..columns.len())
                .map(|i| row.get::<_, SqlValue>(i + 1))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok((rowid, cells))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    raw.into_iter()
        .map(|(rowid, cells)| {
            let mut row = Row::empty(table, String::new(), 0);
            for (column, cell) in columns.iter().zip(cells) {
                row.set(*column, from_sql(*column, cell)?)?;
            }
            Ok((rowid, row))
        })
        .collect()
}

fn row_params(row: &Row) -> Result<Vec<SqlValue>> {
    row.table()
        .columns()
        .iter()
        .map(|c| to_sql(&row.get(*c)))
        .collect()
}

fn require_filters(table: Table, filters: &[Filter], operation: &'static str) -> Result<()> {
    if filters.is_empty() {
        return Err(StoreError::MissingFilter { table, operation });
    }
    check_filters(table, filters)
}

#[async_trait]
impl RemoteStore for SqliteStore {
    async fn select(&self, query: &Select) -> Result<Vec<Row>> {
        check_filters(query.table, &query.filters)?;
        let query = query.clone();

        self.run(move |conn| {
            let rows = query_rows(conn, query.table, &query.filters, query.order, query.limit)?;
            Ok(rows.into_iter().map(|(_, row)| row).collect())
        })
        .await
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

        self.run(move |conn| {
            let exists: bool = conn.query_row(
                &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", table),
                [row.id()],
                |r| r.get(0),
            )?;
            if exists {
                return Err(StoreError::DuplicateKey {
                    table,
                    id: row.id().to_owned(),
                });
            }

            let columns = table.columns();
            let placeholders = (1..=columns.len())
                .map(|i| format!("?{}", i))
                .collect::<Vec<_>>()
                .join(", ");
            conn.execute(
                &format!(
                    "INSERT INTO {} ({}) VALUES ({})",
                    table,
                    column_list(table),
                    placeholders
                ),
                params_from_iter(row_params(&row)?.iter()),
            )?;

            Ok(row)
        })
        .await
    }

    async fn update(&self, table: Table, filters: &[Filter], values: &Values) -> Result<Row> {
        require_filters(table, filters, "update")?;
        let filters = filters.to_vec();
        let values = values.clone();

        self.run(move |conn| {
            let tx = conn.transaction()?;

            let mut matched = query_rows(&tx, table, &filters, None, None)?;
            let (rowid, mut row) = match matched.len() {
                0 => return Err(StoreError::NoRows(table)),
                1 => matched.remove(0),
                count => return Err(StoreError::MultipleRows { table, count }),
            };

            row.apply(&values)?;

            let columns = table.columns();
            let assignments = columns
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{} = ?{}", c, i + 1))
                .collect::<Vec<_>>()
                .join(", ");
            let mut params = row_params(&row)?;
            params.push(SqlValue::Integer(rowid));
            tx.execute(
                &format!(
                    "UPDATE {} SET {} WHERE rowid = ?{}",
                    table,
                    assignments,
                    params.len()
                ),
                params_from_iter(params.iter()),
            )?;

            tx.commit()?;
            Ok(row)
        })
        .await
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<u64> {
        require_filters(table, filters, "delete")?;
        let filters = filters.to_vec();

        self.run(move |conn| {
            let mut params = Vec::new();
            let sql = format!(
                "DELETE FROM {}{}",
                table,
                where_clause(&filters, &mut params)?
            );
            let removed = conn.execute(&sql, params_from_iter(params.iter()))?;
            Ok(removed as u64)
        })
        .await
    }
}
