//! Error types for the store module.

use thiserror::Error;

use crate::query::{Column, Table};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A single-row request matched nothing.
    ///
    /// Lookups translate this into `None`; it is a normal miss, not a fault.
    #[error("no rows matched in {0}")]
    NoRows(Table),

    /// A single-row request matched more than one row.
    #[error("{count} rows matched in {table}, expected one")]
    MultipleRows { table: Table, count: usize },

    /// Delete or update issued without a filter.
    #[error("refusing to {operation} {table} without a filter")]
    MissingFilter {
        table: Table,
        operation: &'static str,
    },

    /// Insert with an id that is already taken.
    #[error("duplicate key {id} in {table}")]
    DuplicateKey { table: Table, id: String },

    /// Column does not exist on the table.
    #[error("column {column} does not exist on {table}")]
    UnknownColumn { table: Table, column: Column },

    /// A required column was not supplied on insert.
    #[error("column {column} on {table} is required")]
    MissingColumn { table: Table, column: Column },

    /// Value of the wrong type for a column.
    #[error("column {column} expects {expected}")]
    TypeMismatch {
        column: Column,
        expected: &'static str,
    },

    /// A row of one table was used where another was expected.
    #[error("expected a {expected} row, got a {actual} row")]
    TableMismatch { expected: Table, actual: Table },

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Column encoding/decoding error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// The remote store could not be reached or answered with a failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether this is the "no rows" lookup miss.
    pub fn is_no_rows(&self) -> bool {
        matches!(self, StoreError::NoRows(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
