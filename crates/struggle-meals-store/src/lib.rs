//! # Struggle Meals Store
//!
//! The remote data boundary for Struggle Meals: a row-oriented store
//! abstraction, two backends, and the typed gateway that the
//! synchronization layer talks to.
//!
//! ## Overview
//!
//! Requests are addressed by table and filter predicates through the
//! [`RemoteStore`] trait. [`MemoryStore`] keeps rows in process;
//! [`SqliteStore`] persists them. [`Gateway`] sits on top of either and
//! speaks in [`Meal`](struggle_meals_core::Meal)s and
//! [`Remix`](struggle_meals_core::Remix)es.
//!
//! ## Key Types
//!
//! - [`RemoteStore`] - The async trait for row-level CRUD
//! - [`Gateway`] - Typed operations with null-safe row mapping
//! - [`GatewayConfig`] - Defaults used for null columns
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests and demos
//!
//! ## Usage
//!
//! ```rust,no_run
//! use struggle_meals_core::MealId;
//! use struggle_meals_store::{Gateway, SqliteStore};
//!
//! async fn example() -> struggle_meals_store::Result<()> {
//!     let gateway = Gateway::new(SqliteStore::open("meals.db")?);
//!
//!     let leaderboard = gateway.list_meals().await?;
//!     let missing = gateway.get_meal(&MealId::new("nope")).await?;
//!     assert!(missing.is_none());
//!     # let _ = leaderboard;
//!     Ok(())
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Null-safe reads**: every nullable column maps to a default
//! - **Lookup misses**: `select_single` with no rows becomes `None` in the gateway
//! - **Guarded deletes**: a delete without filters is refused
//! - **Counter safety**: meal edits never write verification or remix counters

pub mod error;
pub mod gateway;
pub mod mapping;
pub mod memory;
pub mod migration;
pub mod query;
pub mod row;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use gateway::{Gateway, GatewayConfig};
pub use memory::MemoryStore;
pub use query::{Column, Direction, Filter, OrderBy, Select, Table, Value, Values};
pub use row::{MealRow, RemixRow, Row};
pub use sqlite::SqliteStore;
pub use traits::RemoteStore;
