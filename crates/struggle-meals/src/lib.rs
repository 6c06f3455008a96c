//! # Struggle Meals
//!
//! Client library for Struggle Meals, a leaderboard of cheap, fast and
//! slightly unhinged recipes and the remixes people build on top of them.
//!
//! ## Overview
//!
//! The crate ties together:
//!
//! - **Core**: meal and remix types, the struggle score and input validation
//! - **Store**: the remote row store, SQLite persistence and null-safe mapping
//! - **Sync**: the query cache with invalidation and optimistic verification
//!
//! ## Key Concepts
//!
//! - **Struggle score**: 0-100, higher is more desperate. Derived from
//!   cooking time and ingredient count when the author leaves it blank.
//! - **Verification**: a meal is verified once someone vouches for it; the
//!   toggle is applied locally first and rolled back on failure.
//! - **Remix**: a recipe derived from a meal, or an original with no parent.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use struggle_meals::{Client, ClientConfig};
//!
//! async fn example() -> struggle_meals::Result<()> {
//!     let client = Client::open(ClientConfig::from_json_file("struggle.json")?)?;
//!     client.seed_demo_data().await?;
//!
//!     let board = client.leaderboard().await;
//!     if let Some(top) = board.data.as_ref().and_then(|meals| meals.first()) {
//!         client.verify_meal(&top.id, !top.is_verified).await?;
//!     }
//!
//!     client.refresh().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! The component crates are re-exported:
//!
//! - `struggle_meals::core` - Meal and remix types, scoring, validation
//! - `struggle_meals::store` - Remote store abstraction and SQLite
//! - `struggle_meals::sync` - Query cache and commands

pub mod client;
pub mod config;
pub mod error;
pub mod seed;

pub use struggle_meals_core as core;
pub use struggle_meals_store as store;
pub use struggle_meals_sync as sync;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use seed::{seed_demo_data, SeedReport, DEMO_MEAL_IDS};

pub use struggle_meals_core::{Author, Meal, MealId, MealInput, Remix, RemixId, RemixInput};
pub use struggle_meals_sync::{EntryStatus, QueryState};
