//! # Struggle Meals Sync
//!
//! Keeps a client-side cache of meals and remixes consistent with the
//! remote store.
//!
//! ## Overview
//!
//! [`SyncCore`] owns the cache. Queries serve cached snapshots and fetch on
//! a miss or when an entry has gone stale. Commands go through the
//! [`Gateway`](struggle_meals_store::Gateway) and then invalidate a fixed
//! set of dependent entries. Verification toggles are applied to the cache
//! before the write and rolled back if it fails.
//!
//! ## Key Properties
//!
//! - **Newest fetch wins**: a fetch result lands only if no newer fetch or
//!   optimistic write for the same key began after it
//! - **Newest mutation wins**: overlapping toggles on one meal settle to the
//!   last one issued, whatever order the responses arrive in
//! - **Exact rollback**: a failed or abandoned toggle restores the rows of
//!   its own meal and leaves other meals' rows alone
//! - **Sticky errors**: a failed read stays errored until refetched
//!
//! ## Usage
//!
//! ```rust,no_run
//! use struggle_meals_store::{Gateway, MemoryStore};
//! use struggle_meals_sync::SyncCore;
//!
//! async fn example() -> struggle_meals_sync::Result<()> {
//!     let core = SyncCore::new(Gateway::new(MemoryStore::new()));
//!
//!     let leaderboard = core.meals().await;
//!     if let Some(top) = leaderboard.data.as_ref().and_then(|m| m.first()) {
//!         core.verify_meal(&top.id, true, None).await?;
//!     }
//!
//!     // Refresh whatever the toggle made stale.
//!     core.refetch_stale().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Entry Lifecycle
//!
//! ```text
//! Empty --fetch--> Loading --ok--> Ready --refetch--> Loading
//!                     |                \
//!                     +--err--> Errored  +--toggle--> OptimisticallyUpdated
//!                                                      |            |
//!                                                   commit      rollback
//!                                                      v            v
//!                                                    Ready    (snapshot)
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod invalidation;
pub mod key;
pub mod optimistic;

pub use cache::{Cache, CacheEntry, CacheStats, CacheValue, EntryStatus, Snapshot};
pub use config::SyncConfig;
pub use engine::{QueryState, SyncCore};
pub use error::{Result, SyncError};
pub use invalidation::{invalidation_set, InvalidationSet, KeyPattern, Mutation, ParentHint};
pub use key::CacheKey;
pub use optimistic::{MutationLedger, MutationToken, Settlement};
