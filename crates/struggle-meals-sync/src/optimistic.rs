//! Ordering of overlapping optimistic mutations.
//!
//! Mutations on the same meal form a chain while any of them is in flight.
//! The first one of a chain captures the rollback base; later ones reuse it.
//! When responses come back out of order only the newest mutation of the
//! chain may touch the cache. Older ones are superseded and their results
//! go only to their own callers.
//!
//! Chains are keyed by meal, and a settlement only ever writes its own
//! meal's rows, so chains on different meals never undo each other even
//! though they share list entries.
//!
//! The two phases are [`MutationLedger::begin`], called under the cache
//! lock before the optimistic write, and [`MutationLedger::settle`], called
//! under the lock once the network call returns.

use std::collections::HashMap;

use struggle_meals_core::MealId;

use crate::cache::Snapshot;

/// Proof of a begun mutation, handed back at settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationToken {
    scope: MealId,
    seq: u64,
}

impl MutationToken {
    pub fn scope(&self) -> &MealId {
        &self.scope
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What a settling mutation is allowed to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// Newest of its chain: commit on success, revert to the base on failure.
    Latest { base: Snapshot },
    /// A newer mutation on the same scope was begun after this one.
    Superseded,
}

#[derive(Debug)]
struct Chain {
    latest: u64,
    in_flight: usize,
    /// Rollback base; taken by whichever settlement commits or restores.
    base: Option<Snapshot>,
}

/// Per-scope bookkeeping of in-flight optimistic mutations.
#[derive(Debug, Default)]
pub struct MutationLedger {
    chains: HashMap<MealId, Chain>,
    next_seq: u64,
}

impl MutationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mutation on `scope`.
    ///
    /// `capture` runs only when the chain has no rollback base yet.
    pub fn begin(
        &mut self,
        scope: &MealId,
        capture: impl FnOnce() -> Snapshot,
    ) -> MutationToken {
        self.next_seq += 1;
        let seq = self.next_seq;

        let chain = self.chains.entry(scope.clone()).or_insert_with(|| Chain {
            latest: seq,
            in_flight: 0,
            base: None,
        });
        chain.latest = seq;
        chain.in_flight += 1;
        if chain.base.is_none() {
            chain.base = Some(capture());
        }

        MutationToken {
            scope: scope.clone(),
            seq,
        }
    }

    /// Record that the mutation behind `token` has returned.
    pub fn settle(&mut self, token: &MutationToken) -> Settlement {
        let Some(chain) = self.chains.get_mut(&token.scope) else {
            return Settlement::Superseded;
        };

        chain.in_flight = chain.in_flight.saturating_sub(1);
        let settlement = if chain.latest == token.seq {
            Settlement::Latest {
                base: chain.base.take().unwrap_or_default(),
            }
        } else {
            tracing::debug!(
                scope = %token.scope,
                seq = token.seq,
                latest = chain.latest,
                "mutation superseded"
            );
            Settlement::Superseded
        };

        if chain.in_flight == 0 {
            self.chains.remove(&token.scope);
        }
        settlement
    }

    /// Number of mutations in flight on `scope`.
    pub fn in_flight(&self, scope: &MealId) -> usize {
        self.chains.get(scope).map_or(0, |c| c.in_flight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Cache, CacheValue};
    use crate::key::CacheKey;
    use proptest::prelude::*;

    fn snapshot_of(len: usize) -> Snapshot {
        let mut cache = Cache::new();
        for limit in 0..len {
            let key = CacheKey::RecentMeals { limit };
            let ticket = cache.begin_fetch(&key);
            cache.complete_fetch(&key, ticket, Ok(CacheValue::Meals(Vec::new())));
        }
        cache.snapshot(|_| true)
    }

    #[test]
    fn test_single_mutation_is_latest() {
        let mut ledger = MutationLedger::new();
        let scope = MealId::new("m");

        let token = ledger.begin(&scope, || snapshot_of(2));
        assert_eq!(ledger.in_flight(&scope), 1);

        match ledger.settle(&token) {
            Settlement::Latest { base } => assert_eq!(base.len(), 2),
            other => panic!("unexpected settlement {:?}", other),
        }
        assert_eq!(ledger.in_flight(&scope), 0);
    }

    #[test]
    fn test_chain_reuses_first_base() {
        let mut ledger = MutationLedger::new();
        let scope = MealId::new("m");

        let first = ledger.begin(&scope, || snapshot_of(1));
        let second = ledger.begin(&scope, || panic!("base already captured"));

        // Newest settles first and owns the base.
        match ledger.settle(&second) {
            Settlement::Latest { base } => assert_eq!(base.len(), 1),
            other => panic!("unexpected settlement {:?}", other),
        }
        assert_eq!(ledger.settle(&first), Settlement::Superseded);
        assert_eq!(ledger.in_flight(&scope), 0);
    }

    #[test]
    fn test_older_settling_first_is_superseded() {
        let mut ledger = MutationLedger::new();
        let scope = MealId::new("m");

        let first = ledger.begin(&scope, || snapshot_of(3));
        let second = ledger.begin(&scope, Snapshot::default);

        assert_eq!(ledger.settle(&first), Settlement::Superseded);
        match ledger.settle(&second) {
            Settlement::Latest { base } => assert_eq!(base.len(), 3),
            other => panic!("unexpected settlement {:?}", other),
        }
    }

    #[test]
    fn test_scopes_are_independent() {
        let mut ledger = MutationLedger::new();
        let a = ledger.begin(&MealId::new("a"), Snapshot::default);
        let b = ledger.begin(&MealId::new("b"), Snapshot::default);

        assert!(matches!(ledger.settle(&a), Settlement::Latest { .. }));
        assert!(matches!(ledger.settle(&b), Settlement::Latest { .. }));
    }

    #[test]
    fn test_new_chain_after_latest_settles_takes_fresh_base() {
        let mut ledger = MutationLedger::new();
        let scope = MealId::new("m");

        let first = ledger.begin(&scope, || snapshot_of(1));
        let second = ledger.begin(&scope, Snapshot::default);
        assert!(matches!(ledger.settle(&second), Settlement::Latest { .. }));

        // `first` is still in flight, but the base was consumed.
        let third = ledger.begin(&scope, || snapshot_of(4));
        assert_eq!(ledger.settle(&first), Settlement::Superseded);
        match ledger.settle(&third) {
            Settlement::Latest { base } => assert_eq!(base.len(), 4),
            other => panic!("unexpected settlement {:?}", other),
        }
    }

    proptest! {
        /// However the responses of a chain are ordered, exactly one
        /// settlement is the latest and it belongs to the last begun.
        #[test]
        fn prop_one_latest_per_chain(order in Just((0..5usize).collect::<Vec<_>>()).prop_shuffle()) {
            let mut ledger = MutationLedger::new();
            let scope = MealId::new("m");
            let tokens: Vec<_> = (0..5).map(|_| ledger.begin(&scope, Snapshot::default)).collect();

            let mut latest = Vec::new();
            for i in order {
                if let Settlement::Latest { .. } = ledger.settle(&tokens[i]) {
                    latest.push(i);
                }
            }

            prop_assert_eq!(latest, vec![4]);
            prop_assert_eq!(ledger.in_flight(&scope), 0);
        }
    }
}
