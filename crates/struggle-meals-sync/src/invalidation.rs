//! Which cache entries a mutation makes stale.
//!
//! Each mutation kind maps to a fixed set of key patterns. Meal mutations
//! never reach remix entries; remix mutations reach the meal lists because
//! a remix changes its parent's standing.

use struggle_meals_core::{MealId, RemixId};

use crate::key::CacheKey;

/// What the cache knows about a remix's parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentHint {
    /// The parent is known (possibly "no parent").
    Known(Option<MealId>),
    /// The remix was not in any cached entry.
    Unknown,
}

impl From<Option<Option<MealId>>> for ParentHint {
    fn from(cached: Option<Option<MealId>>) -> Self {
        cached.map_or(ParentHint::Unknown, ParentHint::Known)
    }
}

/// A completed (or settled) write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateMeal(MealId),
    UpdateMeal(MealId),
    DeleteMeal(MealId),
    VerifyMeal(MealId),
    CreateRemix {
        parent: Option<MealId>,
    },
    UpdateRemix {
        id: RemixId,
        parent: Option<MealId>,
        previous_parent: ParentHint,
    },
    DeleteRemix {
        id: RemixId,
        parent: ParentHint,
    },
}

/// A predicate over cache keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPattern {
    Exact(CacheKey),
    /// `Meals` and every `RecentMeals`.
    AllMealLists,
    /// Every `LatestRemixes`, whatever the limit.
    AllLatestRemixes,
    /// Every `RemixesForMeal`, whatever the meal.
    AllRemixLists,
}

impl KeyPattern {
    pub fn matches(&self, key: &CacheKey) -> bool {
        match self {
            KeyPattern::Exact(k) => k == key,
            KeyPattern::AllMealLists => key.is_meal_list(),
            KeyPattern::AllLatestRemixes => matches!(key, CacheKey::LatestRemixes { .. }),
            KeyPattern::AllRemixLists => matches!(key, CacheKey::RemixesForMeal(_)),
        }
    }
}

/// The patterns a mutation invalidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationSet {
    patterns: Vec<KeyPattern>,
}

impl InvalidationSet {
    fn add(&mut self, pattern: KeyPattern) {
        if !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
    }

    pub fn patterns(&self) -> &[KeyPattern] {
        &self.patterns
    }

    /// Whether `key` is covered by the set.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.patterns.iter().any(|p| p.matches(key))
    }

    fn meal_set(&mut self, id: &MealId) {
        self.add(KeyPattern::AllMealLists);
        self.add(KeyPattern::Exact(CacheKey::Meal(id.clone())));
    }

    // What creating a remix under `parent` touches.
    fn remix_create_set(&mut self, parent: Option<&MealId>) {
        if let Some(parent) = parent {
            self.add(KeyPattern::Exact(CacheKey::RemixesForMeal(parent.clone())));
        }
        self.add(KeyPattern::AllMealLists);
        self.add(KeyPattern::AllLatestRemixes);
        if let Some(parent) = parent {
            self.add(KeyPattern::Exact(CacheKey::Meal(parent.clone())));
        }
    }
}

/// Compute the invalidation set of a mutation.
pub fn invalidation_set(mutation: &Mutation) -> InvalidationSet {
    let mut set = InvalidationSet::default();

    match mutation {
        Mutation::CreateMeal(id)
        | Mutation::UpdateMeal(id)
        | Mutation::DeleteMeal(id)
        | Mutation::VerifyMeal(id) => set.meal_set(id),

        Mutation::CreateRemix { parent } => set.remix_create_set(parent.as_ref()),

        Mutation::UpdateRemix {
            id,
            parent,
            previous_parent,
        } => {
            set.remix_create_set(parent.as_ref());
            set.add(KeyPattern::Exact(CacheKey::Remix(id.clone())));
            match previous_parent {
                ParentHint::Known(previous) if previous != parent => {
                    set.remix_create_set(previous.as_ref());
                }
                ParentHint::Known(_) => {}
                // The old parent may be any meal.
                ParentHint::Unknown => set.add(KeyPattern::AllRemixLists),
            }
        }

        Mutation::DeleteRemix { id, parent } => {
            set.add(KeyPattern::Exact(CacheKey::Remix(id.clone())));
            match parent {
                ParentHint::Known(parent) => set.remix_create_set(parent.as_ref()),
                ParentHint::Unknown => {
                    set.remix_create_set(None);
                    set.add(KeyPattern::AllRemixLists);
                }
            }
        }
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(id: &str) -> MealId {
        MealId::new(id)
    }

    #[test]
    fn test_remix_create_with_parent() {
        let set = invalidation_set(&Mutation::CreateRemix {
            parent: Some(m("p")),
        });

        assert!(set.contains(&CacheKey::RemixesForMeal(m("p"))));
        assert!(set.contains(&CacheKey::Meals));
        assert!(set.contains(&CacheKey::RecentMeals { limit: 4 }));
        assert!(set.contains(&CacheKey::LatestRemixes { limit: 6 }));
        assert!(set.contains(&CacheKey::LatestRemixes { limit: 20 }));
        assert!(set.contains(&CacheKey::Meal(m("p"))));

        assert!(!set.contains(&CacheKey::Meal(m("q"))));
        assert!(!set.contains(&CacheKey::RemixesForMeal(m("q"))));
        assert_eq!(set.patterns().len(), 4);
    }

    #[test]
    fn test_remix_create_without_parent() {
        let set = invalidation_set(&Mutation::CreateRemix { parent: None });
        assert_eq!(
            set.patterns(),
            &[KeyPattern::AllMealLists, KeyPattern::AllLatestRemixes]
        );
    }

    #[test]
    fn test_meal_mutations_skip_remix_entries() {
        for mutation in [
            Mutation::CreateMeal(m("a")),
            Mutation::UpdateMeal(m("a")),
            Mutation::DeleteMeal(m("a")),
            Mutation::VerifyMeal(m("a")),
        ] {
            let set = invalidation_set(&mutation);
            assert!(set.contains(&CacheKey::Meal(m("a"))));
            assert!(set.contains(&CacheKey::Meals));
            assert!(!set.contains(&CacheKey::Meal(m("b"))));
            assert!(!set.contains(&CacheKey::RemixesForMeal(m("a"))));
            assert!(!set.contains(&CacheKey::LatestRemixes { limit: 6 }));
        }
    }

    #[test]
    fn test_remix_reparent_touches_both_parents() {
        let set = invalidation_set(&Mutation::UpdateRemix {
            id: RemixId::new("r"),
            parent: Some(m("new")),
            previous_parent: ParentHint::Known(Some(m("old"))),
        });

        assert!(set.contains(&CacheKey::Remix(RemixId::new("r"))));
        assert!(set.contains(&CacheKey::RemixesForMeal(m("new"))));
        assert!(set.contains(&CacheKey::RemixesForMeal(m("old"))));
        assert!(set.contains(&CacheKey::Meal(m("old"))));
        assert!(!set.contains(&CacheKey::RemixesForMeal(m("other"))));
    }

    #[test]
    fn test_remix_update_same_parent() {
        let set = invalidation_set(&Mutation::UpdateRemix {
            id: RemixId::new("r"),
            parent: Some(m("p")),
            previous_parent: ParentHint::Known(Some(m("p"))),
        });
        assert!(!set.contains(&CacheKey::RemixesForMeal(m("other"))));
        assert!(set.contains(&CacheKey::Meal(m("p"))));
    }

    #[test]
    fn test_remix_delete_unknown_parent() {
        let set = invalidation_set(&Mutation::DeleteRemix {
            id: RemixId::new("r"),
            parent: ParentHint::Unknown,
        });
        assert!(set.contains(&CacheKey::RemixesForMeal(m("anything"))));
        assert!(set.contains(&CacheKey::Remix(RemixId::new("r"))));
        assert!(set.contains(&CacheKey::LatestRemixes { limit: 6 }));
    }

    #[test]
    fn test_parent_hint_from_cache_lookup() {
        assert_eq!(ParentHint::from(None), ParentHint::Unknown);
        assert_eq!(
            ParentHint::from(Some(Some(m("p")))),
            ParentHint::Known(Some(m("p")))
        );
    }
}
