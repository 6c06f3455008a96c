//! Proptest generators for property-based testing.

use proptest::prelude::*;

use struggle_meals_core::{Author, MealId, MealInput, RemixId, RemixInput, MAX_STRUGGLE_SCORE};
use struggle_meals_sync::{CacheKey, Mutation, ParentHint};

/// Generate a meal id.
pub fn meal_id() -> impl Strategy<Value = MealId> {
    "m[0-9]{1,2}".prop_map(MealId::new)
}

/// Generate a remix id.
pub fn remix_id() -> impl Strategy<Value = RemixId> {
    "r[0-9]{1,2}".prop_map(RemixId::new)
}

/// Generate a non-blank title, possibly with stray whitespace.
pub fn title() -> impl Strategy<Value = String> {
    "[ ]{0,2}[A-Za-z][A-Za-z0-9 &]{0,30}[ ]{0,2}".prop_map(String::from)
}

/// Generate a list of entries, some of them blank.
pub fn entries(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            4 => "[A-Za-z][A-Za-z ]{0,15}".prop_map(String::from),
            1 => "[ ]{0,3}".prop_map(String::from),
        ],
        0..=max_len,
    )
}

/// Generate an author with non-blank name and handle.
pub fn author() -> impl Strategy<Value = Author> {
    ("[A-Za-z][A-Za-z ]{0,15}", "[a-z0-9_]{1,16}", any::<bool>()).prop_map(
        |(name, handle, with_avatar)| {
            let author = Author::new(name, handle.clone());
            if with_avatar {
                author.with_avatar(format!("https://avatars.test/{}", handle))
            } else {
                author
            }
        },
    )
}

/// Generate a cost in whole cents.
pub fn cost() -> impl Strategy<Value = f64> {
    (0u32..=5_000).prop_map(|cents| f64::from(cents) / 100.0)
}

/// Generate a valid explicit score, or none.
pub fn score() -> impl Strategy<Value = Option<u32>> {
    prop::option::of(0..=MAX_STRUGGLE_SCORE)
}

/// Generate a meal submission that passes validation once sanitized.
pub fn meal_input() -> impl Strategy<Value = MealInput> {
    (
        (title(), prop::option::of("[a-z ]{0,40}"), entries(6), entries(3), entries(5)),
        (0u32..=120, cost(), score(), author()),
        (
            prop::option::of(0u32..=50),
            prop::option::of(0u32..=50),
            prop::option::of(any::<bool>()),
        ),
    )
        .prop_map(
            |(
                (title, description, ingredients, tools, steps),
                (time_in_minutes, estimated_cost, struggle_score, author),
                (verifications, remixes, is_verified),
            )| MealInput {
                title,
                description,
                image: None,
                ingredients,
                tools,
                steps,
                time_in_minutes,
                estimated_cost,
                struggle_score,
                author,
                verifications,
                remixes,
                is_verified,
            },
        )
}

/// Generate a remix submission that passes validation once sanitized.
pub fn remix_input() -> impl Strategy<Value = RemixInput> {
    (
        prop::option::of(meal_id()),
        (title(), entries(6), entries(3), entries(5)),
        (0u32..=120, cost(), score(), author()),
    )
        .prop_map(
            |(
                parent_meal_id,
                (title, ingredients, tools, steps),
                (time_in_minutes, estimated_cost, struggle_score, author),
            )| RemixInput {
                parent_meal_id,
                title,
                description: None,
                image: None,
                ingredients,
                tools,
                steps,
                time_in_minutes,
                estimated_cost,
                struggle_score,
                author,
            },
        )
}

/// Generate any cache key.
pub fn cache_key() -> impl Strategy<Value = CacheKey> {
    prop_oneof![
        Just(CacheKey::Meals),
        (1usize..=10).prop_map(|limit| CacheKey::RecentMeals { limit }),
        meal_id().prop_map(CacheKey::Meal),
        meal_id().prop_map(CacheKey::RemixesForMeal),
        remix_id().prop_map(CacheKey::Remix),
        (1usize..=10).prop_map(|limit| CacheKey::LatestRemixes { limit }),
    ]
}

fn parent_hint() -> impl Strategy<Value = ParentHint> {
    prop_oneof![
        prop::option::of(meal_id()).prop_map(ParentHint::Known),
        Just(ParentHint::Unknown),
    ]
}

/// Generate a remix mutation.
pub fn remix_mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        prop::option::of(meal_id()).prop_map(|parent| Mutation::CreateRemix { parent }),
        (remix_id(), prop::option::of(meal_id()), parent_hint()).prop_map(
            |(id, parent, previous_parent)| Mutation::UpdateRemix {
                id,
                parent,
                previous_parent,
            }
        ),
        (remix_id(), parent_hint()).prop_map(|(id, parent)| Mutation::DeleteRemix { id, parent }),
    ]
}

/// Generate a meal mutation.
pub fn meal_mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        meal_id().prop_map(Mutation::CreateMeal),
        meal_id().prop_map(Mutation::UpdateMeal),
        meal_id().prop_map(Mutation::DeleteMeal),
        meal_id().prop_map(Mutation::VerifyMeal),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use struggle_meals_core::{validate_meal_input, validate_remix_input};
    use struggle_meals_store::{Gateway, MemoryStore};
    use struggle_meals_sync::invalidation_set;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    proptest! {
        #[test]
        fn test_generated_inputs_are_valid(meal in meal_input(), remix in remix_input()) {
            prop_assert!(validate_meal_input(&meal.sanitized()).is_ok());
            prop_assert!(validate_remix_input(&remix.sanitized()).is_ok());
        }

        #[test]
        fn test_stored_meal_matches_input(input in meal_input()) {
            let input = input.sanitized();
            let meal = block_on(async {
                Gateway::new(MemoryStore::new()).create_meal(&input).await.unwrap()
            });

            prop_assert_eq!(&meal.title, &input.title);
            prop_assert_eq!(&meal.ingredients, &input.ingredients);
            prop_assert_eq!(meal.estimated_cost, input.estimated_cost);
            prop_assert_eq!(meal.struggle_score, input.resolved_struggle_score());
            prop_assert_eq!(meal.verifications, input.verifications.unwrap_or(0));
            prop_assert!(meal.struggle_score <= MAX_STRUGGLE_SCORE);
        }

        #[test]
        fn test_meal_mutations_never_reach_remix_keys(
            mutation in meal_mutation(),
            key in cache_key(),
        ) {
            let set = invalidation_set(&mutation);
            if matches!(key, CacheKey::RemixesForMeal(_) | CacheKey::Remix(_) | CacheKey::LatestRemixes { .. }) {
                prop_assert!(!set.contains(&key));
            }
        }

        #[test]
        fn test_remix_mutations_cover_all_meal_lists(
            mutation in remix_mutation(),
            limit in 1usize..=10,
        ) {
            let set = invalidation_set(&mutation);
            prop_assert!(set.contains(&CacheKey::Meals));
            let recent_key = CacheKey::RecentMeals { limit };
            let remixes_key = CacheKey::LatestRemixes { limit };
            prop_assert!(set.contains(&recent_key));
            prop_assert!(set.contains(&remixes_key));
        }
    }
}
