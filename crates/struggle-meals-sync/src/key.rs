//! Cache keys: one per query the application issues.

use std::fmt;

use struggle_meals_core::{MealId, RemixId};

/// Identity of a cached query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The leaderboard.
    Meals,
    /// The newest meals.
    RecentMeals { limit: usize },
    Meal(MealId),
    RemixesForMeal(MealId),
    Remix(RemixId),
    /// The newest remixes across all meals.
    LatestRemixes { limit: usize },
}

impl CacheKey {
    /// Keys whose value is a list of meals.
    pub fn is_meal_list(&self) -> bool {
        matches!(self, CacheKey::Meals | CacheKey::RecentMeals { .. })
    }

    /// Keys whose value is a list of remixes.
    pub fn is_remix_list(&self) -> bool {
        matches!(
            self,
            CacheKey::RemixesForMeal(_) | CacheKey::LatestRemixes { .. }
        )
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Meals => write!(f, "meals"),
            CacheKey::RecentMeals { limit } => write!(f, "meals/recent/{}", limit),
            CacheKey::Meal(id) => write!(f, "meal/{}", id),
            CacheKey::RemixesForMeal(id) => write!(f, "meal/{}/remixes", id),
            CacheKey::Remix(id) => write!(f, "remix/{}", id),
            CacheKey::LatestRemixes { limit } => write!(f, "remixes/latest/{}", limit),
        }
    }
}
