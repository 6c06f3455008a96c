//! Struggle score heuristic.
//!
//! `score = clamp(0, 100, round(time_in_minutes + 5 * non_empty_ingredients))`
//!
//! The score is an advisory default: it is filled in when a submission does
//! not carry one and is never recomputed afterwards.

/// Upper bound of the struggle scale.
pub const MAX_STRUGGLE_SCORE: u32 = 100;

/// Weight of each non-empty ingredient.
pub const INGREDIENT_WEIGHT: u64 = 5;

/// Compute the default struggle score for a recipe.
///
/// Blank ingredient entries (empty or whitespace-only) do not count.
pub fn struggle_score<S: AsRef<str>>(time_in_minutes: u32, ingredients: &[S]) -> u32 {
    let counted = ingredients
        .iter()
        .filter(|i| !i.as_ref().trim().is_empty())
        .count() as u64;
    let raw = u64::from(time_in_minutes) + INGREDIENT_WEIGHT * counted;
    raw.min(u64::from(MAX_STRUGGLE_SCORE)) as u32
}
