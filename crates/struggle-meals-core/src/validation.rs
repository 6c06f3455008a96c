//! Submission validation.
//!
//! Runs on sanitized inputs, before any network call.

use crate::error::ValidationError;
use crate::input::{MealInput, RemixInput};
use crate::meal::Author;
use crate::score::MAX_STRUGGLE_SCORE;

/// Validate a meal submission.
pub fn validate_meal_input(input: &MealInput) -> Result<(), ValidationError> {
    validate_common(
        &input.title,
        input.estimated_cost,
        input.struggle_score,
        &input.author,
    )
}

/// Validate a remix submission.
pub fn validate_remix_input(input: &RemixInput) -> Result<(), ValidationError> {
    validate_common(
        &input.title,
        input.estimated_cost,
        input.struggle_score,
        &input.author,
    )
}

fn validate_common(
    title: &str,
    estimated_cost: f64,
    struggle_score: Option<u32>,
    author: &Author,
) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    if !estimated_cost.is_finite() || estimated_cost < 0.0 {
        return Err(ValidationError::InvalidCost(estimated_cost));
    }

    if let Some(score) = struggle_score {
        if score > MAX_STRUGGLE_SCORE {
            return Err(ValidationError::ScoreOutOfRange(score));
        }
    }

    if author.name.trim().is_empty() {
        return Err(ValidationError::EmptyAuthor("name"));
    }
    if author.handle.trim().is_empty() {
        return Err(ValidationError::EmptyAuthor("handle"));
    }

    Ok(())
}
