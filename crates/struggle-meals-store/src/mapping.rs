//! Translation between store rows and domain objects.
//!
//! Reading is total: every nullable column has a default, so any row maps
//! to a well-formed [`Meal`] or [`Remix`]. Writing turns inputs into column
//! assignments, filling the struggle score when the input has none.

use struggle_meals_core::{
    Author, Meal, MealId, MealInput, Remix, RemixId, RemixInput, VerificationUpdate,
};

use crate::gateway::GatewayConfig;
use crate::query::{Column, Value, Values};
use crate::row::{MealRow, RemixRow};

fn count(value: Option<i64>) -> u32 {
    u32::try_from(value.unwrap_or(0).max(0)).unwrap_or(u32::MAX)
}

fn author(
    name: Option<String>,
    handle: Option<String>,
    avatar: Option<String>,
    unknown_name: &str,
    config: &GatewayConfig,
) -> Author {
    Author {
        name: name.unwrap_or_else(|| unknown_name.to_owned()),
        handle: handle.unwrap_or_else(|| config.unknown_handle.clone()),
        avatar: Some(avatar.unwrap_or_else(|| config.fallback_avatar.clone())),
    }
}

/// Map a meals row to a [`Meal`].
pub fn meal_from_row(row: MealRow, config: &GatewayConfig) -> Meal {
    Meal {
        id: MealId::new(row.id),
        title: row.title,
        description: row.description,
        image: row
            .image_url
            .unwrap_or_else(|| config.fallback_image.clone()),
        ingredients: row.ingredients.unwrap_or_default(),
        tools: row.tools.unwrap_or_default(),
        steps: row.steps.unwrap_or_default(),
        time_in_minutes: count(row.time_in_minutes),
        estimated_cost: row.estimated_cost.unwrap_or(0.0),
        struggle_score: count(row.struggle_score),
        verifications: count(row.verifications),
        remixes: count(row.remixes),
        is_verified: row.is_verified.unwrap_or(false),
        author: author(
            row.author_name,
            row.author_handle,
            row.author_avatar,
            &config.unknown_meal_author,
            config,
        ),
        created_at: row.created_at,
    }
}

/// Map a remixes row to a [`Remix`].
pub fn remix_from_row(row: RemixRow, config: &GatewayConfig) -> Remix {
    Remix {
        id: RemixId::new(row.id),
        parent_meal_id: row.parent_meal_id.map(MealId::new),
        title: row.title,
        description: row.description,
        image: row
            .image_url
            .unwrap_or_else(|| config.fallback_image.clone()),
        ingredients: row.ingredients.unwrap_or_default(),
        tools: row.tools.unwrap_or_default(),
        steps: row.steps.unwrap_or_default(),
        time_in_minutes: count(row.time_in_minutes),
        estimated_cost: row.estimated_cost.unwrap_or(0.0),
        struggle_score: count(row.struggle_score),
        author: author(
            row.author_name,
            row.author_handle,
            row.author_avatar,
            &config.unknown_remix_author,
            config,
        ),
        created_at: row.created_at,
    }
}

// Columns shared by meal inserts and updates.
fn meal_content(input: &MealInput) -> Values {
    Values::new()
        .set(Column::Title, input.title.as_str())
        .set(Column::Description, input.description.clone())
        .set(Column::ImageUrl, input.image.clone())
        .set(Column::Ingredients, input.ingredients.clone())
        .set(Column::Tools, input.tools.clone())
        .set(Column::Steps, input.steps.clone())
        .set(Column::TimeInMinutes, input.time_in_minutes)
        .set(Column::EstimatedCost, input.estimated_cost)
        .set(Column::StruggleScore, input.resolved_struggle_score())
        .set(Column::AuthorName, input.author.name.as_str())
        .set(Column::AuthorHandle, input.author.handle.as_str())
        .set(Column::AuthorAvatar, input.author.avatar.clone())
}

/// Assignments for inserting a new meal.
///
/// Counters are written only when the input carries them.
pub fn new_meal_values(input: &MealInput) -> Values {
    let mut values = meal_content(input);
    if let Some(n) = input.verifications {
        values = values.set(Column::Verifications, n);
    }
    if let Some(n) = input.remixes {
        values = values.set(Column::Remixes, n);
    }
    if let Some(b) = input.is_verified {
        values = values.set(Column::IsVerified, b);
    }
    values
}

/// Assignments for editing a meal. Counters are never overwritten.
pub fn meal_update_values(input: &MealInput) -> Values {
    meal_content(input)
}

/// Assignments for inserting or replacing a remix.
pub fn remix_values(input: &RemixInput) -> Values {
    Values::new()
        .set(
            Column::ParentMealId,
            input.parent_meal_id.as_ref().map(|id| id.as_str()),
        )
        .set(Column::Title, input.title.as_str())
        .set(Column::Description, input.description.clone())
        .set(Column::ImageUrl, input.image.clone())
        .set(Column::Ingredients, input.ingredients.clone())
        .set(Column::Tools, input.tools.clone())
        .set(Column::Steps, input.steps.clone())
        .set(Column::TimeInMinutes, input.time_in_minutes)
        .set(Column::EstimatedCost, input.estimated_cost)
        .set(Column::StruggleScore, input.resolved_struggle_score())
        .set(Column::AuthorName, input.author.name.as_str())
        .set(Column::AuthorHandle, input.author.handle.as_str())
        .set(Column::AuthorAvatar, input.author.avatar.clone())
}

/// Assignments for a verification toggle; touches only the two fields.
pub fn verification_values(update: VerificationUpdate) -> Values {
    Values::new()
        .set(Column::IsVerified, Value::Bool(update.is_verified))
        .set(Column::Verifications, update.verifications)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_meal_row_gets_defaults() {
        let config = GatewayConfig::default();
        let meal = meal_from_row(
            MealRow {
                id: "m1".into(),
                title: "Mystery".into(),
                created_at: 5,
                ..MealRow::default()
            },
            &config,
        );

        assert_eq!(meal.image, config.fallback_image);
        assert!(meal.ingredients.is_empty());
        assert_eq!(meal.verifications, 0);
        assert!(!meal.is_verified);
        assert_eq!(meal.author.name, "unknown_chef");
        assert_eq!(meal.author.handle, "unknown");
        assert_eq!(meal.author.avatar.as_deref(), Some(config.fallback_avatar.as_str()));
    }

    #[test]
    fn test_empty_remix_row_gets_remix_author() {
        let remix = remix_from_row(
            RemixRow {
                id: "r1".into(),
                title: "Orphan".into(),
                ..RemixRow::default()
            },
            &GatewayConfig::default(),
        );
        assert_eq!(remix.author.name, "remix_unknown");
        assert_eq!(remix.parent_meal_id, None);
    }

    #[test]
    fn test_negative_counters_clamp_to_zero() {
        let meal = meal_from_row(
            MealRow {
                verifications: Some(-4),
                remixes: Some(i64::MAX),
                ..MealRow::default()
            },
            &GatewayConfig::default(),
        );
        assert_eq!(meal.verifications, 0);
        assert_eq!(meal.remixes, u32::MAX);
    }

    #[test]
    fn test_update_values_leave_counters_alone() {
        let mut input = MealInput::new("Toast", Author::new("a", "a"));
        input.verifications = Some(9);
        input.is_verified = Some(true);

        let values = meal_update_values(&input);
        assert!(values.get(Column::Verifications).is_none());
        assert!(values.get(Column::IsVerified).is_none());

        let values = new_meal_values(&input);
        assert_eq!(values.get(Column::Verifications), Some(&Value::Integer(9)));
    }

    #[test]
    fn test_score_filled_when_absent() {
        let mut input = RemixInput::new("Remix", Author::default_remixer());
        input.time_in_minutes = 8;
        input.ingredients = vec!["a".into(), "b".into(), " ".into(), "c".into()];
        let values = remix_values(&input);
        assert_eq!(values.get(Column::StruggleScore), Some(&Value::Integer(23)));
        assert_eq!(values.get(Column::ParentMealId), Some(&Value::Null));
    }

    fn arb_meal_row() -> impl Strategy<Value = MealRow> {
        (
            any::<Option<i64>>(),
            any::<Option<i64>>(),
            any::<Option<bool>>(),
            proptest::option::of(proptest::collection::vec(".{0,8}", 0..4)),
            proptest::option::of("[a-z]{0,8}"),
        )
            .prop_map(|(score, verifications, verified, ingredients, name)| MealRow {
                id: "m".into(),
                title: "t".into(),
                struggle_score: score,
                verifications,
                is_verified: verified,
                ingredients,
                author_name: name,
                ..MealRow::default()
            })
    }

    proptest! {
        #[test]
        fn prop_meal_mapping_is_total(row in arb_meal_row()) {
            let config = GatewayConfig::default();
            let meal = meal_from_row(row.clone(), &config);
            prop_assert_eq!(meal.ingredients, row.ingredients.unwrap_or_default());
            prop_assert_eq!(meal.is_verified, row.is_verified.unwrap_or(false));
            prop_assert!(meal.author.avatar.is_some());
            if row.verifications.unwrap_or(0) <= 0 {
                prop_assert_eq!(meal.verifications, 0);
            }
        }
    }
}
