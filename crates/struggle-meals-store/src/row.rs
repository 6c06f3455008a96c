//! Row representation of the two tables.
//!
//! Rows mirror the remote schema: every column except `id`, `title` and
//! `created_at` is nullable. Turning rows into domain objects happens in
//! [`crate::mapping`].

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::query::{Column, Table, Value, Values};

/// A row of the `meals` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub tools: Option<Vec<String>>,
    pub steps: Option<Vec<String>>,
    pub time_in_minutes: Option<i64>,
    pub estimated_cost: Option<f64>,
    pub struggle_score: Option<i64>,
    pub verifications: Option<i64>,
    pub remixes: Option<i64>,
    pub is_verified: Option<bool>,
    pub author_name: Option<String>,
    pub author_handle: Option<String>,
    pub author_avatar: Option<String>,
    pub created_at: i64,
}

/// A row of the `remixes` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemixRow {
    pub id: String,
    pub parent_meal_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub tools: Option<Vec<String>>,
    pub steps: Option<Vec<String>>,
    pub time_in_minutes: Option<i64>,
    pub estimated_cost: Option<f64>,
    pub struggle_score: Option<i64>,
    pub author_name: Option<String>,
    pub author_handle: Option<String>,
    pub author_avatar: Option<String>,
    pub created_at: i64,
}

/// A row of either table.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Meal(MealRow),
    Remix(RemixRow),
}

impl Row {
    /// A blank row for `table` with only its key columns set.
    pub fn empty(table: Table, id: String, created_at: i64) -> Self {
        match table {
            Table::Meals => Row::Meal(MealRow {
                id,
                created_at,
                ..MealRow::default()
            }),
            Table::Remixes => Row::Remix(RemixRow {
                id,
                created_at,
                ..RemixRow::default()
            }),
        }
    }

    pub fn table(&self) -> Table {
        match self {
            Row::Meal(_) => Table::Meals,
            Row::Remix(_) => Table::Remixes,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Row::Meal(r) => &r.id,
            Row::Remix(r) => &r.id,
        }
    }

    pub fn into_meal(self) -> Result<MealRow> {
        match self {
            Row::Meal(r) => Ok(r),
            other => Err(StoreError::TableMismatch {
                expected: Table::Meals,
                actual: other.table(),
            }),
        }
    }

    pub fn into_remix(self) -> Result<RemixRow> {
        match self {
            Row::Remix(r) => Ok(r),
            other => Err(StoreError::TableMismatch {
                expected: Table::Remixes,
                actual: other.table(),
            }),
        }
    }

    /// Read a column. Columns absent from the table read as null.
    pub fn get(&self, column: Column) -> Value {
        match self {
            Row::Meal(r) => match column {
                Column::Id => r.id.clone().into(),
                Column::Title => r.title.clone().into(),
                Column::Description => r.description.clone().into(),
                Column::ImageUrl => r.image_url.clone().into(),
                Column::Ingredients => r.ingredients.clone().into(),
                Column::Tools => r.tools.clone().into(),
                Column::Steps => r.steps.clone().into(),
                Column::TimeInMinutes => r.time_in_minutes.into(),
                Column::EstimatedCost => r.estimated_cost.into(),
                Column::StruggleScore => r.struggle_score.into(),
                Column::Verifications => r.verifications.into(),
                Column::Remixes => r.remixes.into(),
                Column::IsVerified => r.is_verified.into(),
                Column::AuthorName => r.author_name.clone().into(),
                Column::AuthorHandle => r.author_handle.clone().into(),
                Column::AuthorAvatar => r.author_avatar.clone().into(),
                Column::CreatedAt => r.created_at.into(),
                Column::ParentMealId => Value::Null,
            },
            Row::Remix(r) => match column {
                Column::Id => r.id.clone().into(),
                Column::ParentMealId => r.parent_meal_id.clone().into(),
                Column::Title => r.title.clone().into(),
                Column::Description => r.description.clone().into(),
                Column::ImageUrl => r.image_url.clone().into(),
                Column::Ingredients => r.ingredients.clone().into(),
                Column::Tools => r.tools.clone().into(),
                Column::Steps => r.steps.clone().into(),
                Column::TimeInMinutes => r.time_in_minutes.into(),
                Column::EstimatedCost => r.estimated_cost.into(),
                Column::StruggleScore => r.struggle_score.into(),
                Column::AuthorName => r.author_name.clone().into(),
                Column::AuthorHandle => r.author_handle.clone().into(),
                Column::AuthorAvatar => r.author_avatar.clone().into(),
                Column::CreatedAt => r.created_at.into(),
                Column::Verifications | Column::Remixes | Column::IsVerified => Value::Null,
            },
        }
    }

    /// Write a column, checking that it exists and that the value fits.
    pub fn set(&mut self, column: Column, value: Value) -> Result<()> {
        let table = self.table();

        match self {
            Row::Meal(r) => match column {
                Column::Id => r.id = required_text(column, value)?,
                Column::Title => r.title = required_text(column, value)?,
                Column::Description => r.description = text(column, value)?,
                Column::ImageUrl => r.image_url = text(column, value)?,
                Column::Ingredients => r.ingredients = list(column, value)?,
                Column::Tools => r.tools = list(column, value)?,
                Column::Steps => r.steps = list(column, value)?,
                Column::TimeInMinutes => r.time_in_minutes = integer(column, value)?,
                Column::EstimatedCost => r.estimated_cost = real(column, value)?,
                Column::StruggleScore => r.struggle_score = integer(column, value)?,
                Column::Verifications => r.verifications = integer(column, value)?,
                Column::Remixes => r.remixes = integer(column, value)?,
                Column::IsVerified => r.is_verified = boolean(column, value)?,
                Column::AuthorName => r.author_name = text(column, value)?,
                Column::AuthorHandle => r.author_handle = text(column, value)?,
                Column::AuthorAvatar => r.author_avatar = text(column, value)?,
                Column::CreatedAt => r.created_at = required_integer(column, value)?,
                Column::ParentMealId => return Err(StoreError::UnknownColumn { table, column }),
            },
            Row::Remix(r) => match column {
                Column::Id => r.id = required_text(column, value)?,
                Column::ParentMealId => r.parent_meal_id = text(column, value)?,
                Column::Title => r.title = required_text(column, value)?,
                Column::Description => r.description = text(column, value)?,
                Column::ImageUrl => r.image_url = text(column, value)?,
                Column::Ingredients => r.ingredients = list(column, value)?,
                Column::Tools => r.tools = list(column, value)?,
                Column::Steps => r.steps = list(column, value)?,
                Column::TimeInMinutes => r.time_in_minutes = integer(column, value)?,
                Column::EstimatedCost => r.estimated_cost = real(column, value)?,
                Column::StruggleScore => r.struggle_score = integer(column, value)?,
                Column::AuthorName => r.author_name = text(column, value)?,
                Column::AuthorHandle => r.author_handle = text(column, value)?,
                Column::AuthorAvatar => r.author_avatar = text(column, value)?,
                Column::CreatedAt => r.created_at = required_integer(column, value)?,
                Column::Verifications | Column::Remixes | Column::IsVerified => {
                    return Err(StoreError::UnknownColumn { table, column })
                }
            },
        }
        Ok(())
    }

    /// Apply every assignment in `values`.
    pub fn apply(&mut self, values: &Values) -> Result<()> {
        for (column, value) in values.iter() {
            self.set(*column, value.clone())?;
        }
        Ok(())
    }
}

fn mismatch(column: Column, expected: &'static str) -> StoreError {
    StoreError::TypeMismatch { column, expected }
}

fn text(column: Column, value: Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::Text(s) => Ok(Some(s)),
        _ => Err(mismatch(column, "text")),
    }
}

fn required_text(column: Column, value: Value) -> Result<String> {
    text(column, value)?.ok_or_else(|| mismatch(column, "non-null text"))
}

fn list(column: Column, value: Value) -> Result<Option<Vec<String>>> {
    match value {
        Value::Null => Ok(None),
        Value::TextList(items) => Ok(Some(items)),
        _ => Err(mismatch(column, "text list")),
    }
}

fn integer(column: Column, value: Value) -> Result<Option<i64>> {
    match value {
        Value::Null => Ok(None),
        Value::Integer(n) => Ok(Some(n)),
        _ => Err(mismatch(column, "integer")),
    }
}

fn required_integer(column: Column, value: Value) -> Result<i64> {
    integer(column, value)?.ok_or_else(|| mismatch(column, "non-null integer"))
}

fn real(column: Column, value: Value) -> Result<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Real(n) => Ok(Some(n)),
        Value::Integer(n) => Ok(Some(n as f64)),
        _ => Err(mismatch(column, "number")),
    }
}

fn boolean(column: Column, value: Value) -> Result<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b)),
        _ => Err(mismatch(column, "boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_round_trip() {
        let mut row = Row::empty(Table::Meals, "m1".into(), 10);
        row.set(Column::Title, "Cereal Fried Rice".into()).unwrap();
        row.set(Column::Verifications, 3u32.into()).unwrap();
        assert_eq!(row.get(Column::Title), Value::from("Cereal Fried Rice"));
        assert_eq!(row.get(Column::Verifications), Value::Integer(3));
        assert_eq!(row.get(Column::Remixes), Value::Null);
    }

    #[test]
    fn test_unknown_column_rejected() {
        let mut row = Row::empty(Table::Remixes, "r1".into(), 10);
        let err = row.set(Column::IsVerified, true.into()).unwrap_err();
        assert!(matches!(err, StoreError::UnknownColumn { .. }));
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let mut row = Row::empty(Table::Meals, "m1".into(), 10);
        let err = row.set(Column::TimeInMinutes, "soon".into()).unwrap_err();
        assert!(matches!(err, StoreError::TypeMismatch { .. }));
    }

    #[test]
    fn test_integer_accepted_for_cost() {
        let mut row = Row::empty(Table::Meals, "m1".into(), 10);
        row.set(Column::EstimatedCost, Value::Integer(2)).unwrap();
        assert_eq!(row.into_meal().unwrap().estimated_cost, Some(2.0));
    }

    #[test]
    fn test_into_wrong_table() {
        let row = Row::empty(Table::Remixes, "r1".into(), 10);
        assert!(matches!(
            row.into_meal(),
            Err(StoreError::TableMismatch { .. })
        ));
    }
}
