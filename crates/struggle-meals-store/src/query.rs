//! Row-oriented request vocabulary: tables, columns, filters, ordering.

use std::cmp::Ordering;
use std::fmt;

/// Tables of the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Meals,
    Remixes,
}

impl Table {
    pub const fn as_str(self) -> &'static str {
        match self {
            Table::Meals => "meals",
            Table::Remixes => "remixes",
        }
    }

    /// Every column of the table, in schema order.
    pub fn columns(self) -> &'static [Column] {
        use Column::*;
        match self {
            Table::Meals => &[
                Id,
                Title,
                Description,
                ImageUrl,
                Ingredients,
                Tools,
                Steps,
                TimeInMinutes,
                EstimatedCost,
                StruggleScore,
                Verifications,
                Remixes,
                IsVerified,
                AuthorName,
                AuthorHandle,
                AuthorAvatar,
                CreatedAt,
            ],
            Table::Remixes => &[
                Id,
                ParentMealId,
                Title,
                Description,
                ImageUrl,
                Ingredients,
                Tools,
                Steps,
                TimeInMinutes,
                EstimatedCost,
                StruggleScore,
                AuthorName,
                AuthorHandle,
                AuthorAvatar,
                CreatedAt,
            ],
        }
    }

    pub fn has_column(self, column: Column) -> bool {
        self.columns().contains(&column)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns across both tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    ParentMealId,
    Title,
    Description,
    ImageUrl,
    Ingredients,
    Tools,
    Steps,
    TimeInMinutes,
    EstimatedCost,
    StruggleScore,
    Verifications,
    Remixes,
    IsVerified,
    AuthorName,
    AuthorHandle,
    AuthorAvatar,
    CreatedAt,
}

impl Column {
    pub const fn as_str(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::ParentMealId => "parent_meal_id",
            Column::Title => "title",
            Column::Description => "description",
            Column::ImageUrl => "image_url",
            Column::Ingredients => "ingredients",
            Column::Tools => "tools",
            Column::Steps => "steps",
            Column::TimeInMinutes => "time_in_minutes",
            Column::EstimatedCost => "estimated_cost",
            Column::StruggleScore => "struggle_score",
            Column::Verifications => "verifications",
            Column::Remixes => "remixes",
            Column::IsVerified => "is_verified",
            Column::AuthorName => "author_name",
            Column::AuthorHandle => "author_handle",
            Column::AuthorAvatar => "author_avatar",
            Column::CreatedAt => "created_at",
        }
    }

    /// Columns holding ordered string lists.
    pub const fn is_list(self) -> bool {
        matches!(self, Column::Ingredients | Column::Tools | Column::Steps)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single column value as the store sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Real(f64),
    Bool(bool),
    TextList(Vec<String>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Ordering used by `ORDER BY`. Nulls sort lowest; numbers compare across
    /// integer and real.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Integer(a), Value::Real(b)) => (*a as f64).total_cmp(b),
            (Value::Real(a), Value::Integer(b)) => a.total_cmp(&(*b as f64)),
            (Value::Real(a), Value::Real(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::TextList(a), Value::TextList(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::TextList(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A row filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(Column, Value),
    IsNull(Column),
    NotNull(Column),
}

impl Filter {
    pub fn eq(column: Column, value: impl Into<Value>) -> Self {
        Filter::Eq(column, value.into())
    }

    pub fn column(&self) -> Column {
        match self {
            Filter::Eq(c, _) | Filter::IsNull(c) | Filter::NotNull(c) => *c,
        }
    }

    /// Evaluate against a column value.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Filter::Eq(_, expected) => !value.is_null() && value == expected,
            Filter::IsNull(_) => value.is_null(),
            Filter::NotNull(_) => !value.is_null(),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// `ORDER BY` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: Column,
    pub direction: Direction,
}

/// A read request against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: Table,
    pub filters: Vec<Filter>,
    pub order: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Select {
    pub fn from(table: Table) -> Self {
        Self {
            table,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, column: Column, direction: Direction) -> Self {
        self.order = Some(OrderBy { column, direction });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Column assignments for an insert or update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values(Vec<(Column, Value)>);

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a column, replacing any earlier assignment of it.
    pub fn set(mut self, column: Column, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self.0.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.0.push((column, value)),
        }
        self
    }

    pub fn get(&self, column: Column) -> Option<&Value> {
        self.0.iter().find(|(c, _)| *c == column).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Column, Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_set_replaces() {
        let values = Values::new()
            .set(Column::Title, "first")
            .set(Column::Title, "second");
        assert_eq!(values.iter().count(), 1);
        assert_eq!(values.get(Column::Title), Some(&Value::from("second")));
    }

    #[test]
    fn test_filter_eq_never_matches_null() {
        let filter = Filter::eq(Column::ParentMealId, "m1");
        assert!(!filter.matches(&Value::Null));
        assert!(filter.matches(&Value::from("m1")));
        assert!(Filter::IsNull(Column::ParentMealId).matches(&Value::Null));
    }

    #[test]
    fn test_nulls_sort_lowest() {
        assert_eq!(Value::Null.compare(&Value::Integer(0)), Ordering::Less);
        assert_eq!(Value::Integer(90).compare(&Value::Integer(10)), Ordering::Greater);
    }

    #[test]
    fn test_remix_table_has_no_counters() {
        assert!(!Table::Remixes.has_column(Column::Verifications));
        assert!(Table::Remixes.has_column(Column::ParentMealId));
        assert!(!Table::Meals.has_column(Column::ParentMealId));
    }
}
