//! Submission payloads for creating and editing meals and remixes.

use serde::{Deserialize, Serialize};

use crate::meal::{Author, Meal, Remix};
use crate::score::struggle_score;
use crate::types::MealId;

/// Time a derived remix starts with when the parent has none.
const DEFAULT_REMIX_MINUTES: u32 = 5;

/// Cost a derived remix starts with when the parent has none.
const DEFAULT_REMIX_COST: f64 = 2.0;

/// Fields for creating or replacing a meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    pub time_in_minutes: u32,
    pub estimated_cost: f64,
    #[serde(default)]
    pub struggle_score: Option<u32>,
    pub author: Author,
    #[serde(default)]
    pub verifications: Option<u32>,
    #[serde(default)]
    pub remixes: Option<u32>,
    #[serde(default)]
    pub is_verified: Option<bool>,
}

impl MealInput {
    /// Minimal input; lists empty, no image, no explicit score.
    pub fn new(title: impl Into<String>, author: Author) -> Self {
        Self {
            title: title.into(),
            description: None,
            image: None,
            ingredients: Vec::new(),
            tools: Vec::new(),
            steps: Vec::new(),
            time_in_minutes: 0,
            estimated_cost: 0.0,
            struggle_score: None,
            author,
            verifications: None,
            remixes: None,
            is_verified: None,
        }
    }

    /// The explicit score, or the heuristic when none was supplied.
    pub fn resolved_struggle_score(&self) -> u32 {
        self.struggle_score
            .unwrap_or_else(|| struggle_score(self.time_in_minutes, &self.ingredients))
    }

    /// Trim the title and drop blank list entries.
    pub fn sanitized(mut self) -> Self {
        self.title = self.title.trim().to_owned();
        self.ingredients = sanitize_list(self.ingredients);
        self.tools = sanitize_list(self.tools);
        self.steps = sanitize_list(self.steps);
        self
    }
}

/// Fields for creating or replacing a remix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemixInput {
    #[serde(default)]
    pub parent_meal_id: Option<MealId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    pub time_in_minutes: u32,
    pub estimated_cost: f64,
    #[serde(default)]
    pub struggle_score: Option<u32>,
    pub author: Author,
}

impl RemixInput {
    /// An original remix with no parent.
    pub fn new(title: impl Into<String>, author: Author) -> Self {
        Self {
            parent_meal_id: None,
            title: title.into(),
            description: None,
            image: None,
            ingredients: Vec::new(),
            tools: Vec::new(),
            steps: Vec::new(),
            time_in_minutes: DEFAULT_REMIX_MINUTES,
            estimated_cost: DEFAULT_REMIX_COST,
            struggle_score: None,
            author,
        }
    }

    /// Start a remix from a parent meal's values.
    pub fn from_meal(meal: &Meal, author: Author) -> Self {
        Self {
            parent_meal_id: Some(meal.id.clone()),
            title: format!("{} (Remix)", meal.title),
            description: None,
            image: Some(meal.image.clone()),
            ingredients: meal.ingredients.clone(),
            tools: meal.tools.clone(),
            steps: meal.steps.clone(),
            time_in_minutes: if meal.time_in_minutes == 0 {
                DEFAULT_REMIX_MINUTES
            } else {
                meal.time_in_minutes
            },
            estimated_cost: if meal.estimated_cost == 0.0 {
                DEFAULT_REMIX_COST
            } else {
                meal.estimated_cost
            },
            struggle_score: None,
            author,
        }
    }

    /// Prefill an edit of an existing remix.
    ///
    /// The score is left unset so an edit recomputes it from the new values.
    pub fn from_remix(remix: &Remix) -> Self {
        Self {
            parent_meal_id: remix.parent_meal_id.clone(),
            title: remix.title.clone(),
            description: remix.description.clone(),
            image: Some(remix.image.clone()),
            ingredients: remix.ingredients.clone(),
            tools: remix.tools.clone(),
            steps: remix.steps.clone(),
            time_in_minutes: remix.time_in_minutes,
            estimated_cost: remix.estimated_cost,
            struggle_score: None,
            author: remix.author.clone(),
        }
    }

    /// The explicit score, or the heuristic when none was supplied.
    pub fn resolved_struggle_score(&self) -> u32 {
        self.struggle_score
            .unwrap_or_else(|| struggle_score(self.time_in_minutes, &self.ingredients))
    }

    /// Trim the title and drop blank list entries.
    pub fn sanitized(mut self) -> Self {
        self.title = self.title.trim().to_owned();
        self.ingredients = sanitize_list(self.ingredients);
        self.tools = sanitize_list(self.tools);
        self.steps = sanitize_list(self.steps);
        self
    }
}

fn sanitize_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}
