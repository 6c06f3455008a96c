//! Meals and remixes: the two entities of the leaderboard.

use serde::{Deserialize, Serialize};

use crate::types::{MealId, RemixId, Timestamp};

/// Placeholder image shown for entries without one.
pub const FALLBACK_IMAGE_URI: &str =
    "https://images.unsplash.com/photo-1504674900247-0877df9cc836?w=800&q=80";

/// Placeholder avatar for authors without one.
pub const FALLBACK_AVATAR_URI: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=Remix";

/// Who posted a meal or remix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub handle: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl Author {
    pub fn new(name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: handle.into(),
            avatar: None,
        }
    }

    /// Attach an avatar URI.
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// The identity a fresh remix form starts with.
    pub fn default_remixer() -> Self {
        Self::new("chaos_creator", "chaos_creator").with_avatar(FALLBACK_AVATAR_URI)
    }
}

/// A top-level recipe ranked on the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: MealId,
    pub title: String,
    pub description: Option<String>,
    pub image: String,
    pub ingredients: Vec<String>,
    pub tools: Vec<String>,
    pub steps: Vec<String>,
    pub time_in_minutes: u32,
    pub estimated_cost: f64,
    pub struggle_score: u32,
    pub verifications: u32,
    pub remixes: u32,
    pub is_verified: bool,
    pub author: Author,
    pub created_at: Timestamp,
}

impl Meal {
    /// Copy of this meal with the verification fields replaced.
    pub fn with_verification(&self, update: VerificationUpdate) -> Self {
        Self {
            is_verified: update.is_verified,
            verifications: update.verifications,
            ..self.clone()
        }
    }

    /// Current verification fields.
    pub fn verification(&self) -> VerificationUpdate {
        VerificationUpdate {
            is_verified: self.is_verified,
            verifications: self.verifications,
        }
    }
}

/// A derivative recipe, optionally tied to a parent meal.
///
/// The parent is a weak reference: it is never resolved eagerly and a
/// remix whose parent has disappeared is shown as an original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remix {
    pub id: RemixId,
    pub parent_meal_id: Option<MealId>,
    pub title: String,
    pub description: Option<String>,
    pub image: String,
    pub ingredients: Vec<String>,
    pub tools: Vec<String>,
    pub steps: Vec<String>,
    pub time_in_minutes: u32,
    pub estimated_cost: f64,
    pub struggle_score: u32,
    pub author: Author,
    pub created_at: Timestamp,
}

impl Remix {
    /// Whether this remix should be presented without a parent.
    ///
    /// `parent` is the caller's lookup result for `parent_meal_id`.
    pub fn is_original(&self, parent: Option<&Meal>) -> bool {
        match (&self.parent_meal_id, parent) {
            (None, _) | (Some(_), None) => true,
            (Some(id), Some(meal)) => &meal.id != id,
        }
    }
}

/// The verification pair written by a verify/unverify toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationUpdate {
    pub is_verified: bool,
    pub verifications: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_meal() -> Meal {
        Meal {
            id: MealId::new("meal-1"),
            title: "Microwave Ramen Pizza".into(),
            description: None,
            image: FALLBACK_IMAGE_URI.into(),
            ingredients: vec!["Instant Ramen".into(), "Ketchup".into()],
            tools: vec!["Microwave".into()],
            steps: vec!["Cook ramen".into()],
            time_in_minutes: 6,
            estimated_cost: 2.0,
            struggle_score: 88,
            verifications: 6,
            remixes: 5,
            is_verified: true,
            author: Author::new("dorm_gourmet", "dorm_gourmet"),
            created_at: 1_736_870_400_000,
        }
    }

    fn sample_remix(parent: Option<&str>) -> Remix {
        Remix {
            id: RemixId::new("remix-1"),
            parent_meal_id: parent.map(MealId::new),
            title: "Breakfast Ramen Pizza".into(),
            description: None,
            image: FALLBACK_IMAGE_URI.into(),
            ingredients: vec![],
            tools: vec![],
            steps: vec![],
            time_in_minutes: 7,
            estimated_cost: 2.5,
            struggle_score: 84,
            author: Author::default_remixer(),
            created_at: 1_736_870_400_000,
        }
    }

    #[test]
    fn test_with_verification_touches_only_verification_fields() {
        let meal = sample_meal();
        let updated = meal.with_verification(VerificationUpdate {
            is_verified: false,
            verifications: 2,
        });
        assert!(!updated.is_verified);
        assert_eq!(updated.verifications, 2);
        assert_eq!(updated.remixes, meal.remixes);
        assert_eq!(updated.title, meal.title);
    }

    #[test]
    fn test_orphaned_remix_is_original() {
        let meal = sample_meal();
        assert!(sample_remix(None).is_original(Some(&meal)));
        assert!(sample_remix(Some("meal-1")).is_original(None));
        assert!(sample_remix(Some("meal-9")).is_original(Some(&meal)));
        assert!(!sample_remix(Some("meal-1")).is_original(Some(&meal)));
    }

    #[test]
    fn test_meal_serializes_camel_case() {
        let json = serde_json::to_value(sample_meal()).unwrap();
        assert_eq!(json["timeInMinutes"], 6);
        assert_eq!(json["isVerified"], true);
        assert_eq!(json["author"]["handle"], "dorm_gourmet");
    }
}
