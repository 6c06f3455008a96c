//! # Struggle Meals Core
//!
//! Pure domain types for Struggle Meals: meals, remixes, submissions, and
//! the small amount of arithmetic the leaderboard relies on.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`Meal`] - A top-level recipe ranked on the leaderboard
//! - [`Remix`] - A derivative recipe weakly tied to a parent meal
//! - [`MealInput`] / [`RemixInput`] - Submission payloads
//! - [`VerificationUpdate`] - The pair written by a verify toggle
//!
//! ## Heuristics
//!
//! [`struggle_score`] fills a default score for submissions that carry none;
//! [`next_verification`] derives the counter a verify/unverify toggle writes.

pub mod error;
pub mod input;
pub mod meal;
pub mod score;
pub mod types;
pub mod validation;
pub mod verification;

pub use error::ValidationError;
pub use input::{MealInput, RemixInput};
pub use meal::{Author, Meal, Remix, VerificationUpdate, FALLBACK_AVATAR_URI, FALLBACK_IMAGE_URI};
pub use score::{struggle_score, MAX_STRUGGLE_SCORE};
pub use types::{now_millis, MealId, RemixId, Timestamp};
pub use validation::{validate_meal_input, validate_remix_input};
pub use verification::next_verification;
