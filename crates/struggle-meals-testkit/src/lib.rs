//! # Struggle Meals Testkit
//!
//! Testing utilities for Struggle Meals.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a seeded in-memory store with a sync core on top
//! - **Faults**: store wrappers that fail or hold back chosen requests
//! - **Generators**: Proptest strategies for inputs and store values
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use struggle_meals_testkit::fixtures::{meal_input, TestFixture};
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     let meal = fixture.insert_meal("m1", &meal_input("Toast", 40)).await;
//!     assert_eq!(meal.struggle_score, 40);
//! }
//! ```
//!
//! ## Fault Injection
//!
//! [`FaultyStore`] fails the operations it is told to fail;
//! [`GatedStore`] applies writes at once but holds their responses until
//! released, so tests can choose the order replies arrive in.
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use struggle_meals_core::validate_meal_input;
//! use struggle_meals_testkit::generators::meal_input;
//!
//! proptest! {
//!     #[test]
//!     fn sanitized_inputs_stay_valid(input in meal_input()) {
//!         prop_assert!(validate_meal_input(&input.sanitized()).is_ok());
//!     }
//! }
//! ```

pub mod faults;
pub mod fixtures;
pub mod generators;

pub use faults::{FaultyStore, GatedStore, Operation};
pub use fixtures::TestFixture;
