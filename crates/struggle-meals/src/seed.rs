//! Demo data for a fresh store.
//!
//! Five meals with fixed ids and three remixes hanging off them. Seeding
//! wipes both tables first.

use tracing::info;

use struggle_meals_core::{now_millis, Author, MealId, MealInput, RemixInput};
use struggle_meals_store::mapping::{new_meal_values, remix_values};
use struggle_meals_store::{Column, Filter, RemoteStore, Table};

use crate::error::Result;

/// Ids of the seeded meals, in seeding order.
pub const DEMO_MEAL_IDS: [&str; 5] = [
    "7f9a4caa-1111-4f9e-a111-111111111111",
    "7f9a4caa-2222-4f9e-a222-222222222222",
    "7f9a4caa-3333-4f9e-a333-333333333333",
    "7f9a4caa-4444-4f9e-a444-444444444444",
    "7f9a4caa-5555-4f9e-a555-555555555555",
];

const SEED_AGE_MILLIS: i64 = 60_000;

/// What a seeding run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub meals_removed: u64,
    pub remixes_removed: u64,
    pub meals_inserted: usize,
    pub remixes_inserted: usize,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

struct DemoMeal {
    title: &'static str,
    description: &'static str,
    image: &'static str,
    ingredients: &'static [&'static str],
    tools: &'static [&'static str],
    steps: &'static [&'static str],
    minutes: u32,
    cost: f64,
    score: u32,
    verifications: u32,
    remixes: u32,
    verified: bool,
    author: &'static str,
    avatar_seed: &'static str,
}

impl DemoMeal {
    fn input(&self) -> MealInput {
        MealInput {
            title: self.title.to_owned(),
            description: Some(self.description.to_owned()),
            image: Some(self.image.to_owned()),
            ingredients: strings(self.ingredients),
            tools: strings(self.tools),
            steps: strings(self.steps),
            time_in_minutes: self.minutes,
            estimated_cost: self.cost,
            struggle_score: Some(self.score),
            author: Author::new(self.author, self.author).with_avatar(avatar(self.avatar_seed)),
            verifications: Some(self.verifications),
            remixes: Some(self.remixes),
            is_verified: Some(self.verified),
        }
    }
}

struct DemoRemix {
    parent: usize,
    title: &'static str,
    description: &'static str,
    image: &'static str,
    ingredients: &'static [&'static str],
    tools: &'static [&'static str],
    steps: &'static [&'static str],
    minutes: u32,
    cost: f64,
    score: u32,
    author_name: &'static str,
    author_handle: &'static str,
    avatar_seed: &'static str,
}

impl DemoRemix {
    fn input(&self) -> RemixInput {
        RemixInput {
            parent_meal_id: Some(MealId::new(DEMO_MEAL_IDS[self.parent])),
            title: self.title.to_owned(),
            description: Some(self.description.to_owned()),
            image: Some(self.image.to_owned()),
            ingredients: strings(self.ingredients),
            tools: strings(self.tools),
            steps: strings(self.steps),
            time_in_minutes: self.minutes,
            estimated_cost: self.cost,
            struggle_score: Some(self.score),
            author: Author::new(self.author_name, self.author_handle)
                .with_avatar(avatar(self.avatar_seed)),
        }
    }
}

fn avatar(seed: &str) -> String {
    format!("https://api.dicebear.com/7.x/adventurer/svg?seed={}", seed)
}

fn unsplash(photo: &str) -> &'static str {
    match photo {
        "sushi" => "https://images.unsplash.com/photo-1553621042-f6e147245754?w=800&q=80&auto=format&fit=crop",
        "ramen" => "https://images.unsplash.com/photo-1506354666786-959d6d497f1a?w=800&q=80&auto=format&fit=crop",
        "pbj" => "https://images.unsplash.com/photo-1508739826987-b79cd8b7da12?w=800&q=80&auto=format&fit=crop",
        "cereal" => "https://images.unsplash.com/photo-1473093226795-af9932fe5856?w=800&q=80&auto=format&fit=crop",
        "waffle" => "https://images.unsplash.com/photo-1504384308090-c894fdcc538d?w=800&q=80&auto=format&fit=crop",
        "crunch" => "https://images.unsplash.com/photo-1562157873-818bc0726f68?w=800&q=80&auto=format&fit=crop",
        "breakfast" => "https://images.unsplash.com/photo-1466978913421-dad2ebd01d17?w=800&q=80&auto=format&fit=crop",
        _ => "https://images.unsplash.com/photo-1542827633-3b3c62b4b006?w=800&q=80&auto=format&fit=crop",
    }
}

fn demo_meals() -> [DemoMeal; 5] {
    [
        DemoMeal {
            title: "Hot Cheeto Sushi Burrito",
            description: "Crushed Hot Cheetos replace tempura flakes. Microwave-only madness.",
            image: unsplash("sushi"),
            ingredients: &["Hot Cheetos", "Rice", "Spam", "Nori"],
            tools: &["Microwave", "Spoon"],
            steps: &[
                "Microwave leftover rice until steamy.",
                "Crumble Hot Cheetos in the bag for neon crumbs.",
                "Flash-heat Spam slices for 60 seconds.",
                "Layer rice + Spam + crumbs on nori and roll tight.",
                "Slice with a spoon or plastic knife and commit to the bit.",
            ],
            minutes: 8,
            cost: 3.5,
            score: 95,
            verifications: 12,
            remixes: 4,
            verified: true,
            author: "broke_chef_mike",
            avatar_seed: "Mike",
        },
        DemoMeal {
            title: "Microwave Ramen Pizza",
            description: "Ramen noodle crust, ketchup sauce, and string cheese. College fine dining.",
            image: unsplash("ramen"),
            ingredients: &["Instant Ramen", "Ketchup", "String Cheese"],
            tools: &["Microwave", "Plate"],
            steps: &[
                "Cook ramen in the microwave and drain almost all liquid.",
                "Flatten noodles into a disc on a plate.",
                "Paint with ketchup like it's fancy sauce.",
                "Rip up string cheese and scatter.",
                "Microwave one more minute until molten.",
            ],
            minutes: 6,
            cost: 2.0,
            score: 88,
            verifications: 6,
            remixes: 5,
            verified: true,
            author: "dorm_gourmet",
            avatar_seed: "Dorm",
        },
        DemoMeal {
            title: "PB&J Quesadilla Supreme",
            description: "Peanut butter + jelly folded in a tortilla and fried on any hot surface.",
            image: unsplash("pbj"),
            ingredients: &["Flour Tortilla", "Peanut Butter", "Jelly"],
            tools: &["Pan", "Spatula"],
            steps: &[
                "Spread peanut butter over the entire tortilla.",
                "Add jelly to one side only.",
                "Fold and press.",
                "Toast on a pan or hot plate 2 minutes each side.",
            ],
            minutes: 4,
            cost: 1.4,
            score: 82,
            verifications: 5,
            remixes: 2,
            verified: false,
            author: "air_fry_everything",
            avatar_seed: "AirFry",
        },
        DemoMeal {
            title: "Cereal Fried Rice",
            description: "Leftover rice fried with sugary cereal for that chaos crunch.",
            image: unsplash("cereal"),
            ingredients: &["Leftover Rice", "Frosted Flakes", "Soy Sauce", "Egg"],
            tools: &["Microwave", "Bowl"],
            steps: &[
                "Crack an egg into rice and stir like you mean it.",
                "Microwave 90 seconds, stir, microwave again.",
                "Splash soy sauce, top with crushed cereal, microwave 30 seconds.",
                "Let it sit so the flakes soften but still crunch.",
            ],
            minutes: 7,
            cost: 2.8,
            score: 79,
            verifications: 3,
            remixes: 1,
            verified: false,
            author: "3am_snacker",
            avatar_seed: "NightOwl",
        },
        DemoMeal {
            title: "Mac & Cheese Waffle Stack",
            description: "Box mac smashed into a waffle iron until crispy golden.",
            image: unsplash("waffle"),
            ingredients: &["Boxed Mac & Cheese", "Cooking Spray"],
            tools: &["Pot", "Waffle Iron"],
            steps: &[
                "Cook the mac per the instructions.",
                "Grease the waffle iron aggressively.",
                "Pile mac in, close, and forget about it for 6 minutes.",
                "Pop it out, let it set, drizzle hot sauce.",
            ],
            minutes: 11,
            cost: 1.7,
            score: 91,
            verifications: 10,
            remixes: 3,
            verified: true,
            author: "waffle_wizard",
            avatar_seed: "Waffle",
        },
    ]
}

fn demo_remixes() -> [DemoRemix; 3] {
    [
        DemoRemix {
            parent: 0,
            title: "Nuclear Crunch Roll",
            description: "Added canned corn + torched mayo for a dorm brulee.",
            image: unsplash("crunch"),
            ingredients: &["Hot Cheetos", "Rice", "Spam", "Corn", "Spicy Mayo"],
            tools: &["Microwave", "Spoon", "Lighter"],
            steps: &["Follow the OG roll", "Mix corn into rice", "Torch mayo on top"],
            minutes: 9,
            cost: 4.2,
            score: 88,
            author_name: "Rhea Tran",
            author_handle: "rice_hoarder",
            avatar_seed: "Rhea",
        },
        DemoRemix {
            parent: 1,
            title: "Breakfast Ramen Pizza",
            description: "Threw scrambled egg and crushed chips on the ramen crust.",
            image: unsplash("breakfast"),
            ingredients: &["Instant Ramen", "Egg", "Tortilla Chips", "Hot Sauce"],
            tools: &["Microwave", "Plate"],
            steps: &[
                "Cook ramen disc",
                "Scramble egg in microwave cup",
                "Top pizza with egg + chips + hot sauce",
            ],
            minutes: 7,
            cost: 2.5,
            score: 84,
            author_name: "Quincy Vega",
            author_handle: "queso_bandit",
            avatar_seed: "Quincy",
        },
        DemoRemix {
            parent: 4,
            title: "Sweet Heat Mac Waffle",
            description: "Sriracha + honey drizzle plus crushed peanuts for texture.",
            image: unsplash("sweet-heat"),
            ingredients: &["Mac & Cheese", "Hot Honey", "Peanuts"],
            tools: &["Waffle Iron"],
            steps: &["Waffle the mac", "Drizzle hot honey", "Finish with crushed peanuts"],
            minutes: 12,
            cost: 2.1,
            score: 90,
            author_name: "Maya Ortiz",
            author_handle: "microwave_marauder",
            avatar_seed: "Maya",
        },
    ]
}

/// Replace the contents of `store` with the demo data.
///
/// Rows are dated a minute back, remixes one millisecond apart in listing
/// order, so the feeds have a stable order and anything created afterwards
/// sorts as newer.
pub async fn seed_demo_data<S: RemoteStore + ?Sized>(store: &S) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    let every_row = [Filter::NotNull(Column::Id)];

    report.remixes_removed = store.delete(Table::Remixes, &every_row).await?;
    report.meals_removed = store.delete(Table::Meals, &every_row).await?;
    info!(
        meals = report.meals_removed,
        remixes = report.remixes_removed,
        "cleared tables"
    );

    let base = now_millis() - SEED_AGE_MILLIS;
    for (meal, id) in demo_meals().iter().zip(DEMO_MEAL_IDS) {
        let values = new_meal_values(&meal.input())
            .set(Column::Id, id)
            .set(Column::CreatedAt, base);
        store.insert(Table::Meals, &values).await?;
        report.meals_inserted += 1;
    }

    for (offset, remix) in demo_remixes().iter().enumerate() {
        let values = remix_values(&remix.input()).set(Column::CreatedAt, base + offset as i64);
        store.insert(Table::Remixes, &values).await?;
        report.remixes_inserted += 1;
    }

    info!(
        meals = report.meals_inserted,
        remixes = report.remixes_inserted,
        "seed complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use struggle_meals_store::{Gateway, MemoryStore, Select};

    #[tokio::test]
    async fn test_seed_inserts_demo_rows() {
        let store = MemoryStore::new();
        let report = seed_demo_data(&store).await.unwrap();

        assert_eq!(report.meals_inserted, 5);
        assert_eq!(report.remixes_inserted, 3);
        assert_eq!(report.meals_removed, 0);

        let gateway = Gateway::new(store);
        let meals = gateway.list_meals().await.unwrap();
        let scores: Vec<_> = meals.iter().map(|m| m.struggle_score).collect();
        assert_eq!(scores, vec![95, 91, 88, 82, 79]);
        assert_eq!(meals[0].id.as_str(), DEMO_MEAL_IDS[0]);
        assert_eq!(meals[0].verifications, 12);
        assert!(meals[0].is_verified);

        let latest = gateway.list_latest_remixes(6).await.unwrap();
        assert_eq!(latest[0].title, "Sweet Heat Mac Waffle");
    }

    #[tokio::test]
    async fn test_reseed_replaces_everything() {
        let store = MemoryStore::new();
        seed_demo_data(&store).await.unwrap();
        let report = seed_demo_data(&store).await.unwrap();

        assert_eq!(report.meals_removed, 5);
        assert_eq!(report.remixes_removed, 3);
        let rows = store.select(&Select::from(Table::Meals)).await.unwrap();
        assert_eq!(rows.len(), 5);
    }
}
