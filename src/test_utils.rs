//! Shared test utilities for `BreakfastBuddy`.
//!
//! Provides an in-memory database and a menu mirroring the office cafeteria, so
//! every test prices against the same numbers.

use crate::{
    core::{
        catalog::{ComboRule, Item, ItemKind, Menu},
        session,
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::collections::BTreeSet;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A drink menu item.
pub fn drink(name: &str, price: f64, category: &str) -> Item {
    Item {
        name: name.to_string(),
        price,
        category: category.to_string(),
        kind: ItemKind::Drink,
    }
}

/// A food menu item.
pub fn food(name: &str, price: f64, category: &str) -> Item {
    Item {
        name: name.to_string(),
        price,
        category: category.to_string(),
        kind: ItemKind::Food,
    }
}

/// A combo rule. Pass an empty `secondary` and `None` for rules without a substitute drink.
pub fn combo(
    name: &str,
    drinks: &[&str],
    foods: &[&str],
    price: f64,
    secondary: &[&str],
    discount: Option<f64>,
) -> ComboRule {
    let set = |names: &[&str]| -> BTreeSet<String> {
        names.iter().map(ToString::to_string).collect()
    };
    ComboRule {
        name: name.to_string(),
        drink_categories: set(drinks),
        food_categories: set(foods),
        price,
        secondary_categories: set(secondary),
        discount_price: discount,
    }
}

/// Items of the cafeteria menu.
///
/// # Prices
/// * coffees: 1.20, infusions: 0.90, Colacao: 1.50
/// * Barrita aceite, Napolitana: 1.85; Barrita tomate, Croissant: 2.50
/// * Palmera: 1.50, Tortilla: 1.40, Yogurt: 0.90
pub fn sample_items() -> Vec<Item> {
    vec![
        drink("Café con leche", 1.2, "Café"),
        drink("Cortado", 1.2, "Café"),
        drink("Italiano", 1.2, "Café"),
        drink("Americano", 1.2, "Café"),
        drink("Té", 0.9, "Infusión"),
        drink("Manzanilla", 0.9, "Infusión"),
        drink("Colacao", 1.5, "Colacao"),
        food("Barrita aceite", 1.85, "Barrita aceite"),
        food("Napolitana de chocolate", 1.85, "Napolitana"),
        food("Barrita tomate", 2.5, "Barrita tomate"),
        food("Croissant plancha", 2.5, "Croissant"),
        food("Palmera chocolate", 1.5, "Palmera"),
        food("Palmera chocolate blanco", 1.5, "Palmera"),
        food("Tortilla", 1.4, "Tortilla"),
        food("Yogurt", 0.9, "Yogurt"),
    ]
}

/// Combo rules of the cafeteria: coffee with a pastry, infusions as substitutes.
pub fn sample_rules() -> Vec<ComboRule> {
    vec![
        combo(
            "Desayuno + Café",
            &["Café"],
            &["Barrita aceite", "Napolitana"],
            1.85,
            &["Infusión"],
            Some(1.55),
        ),
        combo(
            "Desayuno completo + Café",
            &["Café"],
            &["Barrita tomate", "Croissant"],
            2.5,
            &["Infusión"],
            Some(2.2),
        ),
    ]
}

/// The validated cafeteria menu.
#[allow(clippy::unwrap_used)]
pub fn sample_menu() -> Menu {
    Menu::new(sample_items(), sample_rules()).unwrap()
}

/// Adds an order to the live session against the sample menu.
pub async fn place_order(
    db: &DatabaseConnection,
    participant: &str,
    drink: &str,
    food: &str,
) -> Result<entities::order::Model> {
    session::add_order(db, &sample_menu(), participant, drink, food).await
}
