//! Menu data model - priced items and the combo rules that bundle them.
//!
//! A [`Menu`] is built once at startup from configuration and never changes while the
//! bot runs. Building it validates every invariant the pricing engine relies on, so a
//! menu that exists is always safe to price against.
//!
//! Combo rules are grouped into drink pools. A pool is the set of rules sharing the
//! same primary and secondary drink categories: every combinable food of the pool can
//! be backed by any primary drink of the pool, or by a secondary drink at a discount.
//! Pools never share a food or drink category, so each one is allocated on its own.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Item name used in an order slot when nothing was chosen.
pub const NONE_ITEM: &str = "none";

/// Whether an item goes in the drink slot or the food slot of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Goes in the drink slot
    Drink,
    /// Goes in the food slot
    Food,
}

impl ItemKind {
    /// Slot name used in error messages.
    #[must_use]
    pub const fn slot(self) -> &'static str {
        match self {
            Self::Drink => "drink",
            Self::Food => "food",
        }
    }
}

/// A menu entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique name shown to participants (e.g. "Café con leche")
    pub name: String,
    /// Unit price in euros
    pub price: f64,
    /// Category grouping interchangeable items (e.g. "Café")
    pub category: String,
    /// Drink or food
    pub kind: ItemKind,
}

/// A discounted bundle of one drink and one food.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboRule {
    /// Name keyed on the payment terminal (e.g. "Desayuno + Café")
    pub name: String,
    /// Drink categories that back this combo at full price
    pub drink_categories: BTreeSet<String>,
    /// Food categories eligible for this combo
    pub food_categories: BTreeSet<String>,
    /// Combo price
    pub price: f64,
    /// Cheaper drink categories that may stand in for a primary drink
    #[serde(default)]
    pub secondary_categories: BTreeSet<String>,
    /// What a secondary-drink order pays for this combo when a primary drink backs its food
    #[serde(default)]
    pub discount_price: Option<f64>,
}

/// How a drink category takes part in a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrinkRole {
    /// Preferred drink for backing a combo
    Primary,
    /// Substitute used only when primary drinks run out
    Secondary,
}

/// Rules sharing the same primary and secondary drink categories.
#[derive(Debug, Clone, PartialEq)]
pub struct DrinkPool {
    /// Display name, the primary categories joined with " / "
    pub name: String,
    /// Primary drink categories
    pub primary: BTreeSet<String>,
    /// Secondary drink categories, possibly empty
    pub secondary: BTreeSet<String>,
    /// Price shared by every primary drink
    pub primary_price: f64,
    /// Price shared by every secondary drink
    pub secondary_price: Option<f64>,
    /// Every food category combinable in this pool
    pub foods: BTreeSet<String>,
}

impl DrinkPool {
    /// Extra cost of keying a combo backed by a secondary drink instead of a primary one.
    ///
    /// The terminal charges the full combo price either way, while the secondary drink
    /// would have been cheaper on its own.
    #[must_use]
    pub fn substitution_cost(&self) -> f64 {
        self.secondary_price
            .map_or(0.0, |secondary| self.primary_price - secondary)
    }

    /// Role of a drink category in this pool, if any.
    #[must_use]
    pub fn role_of(&self, category: &str) -> Option<DrinkRole> {
        if self.primary.contains(category) {
            Some(DrinkRole::Primary)
        } else if self.secondary.contains(category) {
            Some(DrinkRole::Secondary)
        } else {
            None
        }
    }
}

/// Validated catalog plus combo rule table.
#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    items: BTreeMap<String, Item>,
    category_prices: BTreeMap<String, f64>,
    rules: Vec<ComboRule>,
    pools: Vec<DrinkPool>,
    // food category -> (pool index, rule index)
    food_combos: BTreeMap<String, (usize, usize)>,
    // drink category -> (pool index, role)
    drink_roles: BTreeMap<String, (usize, DrinkRole)>,
}

impl Menu {
    /// Builds a menu, rejecting any configuration the pricing engine cannot price.
    ///
    /// # Errors
    /// Returns `Error::Config` if item names collide or are reserved, a price is
    /// negative, not finite or has more than two decimals, a category mixes prices or
    /// kinds, a rule references an unknown category, two rules apply to the same
    /// (drink category, food category) pair, pools share a category, or a discount
    /// price does not match the drink prices of its pool.
    pub fn new(items: Vec<Item>, rules: Vec<ComboRule>) -> Result<Self> {
        let (items, category_prices, category_kinds) = index_items(items)?;

        for rule in &rules {
            validate_rule(rule, &category_kinds)?;
        }
        check_no_overlap(&rules)?;

        let mut pools: Vec<DrinkPool> = Vec::new();
        let mut food_combos = BTreeMap::new();
        let mut drink_roles: BTreeMap<String, (usize, DrinkRole)> = BTreeMap::new();

        for (rule_index, rule) in rules.iter().enumerate() {
            let pool_index = match pools.iter().position(|pool| {
                pool.primary == rule.drink_categories
                    && pool.secondary == rule.secondary_categories
            }) {
                Some(index) => index,
                None => {
                    pools.push(new_pool(rule, &category_prices)?);
                    pools.len() - 1
                }
            };

            for food in &rule.food_categories {
                let previous = food_combos.insert(food.clone(), (pool_index, rule_index));
                if matches!(previous, Some((other_pool, _)) if other_pool != pool_index) {
                    return Err(config_error(format!(
                        "food category '{food}' is combinable with two different drink pools"
                    )));
                }
                pools[pool_index].foods.insert(food.clone());
            }

            let roles = rule
                .drink_categories
                .iter()
                .map(|category| (category, DrinkRole::Primary))
                .chain(
                    rule.secondary_categories
                        .iter()
                        .map(|category| (category, DrinkRole::Secondary)),
                );
            for (category, role) in roles {
                match drink_roles.get(category) {
                    Some(&(other_pool, other_role))
                        if other_pool != pool_index || other_role != role =>
                    {
                        return Err(config_error(format!(
                            "drink category '{category}' is used by more than one drink pool"
                        )));
                    }
                    _ => {
                        drink_roles.insert(category.clone(), (pool_index, role));
                    }
                }
            }

            check_discount(rule, &pools[pool_index])?;
        }

        Ok(Self {
            items,
            category_prices,
            rules,
            pools,
            food_combos,
            drink_roles,
        })
    }

    /// Looks up an item by name. The `"none"` sentinel yields `Ok(None)`.
    ///
    /// # Errors
    /// Returns `Error::UnknownItem` if the name is not on the menu or is an item of the
    /// other kind.
    pub fn lookup(&self, name: &str, kind: ItemKind) -> Result<Option<&Item>> {
        if name == NONE_ITEM {
            return Ok(None);
        }
        match self.items.get(name) {
            Some(item) if item.kind == kind => Ok(Some(item)),
            _ => Err(Error::UnknownItem {
                name: name.to_string(),
                slot: kind.slot(),
            }),
        }
    }

    /// All items of one kind, ordered by name.
    pub fn items_of(&self, kind: ItemKind) -> impl Iterator<Item = &Item> {
        self.items.values().filter(move |item| item.kind == kind)
    }

    /// Combo rules in configuration order.
    #[must_use]
    pub fn rules(&self) -> &[ComboRule] {
        &self.rules
    }

    /// Drink pools derived from the rules.
    #[must_use]
    pub fn pools(&self) -> &[DrinkPool] {
        &self.pools
    }

    /// The pool and rule a food category combines under, if it is combinable.
    #[must_use]
    pub fn combo_for_food(&self, category: &str) -> Option<(usize, &ComboRule)> {
        self.food_combos
            .get(category)
            .map(|&(pool, rule)| (pool, &self.rules[rule]))
    }

    /// The pool and role of a drink category, if it can back a combo.
    #[must_use]
    pub fn drink_role(&self, category: &str) -> Option<(usize, DrinkRole)> {
        self.drink_roles.get(category).copied()
    }

    /// The unit price shared by every item of a category.
    #[must_use]
    pub fn category_price(&self, category: &str) -> Option<f64> {
        self.category_prices.get(category).copied()
    }
}

type ItemIndex = (
    BTreeMap<String, Item>,
    BTreeMap<String, f64>,
    BTreeMap<String, ItemKind>,
);

fn index_items(items: Vec<Item>) -> Result<ItemIndex> {
    let mut by_name = BTreeMap::new();
    let mut prices: BTreeMap<String, f64> = BTreeMap::new();
    let mut kinds: BTreeMap<String, ItemKind> = BTreeMap::new();

    for item in items {
        let name = item.name.trim();
        if name.is_empty() {
            return Err(config_error("item name cannot be empty".to_string()));
        }
        if name.eq_ignore_ascii_case(NONE_ITEM) {
            return Err(config_error(format!(
                "'{NONE_ITEM}' is reserved and cannot be a menu item"
            )));
        }
        validate_price(&item.name, item.price)?;
        if item.category.trim().is_empty() {
            return Err(config_error(format!("item '{name}' has no category")));
        }

        if let Some(&price) = prices
            .get(&item.category)
            .filter(|&&price| !same_cents(price, item.price))
        {
            return Err(config_error(format!(
                "category '{}' mixes prices {price:.2} and {:.2}",
                item.category, item.price
            )));
        }
        if kinds
            .get(&item.category)
            .is_some_and(|&kind| kind != item.kind)
        {
            return Err(config_error(format!(
                "category '{}' mixes drinks and foods",
                item.category
            )));
        }
        prices.insert(item.category.clone(), item.price);
        kinds.insert(item.category.clone(), item.kind);

        let item = Item {
            name: name.to_string(),
            ..item
        };
        if by_name.insert(item.name.clone(), item).is_some() {
            return Err(config_error(format!("item '{name}' is listed twice")));
        }
    }

    Ok((by_name, prices, kinds))
}

fn validate_price(what: &str, price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(config_error(format!(
            "'{what}' has an invalid price {price}"
        )));
    }
    let cents = price * 100.0;
    if (cents - cents.round()).abs() > 1e-6 {
        return Err(config_error(format!(
            "'{what}' has a price with more than two decimals: {price}"
        )));
    }
    Ok(())
}

fn validate_rule(rule: &ComboRule, kinds: &BTreeMap<String, ItemKind>) -> Result<()> {
    validate_price(&rule.name, rule.price)?;
    if rule.name.trim().is_empty() {
        return Err(config_error("combo name cannot be empty".to_string()));
    }
    if rule.drink_categories.is_empty() || rule.food_categories.is_empty() {
        return Err(config_error(format!(
            "combo '{}' needs at least one drink and one food category",
            rule.name
        )));
    }
    match (&rule.discount_price, rule.secondary_categories.is_empty()) {
        (Some(discount), false) => validate_price(&rule.name, *discount)?,
        (None, true) => {}
        _ => {
            return Err(config_error(format!(
                "combo '{}' must set both secondary_categories and discount_price, or neither",
                rule.name
            )));
        }
    }
    if let Some(category) = rule
        .drink_categories
        .intersection(&rule.secondary_categories)
        .next()
    {
        return Err(config_error(format!(
            "combo '{}' lists '{category}' as both primary and secondary drink",
            rule.name
        )));
    }

    let expected = rule
        .drink_categories
        .iter()
        .chain(&rule.secondary_categories)
        .map(|category| (category, ItemKind::Drink))
        .chain(
            rule.food_categories
                .iter()
                .map(|category| (category, ItemKind::Food)),
        );
    for (category, kind) in expected {
        if kinds.get(category) != Some(&kind) {
            return Err(config_error(format!(
                "combo '{}' references unknown {} category '{category}'",
                rule.name,
                kind.slot()
            )));
        }
    }
    Ok(())
}

fn check_no_overlap(rules: &[ComboRule]) -> Result<()> {
    let mut seen: BTreeMap<(&str, &str), &str> = BTreeMap::new();
    for rule in rules {
        for drink in rule.drink_categories.iter().chain(&rule.secondary_categories) {
            for food in &rule.food_categories {
                if let Some(other) = seen.insert((drink, food), &rule.name) {
                    return Err(config_error(format!(
                        "combos '{other}' and '{}' both apply to '{drink}' with '{food}'",
                        rule.name
                    )));
                }
            }
        }
    }
    Ok(())
}

fn new_pool(rule: &ComboRule, prices: &BTreeMap<String, f64>) -> Result<DrinkPool> {
    let shared_price = |categories: &BTreeSet<String>| -> Result<Option<f64>> {
        let mut shared: Option<f64> = None;
        for category in categories {
            let price = prices.get(category).copied().unwrap_or_default();
            match shared {
                Some(existing) if !same_cents(existing, price) => {
                    return Err(config_error(format!(
                        "drinks backing combo '{}' must share one price, found {existing:.2} and {price:.2}",
                        rule.name
                    )));
                }
                _ => shared = Some(price),
            }
        }
        Ok(shared)
    };

    let primary_price = shared_price(&rule.drink_categories)?.unwrap_or_default();
    let secondary_price = shared_price(&rule.secondary_categories)?;

    Ok(DrinkPool {
        name: rule
            .drink_categories
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(" / "),
        primary: rule.drink_categories.clone(),
        secondary: rule.secondary_categories.clone(),
        primary_price,
        secondary_price,
        foods: BTreeSet::new(),
    })
}

// A secondary-drink order whose food is backed by a primary drink pays for its own
// drink plus the food's share of the combo. Anything else would leave the ticket
// total and the terminal total apart.
fn check_discount(rule: &ComboRule, pool: &DrinkPool) -> Result<()> {
    if let (Some(discount), Some(secondary)) = (rule.discount_price, pool.secondary_price) {
        let expected = rule.price - pool.primary_price + secondary;
        if !same_cents(discount, expected) {
            return Err(config_error(format!(
                "combo '{}' discount price {discount:.2} should be {expected:.2}",
                rule.name
            )));
        }
    }
    Ok(())
}

fn same_cents(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.005
}

fn config_error(message: String) -> Error {
    Error::Config { message }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{combo, drink, food, sample_menu};

    #[test]
    fn test_sample_menu_builds_one_pool() {
        let menu = sample_menu();
        assert_eq!(menu.pools().len(), 1);

        let pool = &menu.pools()[0];
        assert_eq!(pool.name, "Café");
        assert_eq!(pool.primary_price, 1.2);
        assert_eq!(pool.secondary_price, Some(0.9));
        assert!((pool.substitution_cost() - 0.3).abs() < 1e-9);
        assert_eq!(pool.foods.len(), 4);
    }

    #[test]
    fn test_lookup_handles_sentinel_and_kinds() {
        let menu = sample_menu();

        assert!(menu.lookup(NONE_ITEM, ItemKind::Drink).unwrap().is_none());
        assert_eq!(
            menu.lookup("Cortado", ItemKind::Drink).unwrap().unwrap().category,
            "Café"
        );

        // A food in the drink slot is not on the drink menu
        let result = menu.lookup("Tortilla", ItemKind::Drink);
        assert!(matches!(
            result.unwrap_err(),
            Error::UnknownItem { slot: "drink", .. }
        ));

        let result = menu.lookup("Churros", ItemKind::Food);
        assert!(matches!(result.unwrap_err(), Error::UnknownItem { .. }));
    }

    #[test]
    fn test_combo_lookups() {
        let menu = sample_menu();

        let (pool, rule) = menu.combo_for_food("Barrita tomate").unwrap();
        assert_eq!(pool, 0);
        assert_eq!(rule.price, 2.5);
        assert!(menu.combo_for_food("Palmera").is_none());

        assert_eq!(menu.drink_role("Café"), Some((0, DrinkRole::Primary)));
        assert_eq!(menu.drink_role("Infusión"), Some((0, DrinkRole::Secondary)));
        assert_eq!(menu.drink_role("Colacao"), None);
        assert_eq!(menu.category_price("Palmera"), Some(1.5));
    }

    #[test]
    fn test_overlapping_rules_rejected() {
        let items = vec![
            drink("Cortado", 1.2, "Café"),
            food("Barrita aceite", 1.85, "Barrita aceite"),
        ];
        let rules = vec![
            combo("Desayuno", &["Café"], &["Barrita aceite"], 1.85, &[], None),
            combo("Otro desayuno", &["Café"], &["Barrita aceite"], 1.95, &[], None),
        ];

        let result = Menu::new(items, rules);
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));
    }

    #[test]
    fn test_food_in_two_pools_rejected() {
        let items = vec![
            drink("Cortado", 1.2, "Café"),
            drink("Colacao", 1.5, "Colacao"),
            food("Barrita aceite", 1.85, "Barrita aceite"),
        ];
        let rules = vec![
            combo("Desayuno", &["Café"], &["Barrita aceite"], 1.85, &[], None),
            combo("Merienda", &["Colacao"], &["Barrita aceite"], 2.2, &[], None),
        ];

        assert!(Menu::new(items, rules).is_err());
    }

    #[test]
    fn test_item_validation() {
        let reserved = vec![drink("none", 1.0, "Café")];
        assert!(Menu::new(reserved, Vec::new()).is_err());

        let duplicated = vec![drink("Cortado", 1.2, "Café"), drink("Cortado", 1.2, "Café")];
        assert!(Menu::new(duplicated, Vec::new()).is_err());

        let negative = vec![drink("Cortado", -1.2, "Café")];
        assert!(Menu::new(negative, Vec::new()).is_err());

        let fractional = vec![drink("Cortado", 1.205, "Café")];
        assert!(Menu::new(fractional, Vec::new()).is_err());

        let mixed = vec![drink("Cortado", 1.2, "Café"), drink("Italiano", 1.3, "Café")];
        assert!(Menu::new(mixed, Vec::new()).is_err());
    }

    #[test]
    fn test_discount_must_match_drink_prices() {
        let items = vec![
            drink("Cortado", 1.2, "Café"),
            drink("Té", 0.9, "Infusión"),
            food("Barrita aceite", 1.85, "Barrita aceite"),
        ];
        let wrong = vec![combo(
            "Desayuno",
            &["Café"],
            &["Barrita aceite"],
            1.85,
            &["Infusión"],
            Some(1.40),
        )];
        assert!(Menu::new(items.clone(), wrong).is_err());

        let right = vec![combo(
            "Desayuno",
            &["Café"],
            &["Barrita aceite"],
            1.85,
            &["Infusión"],
            Some(1.55),
        )];
        assert!(Menu::new(items, right).is_ok());
    }

    #[test]
    fn test_unknown_rule_category_rejected() {
        let items = vec![drink("Cortado", 1.2, "Café")];
        let rules = vec![combo("Desayuno", &["Café"], &["Bollería"], 1.85, &[], None)];
        assert!(Menu::new(items, rules).is_err());
    }
}
