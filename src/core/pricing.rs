//! Pricing engine - turns a session's orders into the bar, machine and debts tables.
//!
//! Pricing runs in two passes:
//!
//! 1. Every order is priced on its own. Orders whose price depends on how many combos
//!    the whole group can form get a [`RowPrice::Variable`] price and a
//!    [`RowRole`] telling the allocation which kind of participant they are.
//! 2. For every drink pool, the counts of combinable foods (F), primary drinks (P) and
//!    secondary drinks (S) decide how combos are formed:
//!    - `P >= F`: every combinable food gets a primary drink.
//!    - `P + S >= F`: all primary drinks are used and `F - P` combos are backed by a
//!      secondary drink. Those combos cost the full combo price on the terminal, so
//!      the difference is shared out between the variable orders of the pool in
//!      whole cents. Leftover cents go one each to the first sharers in canonical
//!      order, so the debts always add up to the terminal total.
//!    - otherwise the ticket cannot be formed and `Error::InsufficientDrinks` is returned.
//!
//! Every decision depends only on counts, and orders are processed in a canonical
//! order, so shuffling the input never changes the output.

use crate::{
    core::{
        catalog::{DrinkPool, DrinkRole, Item, ItemKind, Menu},
        tally::{Counter, Ticket, from_cents, round_cents, to_cents},
    },
    errors::{Error, Result},
};
use std::collections::BTreeMap;
use tracing::debug;

/// One order as the engine sees it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct OrderLine {
    /// Participant who ordered
    pub participant: String,
    /// Drink item name or `"none"`
    pub drink: String,
    /// Food item name or `"none"`
    pub food: String,
}

impl OrderLine {
    /// Convenience constructor.
    pub fn new(
        participant: impl Into<String>,
        drink: impl Into<String>,
        food: impl Into<String>,
    ) -> Self {
        Self {
            participant: participant.into(),
            drink: drink.into(),
            food: food.into(),
        }
    }
}

/// Price of an order before the combo allocation is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowPrice {
    /// Price does not depend on the rest of the group
    Fixed(f64),
    /// Price depends on which drink ends up backing this order's food
    Variable {
        /// Price if no combo could be formed at all
        base: f64,
        /// Price when the food is bundled with a primary drink
        with_primary: f64,
        /// Price when the food is bundled with a secondary drink
        with_secondary: f64,
    },
}

/// How an order with a combinable food takes part in the allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRole {
    /// Food not combinable, or no food at all
    Plain,
    /// Primary drink with a combinable food: a complete combo on its own
    PrimaryCombo,
    /// Secondary drink with a combinable food
    SecondaryCombo,
    /// Non-combinable drink with a combinable food
    Drinker,
    /// Combinable food without a drink
    NonDrinker,
}

/// Classification built for each order during the first pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowClass {
    /// Provisional price
    pub price: RowPrice,
    /// Role in the allocation
    pub role: RowRole,
    /// Pool the order's food belongs to, if combinable
    pub pool: Option<usize>,
}

/// Which variable orders share the cost of secondary-backed combos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurchargePolicy {
    /// Only orders without a drink
    NonDrinkers,
    /// Only orders with a secondary drink and a combinable food
    SecondaryCombos,
    /// Every variable order of the pool
    AllVariable,
}

impl SurchargePolicy {
    /// Picks the policy from the counts of the pool.
    ///
    /// More food-only orders than secondary-backed combos means those orders caused the
    /// substitution and cover it. With no food-only orders the secondary drinkers cover
    /// it. Otherwise everyone with a variable price shares it.
    #[must_use]
    pub const fn choose(non_drinkers: u32, secondary_combos: u32, substituted: u32) -> Self {
        if non_drinkers > 0 && non_drinkers > substituted {
            Self::NonDrinkers
        } else if non_drinkers == 0 && secondary_combos > 0 {
            Self::SecondaryCombos
        } else {
            Self::AllVariable
        }
    }

    const fn applies_to(self, role: RowRole) -> bool {
        match self {
            Self::NonDrinkers => matches!(role, RowRole::NonDrinker),
            Self::SecondaryCombos => matches!(role, RowRole::SecondaryCombo),
            Self::AllVariable => matches!(
                role,
                RowRole::NonDrinker | RowRole::SecondaryCombo | RowRole::Drinker
            ),
        }
    }
}

/// Outcome of the allocation for one drink pool.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolAllocation {
    /// Pool name
    pub pool: String,
    /// Combinable foods per food category, one combo each
    pub combos: Counter,
    /// Primary drinks left over, keyed standalone
    pub primary_left: Counter,
    /// Secondary drinks left over, keyed standalone
    pub secondary_left: Counter,
    /// Combos backed by a secondary drink
    pub substituted: u32,
    /// Total cost shared out because of substitution
    pub surcharge: f64,
    /// Who shares it, when `substituted > 0`
    pub policy: Option<SurchargePolicy>,
    /// Each sharer's part of the surcharge, in cents
    pub share_cents: i64,
    /// Sharers paying one cent more, the first ones in canonical order
    pub extra_cents: i64,
}

/// An order with its final price.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRow {
    /// The order
    pub order: OrderLine,
    /// Final price
    pub price: f64,
}

/// Full result of pricing a session.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrders {
    /// Orders in canonical order with their final prices
    pub rows: Vec<ResolvedRow>,
    /// Allocation decision per drink pool
    pub pools: Vec<PoolAllocation>,
    /// The three output tables
    pub ticket: Ticket,
    /// What the terminal should show once the machine lines are keyed in
    pub machine_total: f64,
}

/// Computes the bar, machine and debts tables for a set of orders.
///
/// # Errors
/// Returns `Error::UnknownItem` if an order names an item not on the menu, and
/// `Error::InsufficientDrinks` if a pool has more combinable foods than drinks.
pub fn compute_ticket(orders: &[OrderLine], menu: &Menu) -> Result<Ticket> {
    price_orders(orders, menu).map(|priced| priced.ticket)
}

/// Prices every order and keeps the intermediate allocation for inspection.
///
/// # Errors
/// Same as [`compute_ticket`].
pub fn price_orders(orders: &[OrderLine], menu: &Menu) -> Result<PricedOrders> {
    let mut sorted: Vec<&OrderLine> = orders.iter().collect();
    sorted.sort();

    let pools = menu.pools();
    let mut food_counts = vec![Counter::new(); pools.len()];
    let mut primary_counts = vec![Counter::new(); pools.len()];
    let mut secondary_counts = vec![Counter::new(); pools.len()];
    let mut bar = Counter::new();
    let mut plain = Counter::new();
    let mut classes = Vec::with_capacity(sorted.len());

    for order in &sorted {
        let drink = menu.lookup(&order.drink, ItemKind::Drink)?;
        let food = menu.lookup(&order.food, ItemKind::Food)?;

        if let Some(drink) = drink {
            bar.add(&drink.name);
            match menu.drink_role(&drink.category) {
                Some((pool, DrinkRole::Primary)) => primary_counts[pool].add(&drink.category),
                Some((pool, DrinkRole::Secondary)) => {
                    secondary_counts[pool].add(&drink.category);
                }
                None => plain.add(&drink.category),
            }
        }
        if let Some(food) = food {
            bar.add(&food.name);
            match menu.combo_for_food(&food.category) {
                Some((pool, _)) => food_counts[pool].add(&food.category),
                None => plain.add(&food.category),
            }
        }

        classes.push(classify(menu, drink, food));
    }

    let mut allocations = Vec::with_capacity(pools.len());
    let mut machine = plain;
    let mut machine_total = machine
        .iter()
        .map(|(category, count)| {
            menu.category_price(category).unwrap_or_default() * f64::from(count)
        })
        .sum::<f64>();

    for (index, pool) in pools.iter().enumerate() {
        let pool_classes = classes.iter().filter(|class| class.pool == Some(index));
        let allocation = allocate(
            pool,
            &food_counts[index],
            &primary_counts[index],
            &secondary_counts[index],
            pool_classes,
        )?;
        debug!(
            pool = %allocation.pool,
            combos = allocation.combos.total(),
            substituted = allocation.substituted,
            policy = ?allocation.policy,
            share_cents = allocation.share_cents,
            "allocated combos"
        );

        for (category, count) in allocation.combos.iter() {
            if let Some((_, rule)) = menu.combo_for_food(category) {
                machine.add_n(&format!("{} ({category})", rule.name), count);
                machine_total += rule.price * f64::from(count);
            }
        }
        for (category, count) in allocation
            .primary_left
            .iter()
            .chain(allocation.secondary_left.iter())
        {
            machine.add_n(category, count);
            machine_total += menu.category_price(category).unwrap_or_default() * f64::from(count);
        }
        allocations.push(allocation);
    }

    let mut rows = Vec::with_capacity(sorted.len());
    let mut debts: BTreeMap<String, f64> = BTreeMap::new();
    let mut shared = vec![0_i64; allocations.len()];
    for (order, class) in sorted.into_iter().zip(&classes) {
        let price = resolve(class, &allocations, &mut shared);
        *debts.entry(order.participant.clone()).or_default() += price;
        rows.push(ResolvedRow {
            order: order.clone(),
            price,
        });
    }
    for debt in debts.values_mut() {
        *debt = round_cents(*debt);
    }

    Ok(PricedOrders {
        rows,
        pools: allocations,
        ticket: Ticket {
            bar,
            machine,
            debts,
        },
        machine_total: round_cents(machine_total),
    })
}

/// Prices one order on its own and classifies it for the allocation.
#[must_use]
pub fn classify(menu: &Menu, drink: Option<&Item>, food: Option<&Item>) -> RowClass {
    let drink_price = drink.map_or(0.0, |drink| drink.price);
    let fixed = |price: f64| RowClass {
        price: RowPrice::Fixed(price),
        role: RowRole::Plain,
        pool: None,
    };

    let Some(food) = food else {
        return fixed(drink_price);
    };
    let Some((pool_index, rule)) = menu.combo_for_food(&food.category) else {
        return fixed(drink_price + food.price);
    };

    let pool = &menu.pools()[pool_index];
    let secondary_price = pool.secondary_price.unwrap_or(pool.primary_price);
    let food_with_primary = rule.price - pool.primary_price;
    let food_with_secondary = rule.price - secondary_price;

    let (price, role) = match drink {
        None => (
            RowPrice::Variable {
                base: food.price,
                with_primary: food_with_primary,
                with_secondary: food_with_secondary,
            },
            RowRole::NonDrinker,
        ),
        Some(drink) => match pool.role_of(&drink.category) {
            Some(DrinkRole::Primary) => (RowPrice::Fixed(rule.price), RowRole::PrimaryCombo),
            Some(DrinkRole::Secondary) => (
                RowPrice::Variable {
                    base: rule.price,
                    with_primary: rule.discount_price.unwrap_or(rule.price),
                    with_secondary: rule.price,
                },
                RowRole::SecondaryCombo,
            ),
            None => (
                RowPrice::Variable {
                    base: drink.price + food.price,
                    with_primary: drink.price + food_with_primary,
                    with_secondary: drink.price + food_with_secondary,
                },
                RowRole::Drinker,
            ),
        },
    };

    RowClass {
        price,
        role,
        pool: Some(pool_index),
    }
}

fn allocate<'a>(
    pool: &DrinkPool,
    foods: &Counter,
    primary: &Counter,
    secondary: &Counter,
    classes: impl Iterator<Item = &'a RowClass>,
) -> Result<PoolAllocation> {
    let food_total = foods.total();
    let primary_total = primary.total();
    let secondary_total = secondary.total();

    let mut allocation = PoolAllocation {
        pool: pool.name.clone(),
        combos: foods.clone(),
        primary_left: Counter::new(),
        secondary_left: secondary.clone(),
        substituted: 0,
        surcharge: 0.0,
        policy: None,
        share_cents: 0,
        extra_cents: 0,
    };

    if primary_total >= food_total {
        let (_, left) = primary.take_in_order(food_total);
        allocation.primary_left = left;
        return Ok(allocation);
    }

    if primary_total + secondary_total < food_total {
        return Err(Error::InsufficientDrinks {
            pool: pool.name.clone(),
            foods: food_total,
            drinks: primary_total + secondary_total,
        });
    }

    let substituted = food_total - primary_total;
    let (_, secondary_left) = secondary.take_in_order(substituted);

    let mut non_drinkers = 0_u32;
    let mut secondary_combos = 0_u32;
    let mut variable = 0_u32;
    let roles: Vec<RowRole> = classes.map(|class| class.role).collect();
    for role in &roles {
        match role {
            RowRole::NonDrinker => non_drinkers += 1,
            RowRole::SecondaryCombo => secondary_combos += 1,
            _ => {}
        }
        if SurchargePolicy::AllVariable.applies_to(*role) {
            variable += 1;
        }
    }

    let policy = SurchargePolicy::choose(non_drinkers, secondary_combos, substituted);
    let sharers = match policy {
        SurchargePolicy::NonDrinkers => non_drinkers,
        SurchargePolicy::SecondaryCombos => secondary_combos,
        SurchargePolicy::AllVariable => variable,
    };
    let surcharge = f64::from(substituted) * pool.substitution_cost();

    allocation.secondary_left = secondary_left;
    allocation.substituted = substituted;
    allocation.surcharge = surcharge;
    allocation.policy = Some(policy);
    if sharers > 0 {
        let cents = to_cents(surcharge);
        allocation.share_cents = cents / i64::from(sharers);
        allocation.extra_cents = cents % i64::from(sharers);
    }
    Ok(allocation)
}

// `shared` counts, per pool, the sharers already resolved.
fn resolve(class: &RowClass, allocations: &[PoolAllocation], shared: &mut [i64]) -> f64 {
    match class.price {
        RowPrice::Fixed(price) => price,
        RowPrice::Variable { with_primary, .. } => {
            let share = class
                .pool
                .and_then(|pool| {
                    let allocation = allocations.get(pool)?;
                    allocation.policy.filter(|policy| policy.applies_to(class.role))?;
                    let extra = i64::from(shared[pool] < allocation.extra_cents);
                    shared[pool] += 1;
                    Some(allocation.share_cents + extra)
                })
                .unwrap_or_default();
            round_cents(with_primary) + from_cents(share)
        }
    }
}
