//! Statistics over closed sessions.
//!
//! Everything here reads the archived orders and frozen tickets, so numbers only move
//! when a session is closed. All functions return structured data for the bot layer
//! to format.

use crate::{
    core::{
        catalog::NONE_ITEM,
        session::SessionState,
        tally::{Counter, format_euros, round_cents},
    },
    entities::{Order, Session, TicketLine, order, session, ticket_line},
    errors::Result,
};
use sea_orm::{QueryOrder, prelude::*};
use std::collections::BTreeMap;
use std::fmt::Write;

/// How often each item was ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPopularity {
    /// Drink name to count
    pub drinks: Counter,
    /// Food name to count
    pub foods: Counter,
}

/// How often someone paid and how much.
#[derive(Debug, Clone, PartialEq)]
pub struct PayerStats {
    /// Participant name
    pub name: String,
    /// Sessions paid
    pub times: u32,
    /// Total amount paid
    pub amount: f64,
}

/// What someone consumed over all closed sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantStats {
    /// Participant name
    pub name: String,
    /// Sessions with at least one order
    pub sessions: u32,
    /// Sum of their session charges
    pub spent: f64,
}

/// All statistics shown by the `/stats` command.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    /// Closed sessions counted
    pub sessions: usize,
    /// Item popularity
    pub items: ItemPopularity,
    /// Payers, most frequent first
    pub payers: Vec<PayerStats>,
    /// Participants, biggest spender first
    pub participants: Vec<ParticipantStats>,
}

async fn closed_sessions(db: &DatabaseConnection) -> Result<Vec<session::Model>> {
    Session::find()
        .filter(session::Column::State.eq(SessionState::Closed.as_str()))
        .order_by_asc(session::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Counts drinks and foods ordered in closed sessions, `none` excluded.
pub async fn item_popularity(db: &DatabaseConnection) -> Result<ItemPopularity> {
    let ids: Vec<i64> = closed_sessions(db).await?.iter().map(|s| s.id).collect();
    let orders = Order::find()
        .filter(order::Column::SessionId.is_in(ids))
        .all(db)
        .await?;

    let mut popularity = ItemPopularity::default();
    for order in &orders {
        if order.drink != NONE_ITEM {
            popularity.drinks.add(&order.drink);
        }
        if order.food != NONE_ITEM {
            popularity.foods.add(&order.food);
        }
    }
    Ok(popularity)
}

/// Payment count and amount per payer, most frequent first, then by name.
pub async fn payer_stats(db: &DatabaseConnection) -> Result<Vec<PayerStats>> {
    let mut by_payer: BTreeMap<String, (u32, f64)> = BTreeMap::new();
    for session in closed_sessions(db).await? {
        if let Some(payer) = session.payer {
            let entry = by_payer.entry(payer).or_default();
            entry.0 += 1;
            entry.1 += session.total.unwrap_or_default();
        }
    }

    let mut stats: Vec<PayerStats> = by_payer
        .into_iter()
        .map(|(name, (times, amount))| PayerStats {
            name,
            times,
            amount: round_cents(amount),
        })
        .collect();
    // Stable sort keeps names ascending within a tie
    stats.sort_by(|a, b| b.times.cmp(&a.times));
    Ok(stats)
}

/// Spend and participation per participant, biggest spender first, then by name.
pub async fn participant_stats(db: &DatabaseConnection) -> Result<Vec<ParticipantStats>> {
    let ids: Vec<i64> = closed_sessions(db).await?.iter().map(|s| s.id).collect();
    let debts = TicketLine::find()
        .filter(ticket_line::Column::SessionId.is_in(ids))
        .filter(ticket_line::Column::Kind.eq("debt"))
        .all(db)
        .await?;

    let mut by_name: BTreeMap<String, (u32, f64)> = BTreeMap::new();
    for line in debts {
        let entry = by_name.entry(line.label).or_default();
        entry.0 += 1;
        entry.1 += line.amount.unwrap_or_default();
    }

    let mut stats: Vec<ParticipantStats> = by_name
        .into_iter()
        .map(|(name, (sessions, spent))| ParticipantStats {
            name,
            sessions,
            spent: round_cents(spent),
        })
        .collect();
    stats.sort_by(|a, b| b.spent.total_cmp(&a.spent));
    Ok(stats)
}

/// Gathers every statistic in one call.
pub async fn statistics(db: &DatabaseConnection) -> Result<Statistics> {
    Ok(Statistics {
        sessions: closed_sessions(db).await?.len(),
        items: item_popularity(db).await?,
        payers: payer_stats(db).await?,
        participants: participant_stats(db).await?,
    })
}

fn top_items(counter: &Counter, limit: usize) -> Vec<(&str, u32)> {
    let mut items: Vec<(&str, u32)> = counter.iter().collect();
    items.sort_by(|a, b| b.1.cmp(&a.1));
    items.truncate(limit);
    items
}

/// Renders statistics for a chat message.
#[must_use]
pub fn format_statistics(stats: &Statistics) -> String {
    if stats.sessions == 0 {
        return "No closed sessions yet, nothing to report.".to_string();
    }

    let mut text = format!("📊 **Statistics over {} breakfasts**\n", stats.sessions);

    text.push_str("\n**Favourite drinks**\n");
    for (name, count) in top_items(&stats.items.drinks, 5) {
        let _ = writeln!(text, "• {name}: {count}");
    }
    text.push_str("\n**Favourite foods**\n");
    for (name, count) in top_items(&stats.items.foods, 5) {
        let _ = writeln!(text, "• {name}: {count}");
    }

    text.push_str("\n**Payers**\n");
    for payer in &stats.payers {
        let _ = writeln!(
            text,
            "• {}: {} times, {}",
            payer.name,
            payer.times,
            format_euros(payer.amount)
        );
    }

    text.push_str("\n**Consumption**\n");
    for participant in &stats.participants {
        let _ = writeln!(
            text,
            "• {}: {} in {} breakfasts",
            participant.name,
            format_euros(participant.spent),
            participant.sessions
        );
    }
    text
}
