//! Ticket tables and the counting helpers used to build them.
//!
//! All tables are keyed by `BTreeMap`, so iterating a ticket always yields names in
//! sorted order regardless of how the orders arrived.

use std::collections::BTreeMap;
use std::fmt::Write;

/// Rounds a euro amount to cents.
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Converts a euro amount to whole cents.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Converts whole cents back to euros.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Formats an amount as euros with two decimals, e.g. `"1.85 €"`.
#[must_use]
pub fn format_euros(amount: f64) -> String {
    format!("{amount:.2} €")
}

/// Formats a ledger balance with an explicit sign, e.g. `"+3.10 €"` or `"-0.45 €"`.
#[must_use]
pub fn format_balance(balance: f64) -> String {
    let rounded = round_cents(balance);
    if rounded > 0.0 {
        format!("+{rounded:.2} €")
    } else if rounded < 0.0 {
        format!("-{:.2} €", rounded.abs())
    } else {
        "0.00 €".to_string()
    }
}

/// Multiset of names with their counts, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counter(BTreeMap<String, u32>);

impl Counter {
    /// Creates an empty counter.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds one occurrence of `name`.
    pub fn add(&mut self, name: &str) {
        self.add_n(name, 1);
    }

    /// Adds `count` occurrences of `name`. Zero counts are not recorded.
    pub fn add_n(&mut self, name: &str, count: u32) {
        if count > 0 {
            *self.0.entry(name.to_string()).or_default() += count;
        }
    }

    /// Count recorded for `name`, zero if absent.
    #[must_use]
    pub fn get(&self, name: &str) -> u32 {
        self.0.get(name).copied().unwrap_or_default()
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    /// Whether nothing has been counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(name, &count)| (name.as_str(), count))
    }

    /// Takes up to `amount` occurrences, draining names in sorted order.
    ///
    /// Returns what was taken and what is left. The split only depends on the counts,
    /// never on the order occurrences were added in.
    #[must_use]
    pub fn take_in_order(&self, amount: u32) -> (Self, Self) {
        let mut remaining = amount;
        let mut taken = Self::new();
        let mut left = Self::new();
        for (name, count) in self.iter() {
            let used = count.min(remaining);
            remaining -= used;
            taken.add_n(name, used);
            left.add_n(name, count - used);
        }
        (taken, left)
    }
}

impl FromIterator<(String, u32)> for Counter {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        let mut counter = Self::new();
        for (name, count) in iter {
            counter.add_n(&name, count);
        }
        counter
    }
}

/// The three tables produced for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ticket {
    /// Raw items to ask for at the counter
    pub bar: Counter,
    /// Lines to key into the payment terminal
    pub machine: Counter,
    /// What each participant owes for this session, rounded to cents
    pub debts: BTreeMap<String, f64>,
}

impl Ticket {
    /// Session total: the sum of every participant's debt.
    #[must_use]
    pub fn total(&self) -> f64 {
        round_cents(self.debts.values().sum())
    }

    /// Participants present in the session, sorted by name.
    pub fn participants(&self) -> impl Iterator<Item = &str> {
        self.debts.keys().map(String::as_str)
    }
}

/// Renders a ticket as plain text for chat messages.
#[must_use]
pub fn format_ticket(ticket: &Ticket) -> String {
    let mut text = String::from("**Ask at the bar**\n");
    for (item, count) in ticket.bar.iter() {
        let _ = writeln!(text, "• {count} × {item}");
    }

    text.push_str("\n**Key into the machine**\n");
    for (label, count) in ticket.machine.iter() {
        let _ = writeln!(text, "• {count} × {label}");
    }

    text.push_str("\n**Debts**\n");
    for (name, debt) in &ticket.debts {
        let _ = writeln!(text, "• {name}: {}", format_euros(*debt));
    }

    let _ = write!(text, "\n**Total:** {}", format_euros(ticket.total()));
    text
}
