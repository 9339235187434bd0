//! Roster configuration - participants seeded into the ledger on startup.
//!
//! The `[[participants]]` tables of `config.toml` list the regulars of the
//! breakfast group. Anyone else joins the ledger the first time they order.

use serde::Deserialize;

/// One roster entry
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ParticipantConfig {
    /// Display name used in orders and the ledger
    pub name: String,
    /// Opening balance carried over from before the bot was used
    #[serde(default)]
    pub balance: f64,
}
