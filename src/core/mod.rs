//! Core business logic, independent of Discord.
//!
//! `catalog`, `pricing` and `tally` are pure and never touch the database. The
//! remaining modules persist sessions, orders and the ledger through `SeaORM`.

/// Menu items, combo rules and drink pools
pub mod catalog;
/// Archived sessions
pub mod history;
/// Participants, balances and the payer rotation
pub mod ledger;
/// The combo allocation and price engine
pub mod pricing;
/// Statistics over closed sessions
pub mod report;
/// Session state machine and live orders
pub mod session;
/// Ticket tables and counting helpers
pub mod tally;
