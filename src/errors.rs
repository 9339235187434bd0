//! Unified error type for `BreakfastBuddy`.
//!
//! Every layer (menu loading, pricing, ledger, bot) returns [`Result`], so a failure
//! anywhere can be propagated with `?` and reported once by the bot's error hook.

use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration (menu, roster, environment).
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Any failure reported by the database layer.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// An order references an item that is not on the menu.
    #[error("Unknown {slot} '{name}': not on the menu")]
    UnknownItem {
        /// The name that was looked up
        name: String,
        /// Which slot of the order referenced it ("drink" or "food")
        slot: &'static str,
    },

    /// There are more combinable foods than drinks able to back a combo.
    #[error(
        "Not enough drinks for the '{pool}' combos: {foods} combinable foods but only {drinks} eligible drinks"
    )]
    InsufficientDrinks {
        /// Name of the drink pool that could not be allocated
        pool: String,
        /// Combinable foods in the pool
        foods: u32,
        /// Primary plus secondary drinks in the pool
        drinks: u32,
    },

    /// A participant with this name is already in the ledger.
    #[error("Participant '{name}' already exists")]
    DuplicateParticipant {
        /// The duplicated name
        name: String,
    },

    /// No ledger entry for this name.
    #[error("Participant '{name}' not found")]
    ParticipantNotFound {
        /// The name that was looked up
        name: String,
    },

    /// The frozen ticket no longer matches the live orders of the session.
    #[error("Ticket for session {session_id} is stale, generate it again")]
    StaleTicket {
        /// Session whose ticket is stale
        session_id: i64,
    },

    /// The session is not in a state that allows the requested step.
    #[error("Cannot {to} while the session is {from}")]
    InvalidTransition {
        /// Current state
        from: String,
        /// Requested step
        to: String,
    },

    /// A ticket was requested for a session without orders.
    #[error("There are no orders in the current session")]
    NoOrders,

    /// No order with this id in the live session.
    #[error("Order {id} not found in the current session")]
    OrderNotFound {
        /// The order id that was looked up
        id: i64,
    },

    /// Amount is not a finite number.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Participant names cannot be blank.
    #[error("Participant name cannot be empty")]
    EmptyName,

    /// File system failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Integer conversion overflow.
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),

    /// Serenity/Poise failure while talking to Discord.
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Whether the error was caused by the request itself and should be shown to the
    /// user, rather than logged as a failure of the bot.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownItem { .. }
                | Self::InsufficientDrinks { .. }
                | Self::DuplicateParticipant { .. }
                | Self::ParticipantNotFound { .. }
                | Self::StaleTicket { .. }
                | Self::InvalidTransition { .. }
                | Self::NoOrders
                | Self::OrderNotFound { .. }
                | Self::InvalidAmount { .. }
                | Self::EmptyName
        )
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
