//! Session entity - One breakfast round, from the first order to the payment.
//!
//! Exactly one session is live (not closed) at a time. Closed sessions are kept
//! as history together with their orders and frozen ticket lines.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Session database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// Unique identifier for the session
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Lifecycle state: `"open"`, `"ticket_generated"`, `"payer_selected"` or `"closed"`
    pub state: String,
    /// Id, participant, drink and food of every order the frozen ticket was computed from
    pub order_fingerprint: Option<String>,
    /// Participant nominated to pay the whole ticket
    pub payer: Option<String>,
    /// What the terminal charges, set when the ticket is generated
    pub total: Option<f64>,
    /// When the session was opened
    pub opened_at: DateTimeUtc,
    /// When the session was closed, None while live
    pub closed_at: Option<DateTimeUtc>,
}

/// Defines relationships between Session and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One session has many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
    /// One session has many frozen ticket lines
    #[sea_orm(has_many = "super::ticket_line::Entity")]
    TicketLines,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::ticket_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
