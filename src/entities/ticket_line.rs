//! Ticket line entity - A frozen row of a generated ticket.
//!
//! `kind` is `"bar"` or `"machine"` for tally rows (with `quantity`), or `"debt"`
//! for per-participant charges (with `amount`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ticket line database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ticket_lines")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Session whose ticket this line belongs to
    pub session_id: i64,
    /// Which table of the ticket: `"bar"`, `"machine"` or `"debt"`
    pub kind: String,
    /// Item name, machine label or participant name
    pub label: String,
    /// Item count for bar and machine lines
    pub quantity: Option<i32>,
    /// Charge in euros for debt lines
    pub amount: Option<f64>,
}

/// Defines relationships between `TicketLine` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one session
    #[sea_orm(
        belongs_to = "super::session::Entity",
        from = "Column::SessionId",
        to = "super::session::Column::Id"
    )]
    Session,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
