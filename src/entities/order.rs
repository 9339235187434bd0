//! Order entity - One (drink, food) selection submitted by a participant.
//!
//! Orders are immutable once saved. A participant may submit several orders in the
//! same session; they are priced independently and summed in the debts ticket.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Session the order belongs to
    pub session_id: i64,
    /// Name of the participant who ordered
    pub participant: String,
    /// Drink item name, or `"none"`
    pub drink: String,
    /// Food item name, or `"none"`
    pub food: String,
    /// When the order was submitted
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one session
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
