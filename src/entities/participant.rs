//! Participant entity - One ledger entry per person who ever ordered breakfast.
//!
//! The balance is signed: positive means the participant owes money to the group,
//! negative means they have paid more than they consumed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Participant database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    /// Unique identifier for the participant
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, unique across the ledger
    #[sea_orm(unique)]
    pub name: String,
    /// Running balance in euros, always stored rounded to cents
    pub balance: f64,
    /// Hidden participants keep their balance but are left out of pickers and the podium
    pub is_hidden: bool,
    /// When the participant first appeared
    pub created_at: DateTime,
    /// When the balance or visibility last changed
    pub updated_at: DateTime,
}

/// `Participant` is keyed by name from orders, so it has no foreign keys
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
