//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod order;
pub mod participant;
pub mod session;
pub mod ticket_line;

// Re-export specific types to avoid conflicts
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use participant::{
    Column as ParticipantColumn, Entity as Participant, Model as ParticipantModel,
};
pub use session::{Column as SessionColumn, Entity as Session, Model as SessionModel};
pub use ticket_line::{
    Column as TicketLineColumn, Entity as TicketLine, Model as TicketLineModel,
};
