//! Database configuration module for `BreakfastBuddy`.
//!
//! Handles the `SQLite` connection and creates the tables from the entity definitions
//! with `SeaORM`'s `Schema::create_table_from_entity`, so the schema always matches
//! the Rust structs without hand-written SQL.

use crate::entities::{Order, Participant, Session, TicketLine};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::info;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/breakfast_buddy.sqlite?mode=rwc";

/// Gets the database URL from `DATABASE_URL`, falling back to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();

    // SQLite creates the file but not its directory
    if let Some(path) = database_url.strip_prefix("sqlite://") {
        let file = path.split('?').next().unwrap_or_default();
        if let Some(parent) = std::path::Path::new(file).parent() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::connect(&database_url).await?;
    info!("Connected to {}", database_url);
    Ok(db)
}

/// Creates every table that does not exist yet.
///
/// Safe to call on each startup: existing tables and their rows are left alone.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut participant_table = schema.create_table_from_entity(Participant);
    let mut session_table = schema.create_table_from_entity(Session);
    let mut order_table = schema.create_table_from_entity(Order);
    let mut ticket_line_table = schema.create_table_from_entity(TicketLine);

    for table in [
        participant_table.if_not_exists(),
        session_table.if_not_exists(),
        order_table.if_not_exists(),
        ticket_line_table.if_not_exists(),
    ] {
        db.execute(builder.build(&*table)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{OrderModel, ParticipantModel, SessionModel, TicketLineModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<ParticipantModel> = Participant::find().limit(1).all(&db).await?;
        let _: Vec<SessionModel> = Session::find().limit(1).all(&db).await?;
        let _: Vec<OrderModel> = Order::find().limit(1).all(&db).await?;
        let _: Vec<TicketLineModel> = TicketLine::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_twice() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
