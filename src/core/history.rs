//! History of closed sessions.
//!
//! Closed sessions keep their orders and frozen ticket, so any past breakfast can be
//! shown exactly as it was paid.

use crate::{
    core::session::{SessionState, list_orders, load_ticket},
    core::tally::{Ticket, format_euros},
    entities::{Session, order, session},
    errors::Result,
};
use sea_orm::{QueryOrder, QuerySelect, prelude::*};
use std::fmt::Write;

/// A closed session with everything needed to display it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    /// The session row
    pub session: session::Model,
    /// Orders placed in the session
    pub orders: Vec<order::Model>,
    /// Frozen ticket
    pub ticket: Ticket,
}

/// Closed sessions, newest first.
pub async fn recent_sessions(db: &DatabaseConnection, limit: u64) -> Result<Vec<SessionRecord>> {
    let sessions = Session::find()
        .filter(session::Column::State.eq(SessionState::Closed.as_str()))
        .order_by_desc(session::Column::Id)
        .limit(limit)
        .all(db)
        .await?;

    let mut records = Vec::with_capacity(sessions.len());
    for session in sessions {
        let orders = list_orders(db, session.id).await?;
        let ticket = load_ticket(db, session.id).await?;
        records.push(SessionRecord {
            session,
            orders,
            ticket,
        });
    }
    Ok(records)
}

/// One summary line per session: date, payer, total and who took part.
#[must_use]
pub fn format_history(records: &[SessionRecord]) -> String {
    if records.is_empty() {
        return "No breakfast has been closed yet.".to_string();
    }

    let mut text = String::new();
    for record in records {
        let date = record
            .session
            .closed_at
            .unwrap_or(record.session.opened_at)
            .format("%Y-%m-%d");
        let participants: Vec<&str> = record.ticket.participants().collect();
        let _ = writeln!(
            text,
            "**{date}** - {} paid {} ({})",
            record.session.payer.as_deref().unwrap_or("nobody"),
            format_euros(record.session.total.unwrap_or_else(|| record.ticket.total())),
            participants.join(", ")
        );
    }
    text
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        core::{catalog::NONE_ITEM, session},
        test_utils::{place_order, sample_menu, setup_test_db},
    };

    async fn run_session(
        db: &DatabaseConnection,
        payer: &str,
        orders: &[(&str, &str, &str)],
    ) -> Result<()> {
        for (participant, drink, food) in orders {
            place_order(db, participant, drink, food).await?;
        }
        session::generate_ticket(db, &sample_menu()).await?;
        session::select_payer(db, payer).await?;
        session::close_session(db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_recent_sessions_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(recent_sessions(&db, 5).await?.is_empty());

        run_session(&db, "Ana", &[("Ana", "Cortado", NONE_ITEM)]).await?;
        run_session(
            &db,
            "Luis",
            &[("Luis", "Té", NONE_ITEM), ("Marta", "Cortado", "Barrita aceite")],
        )
        .await?;
        // The live session is not history
        place_order(&db, "Sara", "Té", NONE_ITEM).await?;

        let records = recent_sessions(&db, 5).await?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].session.payer.as_deref(), Some("Luis"));
        assert_eq!(records[0].orders.len(), 2);
        assert_eq!(records[0].ticket.total(), 2.75);
        assert_eq!(records[1].session.payer.as_deref(), Some("Ana"));

        let limited = recent_sessions(&db, 1).await?;
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].session.id, records[0].session.id);

        let text = format_history(&records);
        assert!(text.contains("Luis paid 2.75 € (Luis, Marta)"));
        assert!(text.contains("Ana paid 1.20 € (Ana)"));
        Ok(())
    }
}
