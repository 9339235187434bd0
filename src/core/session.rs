//! Session business logic - the breakfast round from first order to payment.
//!
//! A session moves through `open → ticket_generated → payer_selected → closed`.
//! Orders can only change while the session is open. Generating the ticket freezes
//! the pricing output into `ticket_lines` together with a fingerprint of the orders
//! it was computed from; closing checks that fingerprint, merges the debts into
//! the ledger and opens the next session, all in one database transaction.

use crate::{
    core::{
        catalog::{ItemKind, Menu},
        ledger,
        pricing::{OrderLine, price_orders},
        tally::{Ticket, round_cents},
    },
    entities::{Order, Session, TicketLine, order, session, ticket_line},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{info, warn};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Orders may be added and removed
    Open,
    /// The ticket is frozen and orders are read-only
    TicketGenerated,
    /// Someone has been nominated to pay
    PayerSelected,
    /// Debts merged into the ledger
    Closed,
}

impl SessionState {
    /// Value stored in the `state` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::TicketGenerated => "ticket_generated",
            Self::PayerSelected => "payer_selected",
            Self::Closed => "closed",
        }
    }

    /// Parses the `state` column.
    ///
    /// # Errors
    /// Returns `Error::Config` for a value no version of the bot writes.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "open" => Ok(Self::Open),
            "ticket_generated" => Ok(Self::TicketGenerated),
            "payer_selected" => Ok(Self::PayerSelected),
            "closed" => Ok(Self::Closed),
            other => Err(Error::Config {
                message: format!("unknown session state '{other}'"),
            }),
        }
    }

    /// Whether the state machine allows moving from `self` to `next`.
    #[must_use]
    pub const fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::TicketGenerated)
                | (Self::TicketGenerated | Self::PayerSelected, Self::Open)
                | (Self::TicketGenerated | Self::PayerSelected, Self::PayerSelected)
                | (Self::PayerSelected, Self::Closed)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::TicketGenerated => "waiting for a payer",
            Self::PayerSelected => "waiting to be closed",
            Self::Closed => "closed",
        })
    }
}

/// Everything that happened when a session was closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Closure {
    /// The session as it was closed
    pub session: session::Model,
    /// Who paid
    pub payer: String,
    /// What they paid
    pub total: f64,
    /// Charge added to each participant's balance
    pub charges: BTreeMap<String, f64>,
    /// The fresh session opened right after
    pub next: session::Model,
}

fn state_of(session: &session::Model) -> Result<SessionState> {
    SessionState::parse(&session.state)
}

fn reject(session: &session::Model, state: SessionState, step: &str) -> Error {
    warn!(session_id = session.id, state = state.as_str(), "rejected: {}", step);
    Error::InvalidTransition {
        from: state.to_string(),
        to: step.to_string(),
    }
}

// Orders may only change while the session is open.
fn require_open(session: &session::Model, step: &str) -> Result<()> {
    match state_of(session)? {
        SessionState::Open => Ok(()),
        state => Err(reject(session, state, step)),
    }
}

fn require_transition(session: &session::Model, next: SessionState, step: &str) -> Result<()> {
    let state = state_of(session)?;
    if state.can_become(next) {
        Ok(())
    } else {
        Err(reject(session, state, step))
    }
}

/// Returns the live session, opening a new one if every session is closed.
///
/// # Errors
/// Returns `Error::Database` if the session cannot be read or created.
pub async fn current_session<C>(db: &C) -> Result<session::Model>
where
    C: ConnectionTrait,
{
    let live = Session::find()
        .filter(session::Column::State.ne(SessionState::Closed.as_str()))
        .order_by_desc(session::Column::Id)
        .one(db)
        .await?;
    if let Some(live) = live {
        return Ok(live);
    }
    open_session(db).await
}

async fn open_session<C>(db: &C) -> Result<session::Model>
where
    C: ConnectionTrait,
{
    let session = session::ActiveModel {
        state: Set(SessionState::Open.as_str().to_string()),
        order_fingerprint: Set(None),
        payer: Set(None),
        total: Set(None),
        opened_at: Set(chrono::Utc::now()),
        closed_at: Set(None),
        ..Default::default()
    };
    let session = session.insert(db).await?;
    info!(session_id = session.id, "Opened a new breakfast session");
    Ok(session)
}

/// Adds an order to the live session after checking both items against the menu.
///
/// # Errors
/// Returns `Error::EmptyName` for a blank participant, `Error::UnknownItem` for an
/// item not on the menu and `Error::InvalidTransition` unless the session is open.
pub async fn add_order(
    db: &DatabaseConnection,
    menu: &Menu,
    participant: &str,
    drink: &str,
    food: &str,
) -> Result<order::Model> {
    let participant = participant.trim();
    if participant.is_empty() {
        return Err(Error::EmptyName);
    }
    menu.lookup(drink, ItemKind::Drink)?;
    menu.lookup(food, ItemKind::Food)?;

    let session = current_session(db).await?;
    require_open(&session, "add orders")?;

    let order = order::ActiveModel {
        session_id: Set(session.id),
        participant: Set(participant.to_string()),
        drink: Set(drink.to_string()),
        food: Set(food.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    order.insert(db).await.map_err(Into::into)
}

/// Removes an order from the live session.
///
/// # Errors
/// Returns `Error::InvalidTransition` unless the session is open and
/// `Error::OrderNotFound` if the live session has no order with that id.
pub async fn remove_order(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    let session = current_session(db).await?;
    require_open(&session, "remove orders")?;

    let order = Order::find_by_id(order_id)
        .filter(order::Column::SessionId.eq(session.id))
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;
    order.clone().delete(db).await?;
    Ok(order)
}

/// Orders of a session in the order they were placed.
///
/// # Errors
/// Returns `Error::Database` if the orders cannot be read.
pub async fn list_orders<C>(db: &C, session_id: i64) -> Result<Vec<order::Model>>
where
    C: ConnectionTrait,
{
    Order::find()
        .filter(order::Column::SessionId.eq(session_id))
        .order_by_asc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Converts stored orders into pricing input.
#[must_use]
pub fn order_lines(orders: &[order::Model]) -> Vec<OrderLine> {
    orders
        .iter()
        .map(|order| OrderLine::new(&order.participant, &order.drink, &order.food))
        .collect()
}

/// Identifies the exact order set a ticket was built from.
///
/// Every order contributes `id|participant|drink|food`, sorted by id, so adding,
/// removing or editing an order in place all change the fingerprint.
#[must_use]
pub fn fingerprint(orders: &[order::Model]) -> String {
    let mut sorted: Vec<&order::Model> = orders.iter().collect();
    sorted.sort_unstable_by_key(|order| order.id);
    sorted
        .iter()
        .map(|order| {
            format!(
                "{}|{}|{}|{}",
                order.id, order.participant, order.drink, order.food
            )
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Prices the live orders and freezes the result into the session.
///
/// # Errors
/// Returns `Error::NoOrders` for an empty session and any pricing error
/// (`UnknownItem`, `InsufficientDrinks`) unchanged; the session stays open.
pub async fn generate_ticket(db: &DatabaseConnection, menu: &Menu) -> Result<Ticket> {
    let txn = db.begin().await?;

    let session = current_session(&txn).await?;
    require_transition(&session, SessionState::TicketGenerated, "generate the ticket")?;

    let orders = list_orders(&txn, session.id).await?;
    if orders.is_empty() {
        return Err(Error::NoOrders);
    }
    let priced = price_orders(&order_lines(&orders), menu)?;
    let ticket = priced.ticket;

    let mut lines = Vec::new();
    for (kind, counter) in [("bar", &ticket.bar), ("machine", &ticket.machine)] {
        for (label, count) in counter.iter() {
            lines.push(ticket_line::ActiveModel {
                session_id: Set(session.id),
                kind: Set(kind.to_string()),
                label: Set(label.to_string()),
                quantity: Set(Some(i32::try_from(count)?)),
                amount: Set(None),
                ..Default::default()
            });
        }
    }
    for (name, debt) in &ticket.debts {
        lines.push(ticket_line::ActiveModel {
            session_id: Set(session.id),
            kind: Set("debt".to_string()),
            label: Set(name.clone()),
            quantity: Set(None),
            amount: Set(Some(*debt)),
            ..Default::default()
        });
    }
    TicketLine::insert_many(lines).exec(&txn).await?;

    // What the terminal charges; the debts add up to it to the cent
    let total = priced.machine_total;
    let session_id = session.id;
    let mut session: session::ActiveModel = session.into();
    session.state = Set(SessionState::TicketGenerated.as_str().to_string());
    session.order_fingerprint = Set(Some(fingerprint(&orders)));
    session.total = Set(Some(total));
    session.update(&txn).await?;

    txn.commit().await?;
    info!(session_id, orders = orders.len(), total, "Generated ticket");
    Ok(ticket)
}

/// Rebuilds the frozen ticket of a session from its stored lines.
///
/// # Errors
/// Returns `Error::Database` if the lines cannot be read and `Error::IntConversion`
/// for a negative stored quantity.
pub async fn load_ticket<C>(db: &C, session_id: i64) -> Result<Ticket>
where
    C: ConnectionTrait,
{
    let lines = TicketLine::find()
        .filter(ticket_line::Column::SessionId.eq(session_id))
        .order_by_asc(ticket_line::Column::Id)
        .all(db)
        .await?;

    let mut ticket = Ticket::default();
    for line in lines {
        let count = u32::try_from(line.quantity.unwrap_or_default())?;
        match line.kind.as_str() {
            "bar" => ticket.bar.add_n(&line.label, count),
            "machine" => ticket.machine.add_n(&line.label, count),
            _ => {
                ticket
                    .debts
                    .insert(line.label, line.amount.unwrap_or_default());
            }
        }
    }
    Ok(ticket)
}

/// Discards the frozen ticket and returns the session to open.
///
/// # Errors
/// Returns `Error::InvalidTransition` while the session is still open.
pub async fn reopen(db: &DatabaseConnection) -> Result<session::Model> {
    let txn = db.begin().await?;

    let session = current_session(&txn).await?;
    require_transition(&session, SessionState::Open, "reopen the orders")?;

    TicketLine::delete_many()
        .filter(ticket_line::Column::SessionId.eq(session.id))
        .exec(&txn)
        .await?;

    let mut session: session::ActiveModel = session.into();
    session.state = Set(SessionState::Open.as_str().to_string());
    session.order_fingerprint = Set(None);
    session.payer = Set(None);
    session.total = Set(None);
    let session = session.update(&txn).await?;

    txn.commit().await?;
    info!(session_id = session.id, "Reopened session, ticket discarded");
    Ok(session)
}

/// Nominates who pays the ticket. May be called again to change the payer.
///
/// # Errors
/// Returns `Error::EmptyName` for a blank name and `Error::InvalidTransition`
/// until a ticket has been generated.
pub async fn select_payer(db: &DatabaseConnection, name: &str) -> Result<session::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    let session = current_session(db).await?;
    require_transition(&session, SessionState::PayerSelected, "select a payer")?;

    let mut session: session::ActiveModel = session.into();
    session.state = Set(SessionState::PayerSelected.as_str().to_string());
    session.payer = Set(Some(name.to_string()));
    session.update(db).await.map_err(Into::into)
}

/// Participants with at least one order in the live session, sorted by name.
///
/// # Errors
/// Returns `Error::Database` if the orders cannot be read.
pub async fn present_participants(db: &DatabaseConnection) -> Result<Vec<String>> {
    let session = current_session(db).await?;
    let names: BTreeSet<String> = list_orders(db, session.id)
        .await?
        .into_iter()
        .map(|order| order.participant)
        .collect();
    Ok(names.into_iter().collect())
}

/// Suggests the present participant with the highest balance as payer.
///
/// # Errors
/// Returns `Error::Database` if the orders or the ledger cannot be read.
pub async fn suggest_payer(db: &DatabaseConnection) -> Result<Option<String>> {
    let present = present_participants(db).await?;
    ledger::suggest_payer(db, present.iter().map(String::as_str)).await
}

/// Closes the session: merges the frozen debts into the ledger and opens the next one.
///
/// # Errors
/// Returns `Error::InvalidTransition` unless a payer has been selected, and
/// `Error::StaleTicket` if the live orders no longer match the frozen ticket. Nothing
/// is written in either case.
pub async fn close_session(db: &DatabaseConnection) -> Result<Closure> {
    let txn = db.begin().await?;

    let session = current_session(&txn).await?;
    require_transition(&session, SessionState::Closed, "close the session")?;

    let orders = list_orders(&txn, session.id).await?;
    if session.order_fingerprint.as_deref() != Some(fingerprint(&orders).as_str()) {
        warn!(session_id = session.id, "Refusing to close a stale ticket");
        return Err(Error::StaleTicket {
            session_id: session.id,
        });
    }

    let ticket = load_ticket(&txn, session.id).await?;
    let payer = session.payer.clone().unwrap_or_default();
    let total = round_cents(session.total.unwrap_or_else(|| ticket.total()));

    for (name, charge) in &ticket.debts {
        ledger::apply_balance_delta(&txn, name, *charge).await?;
    }
    ledger::apply_balance_delta(&txn, &payer, -total).await?;

    let mut closing: session::ActiveModel = session.into();
    closing.state = Set(SessionState::Closed.as_str().to_string());
    closing.closed_at = Set(Some(chrono::Utc::now()));
    let closed = closing.update(&txn).await?;
    let next = open_session(&txn).await?;

    txn.commit().await?;
    info!(
        session_id = closed.id,
        payer = %payer,
        total,
        "Closed session and updated the ledger"
    );

    Ok(Closure {
        session: closed,
        payer,
        total,
        charges: ticket.debts,
        next,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        core::{catalog::NONE_ITEM, ledger::get_participant},
        test_utils::{place_order, sample_menu, setup_test_db},
    };

    #[test]
    fn test_state_machine_edges() {
        use SessionState::{Closed, Open, PayerSelected, TicketGenerated};

        assert!(Open.can_become(TicketGenerated));
        assert!(TicketGenerated.can_become(PayerSelected));
        assert!(PayerSelected.can_become(PayerSelected));
        assert!(PayerSelected.can_become(Closed));
        assert!(TicketGenerated.can_become(Open));
        assert!(PayerSelected.can_become(Open));

        assert!(!Open.can_become(PayerSelected));
        assert!(!Open.can_become(Closed));
        assert!(!TicketGenerated.can_become(Closed));
        assert!(!Closed.can_become(Open));

        for state in [Open, TicketGenerated, PayerSelected, Closed] {
            assert_eq!(SessionState::parse(state.as_str()).unwrap(), state);
        }
        assert!(SessionState::parse("paid").is_err());
    }

    #[test]
    fn test_fingerprint_is_sorted() {
        let at = chrono::Utc::now();
        let orders: Vec<order::Model> = [7, 2, 11]
            .into_iter()
            .map(|id| order::Model {
                id,
                session_id: 1,
                participant: "Ana".to_string(),
                drink: NONE_ITEM.to_string(),
                food: NONE_ITEM.to_string(),
                created_at: at,
            })
            .collect();
        assert_eq!(
            fingerprint(&orders),
            "2|Ana|none|none;7|Ana|none|none;11|Ana|none|none"
        );
        assert_eq!(fingerprint(&[]), "");

        let mut edited = orders.clone();
        edited[0].food = "Yogurt".to_string();
        assert_ne!(fingerprint(&orders), fingerprint(&edited));
    }

    #[tokio::test]
    async fn test_current_session_is_created_once() -> Result<()> {
        let db = setup_test_db().await?;

        let first = current_session(&db).await?;
        let again = current_session(&db).await?;
        assert_eq!(first.id, again.id);
        assert_eq!(first.state, "open");
        Ok(())
    }

    #[tokio::test]
    async fn test_add_and_remove_orders() -> Result<()> {
        let db = setup_test_db().await?;

        let order = place_order(&db, " Ana ", "Cortado", "Barrita aceite").await?;
        assert_eq!(order.participant, "Ana");
        place_order(&db, "Luis", "Té", NONE_ITEM).await?;

        let session = current_session(&db).await?;
        assert_eq!(list_orders(&db, session.id).await?.len(), 2);

        remove_order(&db, order.id).await?;
        let orders = list_orders(&db, session.id).await?;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].participant, "Luis");

        let result = remove_order(&db, order.id).await;
        assert!(matches!(result.unwrap_err(), Error::OrderNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_order_validates_items() -> Result<()> {
        let db = setup_test_db().await?;

        let result = place_order(&db, "Ana", "Mocha", NONE_ITEM).await;
        assert!(matches!(result.unwrap_err(), Error::UnknownItem { .. }));

        let result = place_order(&db, "Ana", "Tortilla", NONE_ITEM).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::UnknownItem { slot: "drink", .. }
        ));

        let result = place_order(&db, "  ", "Cortado", NONE_ITEM).await;
        assert!(matches!(result.unwrap_err(), Error::EmptyName));

        let session = current_session(&db).await?;
        assert!(list_orders(&db, session.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_ticket_freezes_orders() -> Result<()> {
        let db = setup_test_db().await?;
        let menu = sample_menu();

        let result = generate_ticket(&db, &menu).await;
        assert!(matches!(result.unwrap_err(), Error::NoOrders));

        place_order(&db, "Ana", "Cortado", NONE_ITEM).await?;
        place_order(&db, "Luis", "Italiano", NONE_ITEM).await?;
        place_order(&db, "Marta", NONE_ITEM, "Barrita aceite").await?;
        place_order(&db, "Pablo", NONE_ITEM, "Napolitana de chocolate").await?;

        let ticket = generate_ticket(&db, &menu).await?;
        assert_eq!(ticket.total(), 3.7);

        let session = current_session(&db).await?;
        assert_eq!(session.state, "ticket_generated");
        assert_eq!(session.total, Some(3.7));
        assert_eq!(load_ticket(&db, session.id).await?, ticket);

        // Orders are read-only until the session is reopened
        let result = place_order(&db, "Sara", "Té", NONE_ITEM).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTransition { .. }
        ));
        let result = generate_ticket(&db, &menu).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTransition { .. }
        ));

        let reopened = reopen(&db).await?;
        assert_eq!(reopened.state, "open");
        assert_eq!(reopened.total, None);
        assert_eq!(load_ticket(&db, session.id).await?, Ticket::default());
        place_order(&db, "Sara", "Té", NONE_ITEM).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_pricing_keeps_session_open() -> Result<()> {
        let db = setup_test_db().await?;
        place_order(&db, "A", "Cortado", "Barrita aceite").await?;
        place_order(&db, "B", NONE_ITEM, "Barrita tomate").await?;

        let result = generate_ticket(&db, &sample_menu()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientDrinks { .. }
        ));

        let session = current_session(&db).await?;
        assert_eq!(session.state, "open");
        assert!(load_ticket(&db, session.id).await?.debts.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_payer_requires_ticket() -> Result<()> {
        let db = setup_test_db().await?;
        place_order(&db, "Ana", "Cortado", NONE_ITEM).await?;

        let result = select_payer(&db, "Ana").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTransition { .. }
        ));
        let result = close_session(&db).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTransition { .. }
        ));

        generate_ticket(&db, &sample_menu()).await?;
        select_payer(&db, "Luis").await?;
        let session = select_payer(&db, "Ana").await?;
        assert_eq!(session.state, "payer_selected");
        assert_eq!(session.payer.as_deref(), Some("Ana"));
        Ok(())
    }

    #[tokio::test]
    async fn test_close_session_updates_ledger() -> Result<()> {
        let db = setup_test_db().await?;
        ledger::add_participant(&db, "Ana", 2.0).await?;
        ledger::add_participant(&db, "Luis", -1.0).await?;
        ledger::add_participant(&db, "Sara", 0.5).await?;
        let before = ledger::total_balance(&db).await?;

        place_order(&db, "Ana", "Cortado", NONE_ITEM).await?;
        place_order(&db, "Luis", "Té", NONE_ITEM).await?;
        place_order(&db, "Marta", NONE_ITEM, "Barrita aceite").await?;
        place_order(&db, "Pablo", NONE_ITEM, "Napolitana de chocolate").await?;
        let ticket = generate_ticket(&db, &sample_menu()).await?;

        assert_eq!(suggest_payer(&db).await?.as_deref(), Some("Ana"));
        select_payer(&db, "Ana").await?;
        let closure = close_session(&db).await?;

        assert_eq!(closure.payer, "Ana");
        assert_eq!(closure.total, 3.7);
        assert_eq!(closure.charges, ticket.debts);
        assert_eq!(closure.session.state, "closed");
        assert!(closure.session.closed_at.is_some());
        assert_eq!(closure.next.state, "open");
        assert_ne!(closure.next.id, closure.session.id);

        // Ana paid 3.70 for a 1.20 coffee
        assert_eq!(get_participant(&db, "Ana").await?.unwrap().balance, -0.5);
        assert_eq!(get_participant(&db, "Luis").await?.unwrap().balance, -0.1);
        // Newcomers join the ledger on their first session
        assert_eq!(get_participant(&db, "Marta").await?.unwrap().balance, 0.8);
        assert_eq!(get_participant(&db, "Sara").await?.unwrap().balance, 0.5);

        let after = ledger::total_balance(&db).await?;
        let charges: f64 = closure.charges.values().sum();
        assert!((before + charges - closure.total - after).abs() < 1e-9);

        // The new session starts empty
        assert!(list_orders(&db, closure.next.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_close_is_one_shot() -> Result<()> {
        let db = setup_test_db().await?;
        place_order(&db, "Ana", "Cortado", NONE_ITEM).await?;
        generate_ticket(&db, &sample_menu()).await?;
        select_payer(&db, "Ana").await?;
        close_session(&db).await?;

        let result = close_session(&db).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTransition { .. }
        ));
        assert_eq!(get_participant(&db, "Ana").await?.unwrap().balance, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_ticket_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        place_order(&db, "Ana", "Cortado", NONE_ITEM).await?;
        generate_ticket(&db, &sample_menu()).await?;
        select_payer(&db, "Ana").await?;

        // An order written behind the state machine's back
        let session = current_session(&db).await?;
        order::ActiveModel {
            session_id: Set(session.id),
            participant: Set("Luis".to_string()),
            drink: Set("Té".to_string()),
            food: Set(NONE_ITEM.to_string()),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let result = close_session(&db).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::StaleTicket { session_id } if session_id == session.id
        ));
        assert!(get_participant(&db, "Ana").await?.is_none());
        assert_eq!(current_session(&db).await?.state, "payer_selected");
        Ok(())
    }

    #[tokio::test]
    async fn test_order_edited_in_place_makes_ticket_stale() -> Result<()> {
        let db = setup_test_db().await?;
        let placed = place_order(&db, "Ana", "Cortado", NONE_ITEM).await?;
        let ticket = generate_ticket(&db, &sample_menu()).await?;
        assert_eq!(ticket.total(), 1.2);
        select_payer(&db, "Luis").await?;

        // Same id, different food: the frozen 1.20 € no longer describes the order
        let mut edited: order::ActiveModel = placed.into();
        edited.food = Set("Croissant plancha".to_string());
        edited.update(&db).await?;

        let session = current_session(&db).await?;
        let result = close_session(&db).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::StaleTicket { session_id } if session_id == session.id
        ));
        assert!(get_participant(&db, "Ana").await?.is_none());
        assert!(get_participant(&db, "Luis").await?.is_none());

        // Regenerating prices the edited order
        reopen(&db).await?;
        let ticket = generate_ticket(&db, &sample_menu()).await?;
        assert_eq!(ticket.debts["Ana"], 2.5);
        Ok(())
    }
}
