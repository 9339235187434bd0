//! Ledger business logic - participants and their running balances.
//!
//! A positive balance means the participant owes money to the group. Closing a
//! session adds every participant's charge to their balance and takes the total
//! off the payer's, so whoever has the highest balance is the natural next payer.
//! Balances are rounded to cents on every update.

use crate::{
    config::participants::ParticipantConfig,
    core::tally::round_cents,
    entities::{Participant, participant},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Finds a participant by exact name.
pub async fn get_participant<C>(db: &C, name: &str) -> Result<Option<participant::Model>>
where
    C: ConnectionTrait,
{
    Participant::find()
        .filter(participant::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists participants ordered by name, optionally including hidden ones.
pub async fn list_participants(
    db: &DatabaseConnection,
    include_hidden: bool,
) -> Result<Vec<participant::Model>> {
    let mut query = Participant::find();
    if !include_hidden {
        query = query.filter(participant::Column::IsHidden.eq(false));
    }
    query
        .order_by_asc(participant::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a participant to the ledger.
///
/// # Errors
/// Returns `Error::EmptyName` for a blank name, `Error::InvalidAmount` for a
/// non-finite balance and `Error::DuplicateParticipant` if the name is taken.
pub async fn add_participant<C>(db: &C, name: &str, balance: f64) -> Result<participant::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName);
    }
    if !balance.is_finite() {
        return Err(Error::InvalidAmount { amount: balance });
    }
    if get_participant(db, name).await?.is_some() {
        return Err(Error::DuplicateParticipant {
            name: name.to_string(),
        });
    }

    let now = chrono::Utc::now().naive_utc();
    let participant = participant::ActiveModel {
        name: Set(name.to_string()),
        balance: Set(round_cents(balance)),
        is_hidden: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = participant.insert(db).await?;
    Ok(result)
}

/// Hides or shows a participant. Hidden participants keep their balance.
pub async fn set_participant_hidden(
    db: &DatabaseConnection,
    name: &str,
    hidden: bool,
) -> Result<participant::Model> {
    let existing = get_participant(db, name)
        .await?
        .ok_or_else(|| Error::ParticipantNotFound {
            name: name.to_string(),
        })?;

    let mut participant: participant::ActiveModel = existing.into();
    participant.is_hidden = Set(hidden);
    participant.updated_at = Set(chrono::Utc::now().naive_utc());
    participant.update(db).await.map_err(Into::into)
}

/// Inserts roster entries that are not in the ledger yet.
///
/// Existing participants are left untouched, so restarting the bot never resets a
/// balance. Returns how many participants were added.
pub async fn seed_participants(
    db: &DatabaseConnection,
    roster: &[ParticipantConfig],
) -> Result<usize> {
    let mut added = 0;
    for entry in roster {
        if get_participant(db, entry.name.trim()).await?.is_none() {
            add_participant(db, &entry.name, entry.balance).await?;
            added += 1;
        }
    }
    if added > 0 {
        info!("Seeded {} participants into the ledger", added);
    }
    Ok(added)
}

/// Adds `delta` to a participant's balance, creating the entry on first appearance.
///
/// Runs inside the caller's transaction when given one.
pub async fn apply_balance_delta<C>(db: &C, name: &str, delta: f64) -> Result<participant::Model>
where
    C: ConnectionTrait,
{
    if !delta.is_finite() {
        return Err(Error::InvalidAmount { amount: delta });
    }

    let Some(existing) = get_participant(db, name).await? else {
        return add_participant(db, name, delta).await;
    };

    let balance = round_cents(existing.balance + delta);
    let mut participant: participant::ActiveModel = existing.into();
    participant.balance = Set(balance);
    participant.updated_at = Set(chrono::Utc::now().naive_utc());
    participant.update(db).await.map_err(Into::into)
}

/// Visible participants sorted by balance (highest debt first), then by name.
pub async fn podium(db: &DatabaseConnection) -> Result<Vec<participant::Model>> {
    Participant::find()
        .filter(participant::Column::IsHidden.eq(false))
        .order_by_desc(participant::Column::Balance)
        .order_by_asc(participant::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Picks who should pay next among `present`: the highest balance wins.
///
/// Names missing from the ledger count as a zero balance. Ties go to the name that
/// sorts first. Returns `None` when nobody is present.
pub async fn suggest_payer<'a, I>(db: &DatabaseConnection, present: I) -> Result<Option<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(f64, String)> = None;
    for name in present {
        let balance = get_participant(db, name)
            .await?
            .map_or(0.0, |participant| participant.balance);
        let better = match &best {
            None => true,
            Some((top, top_name)) => balance
                .total_cmp(top)
                .then_with(|| top_name.as_str().cmp(name))
                .is_gt(),
        };
        if better {
            best = Some((balance, name.to_string()));
        }
    }
    Ok(best.map(|(_, name)| name))
}

/// Sum of every balance in the ledger, hidden participants included.
pub async fn total_balance(db: &DatabaseConnection) -> Result<f64> {
    let participants = list_participants(db, true).await?;
    Ok(round_cents(
        participants.iter().map(|participant| participant.balance).sum(),
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_add_participant() -> Result<()> {
        let db = setup_test_db().await?;

        let ana = add_participant(&db, "  Ana ", 1.234).await?;
        assert_eq!(ana.name, "Ana");
        assert_eq!(ana.balance, 1.23);
        assert!(!ana.is_hidden);

        let result = add_participant(&db, "Ana", 0.0).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::DuplicateParticipant { name } if name == "Ana"
        ));

        let result = add_participant(&db, "   ", 0.0).await;
        assert!(matches!(result.unwrap_err(), Error::EmptyName));

        let result = add_participant(&db, "Luis", f64::NAN).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_hidden_participants_leave_podium() -> Result<()> {
        let db = setup_test_db().await?;
        add_participant(&db, "Ana", 2.0).await?;
        add_participant(&db, "Luis", 5.0).await?;
        add_participant(&db, "Marta", 2.0).await?;

        let names: Vec<_> = podium(&db).await?.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Luis", "Ana", "Marta"]);

        let luis = set_participant_hidden(&db, "Luis", true).await?;
        assert!(luis.is_hidden);
        assert_eq!(luis.balance, 5.0);

        let names: Vec<_> = podium(&db).await?.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Ana", "Marta"]);
        assert_eq!(list_participants(&db, false).await?.len(), 2);
        assert_eq!(list_participants(&db, true).await?.len(), 3);

        let result = set_participant_hidden(&db, "Pablo", true).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ParticipantNotFound { .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_keeps_existing_balances() -> Result<()> {
        let db = setup_test_db().await?;
        add_participant(&db, "Ana", 4.5).await?;

        let roster = vec![
            ParticipantConfig {
                name: "Ana".to_string(),
                balance: 0.0,
            },
            ParticipantConfig {
                name: "Luis".to_string(),
                balance: -1.0,
            },
        ];
        assert_eq!(seed_participants(&db, &roster).await?, 1);
        assert_eq!(seed_participants(&db, &roster).await?, 0);

        assert_eq!(get_participant(&db, "Ana").await?.unwrap().balance, 4.5);
        assert_eq!(get_participant(&db, "Luis").await?.unwrap().balance, -1.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_apply_balance_delta_rounds_and_creates() -> Result<()> {
        let db = setup_test_db().await?;

        let pablo = apply_balance_delta(&db, "Pablo", 0.65).await?;
        assert_eq!(pablo.balance, 0.65);

        let pablo = apply_balance_delta(&db, "Pablo", 0.1 + 0.2).await?;
        assert_eq!(pablo.balance, 0.95);

        let pablo = apply_balance_delta(&db, "Pablo", -3.0).await?;
        assert_eq!(pablo.balance, -2.05);
        Ok(())
    }

    #[tokio::test]
    async fn test_suggest_payer_prefers_highest_balance() -> Result<()> {
        let db = setup_test_db().await?;
        add_participant(&db, "Ana", 3.0).await?;
        add_participant(&db, "Luis", 3.0).await?;
        add_participant(&db, "Marta", 7.0).await?;

        let payer = suggest_payer(&db, ["Luis", "Ana", "Marta"]).await?;
        assert_eq!(payer.as_deref(), Some("Marta"));

        // Ties go to the first name
        let payer = suggest_payer(&db, ["Luis", "Ana"]).await?;
        assert_eq!(payer.as_deref(), Some("Ana"));

        // Newcomers start at zero
        let payer = suggest_payer(&db, ["Nuevo", "Ana"]).await?;
        assert_eq!(payer.as_deref(), Some("Ana"));

        assert_eq!(suggest_payer(&db, Vec::<&str>::new()).await?, None);
        Ok(())
    }
}
