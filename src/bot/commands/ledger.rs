//! Ledger Discord commands - `debts`, `history`, `stats` and `participant`.
//!
//! Read-only views of balances and past breakfasts, plus roster management.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, reply_error},
        core::{history, ledger, report, tally::format_balance},
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Shows everyone's balance, highest debt first.
    #[poise::command(slash_command)]
    pub async fn debts(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let podium = ledger::podium(&ctx.data().database).await?;
        if podium.is_empty() {
            ctx.say("The ledger is empty.").await?;
            return Ok(());
        }

        let mut text = String::from("💶 **Balances** (positive owes the group)\n");
        for (position, participant) in podium.iter().enumerate() {
            let medal = match position {
                0 => "🥇",
                1 => "🥈",
                2 => "🥉",
                _ => "•",
            };
            let _ = writeln!(
                text,
                "{medal} {}: {}",
                participant.name,
                format_balance(participant.balance)
            );
        }
        ctx.say(text).await?;
        Ok(())
    }

    /// Shows the most recent closed breakfasts.
    #[poise::command(slash_command)]
    pub async fn history(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "How many breakfasts to show (default 5)"]
        #[min = 1]
        #[max = 25]
        limit: Option<u64>,
    ) -> Result<()> {
        let records = history::recent_sessions(&ctx.data().database, limit.unwrap_or(5)).await?;
        ctx.say(history::format_history(&records)).await?;
        Ok(())
    }

    /// Shows favourite items, payers and consumption.
    #[poise::command(slash_command)]
    pub async fn stats(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let stats = report::statistics(&ctx.data().database).await?;
        ctx.say(report::format_statistics(&stats)).await?;
        Ok(())
    }

    /// Manage the breakfast roster.
    #[poise::command(
        slash_command,
        subcommands("participant_add", "participant_hide", "participant_show", "participant_list")
    )]
    pub async fn participant(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Roster management. Available subcommands:\n\
            `/participant add` - Add someone to the ledger\n\
            `/participant hide` - Hide someone from pickers and the podium\n\
            `/participant show` - Show a hidden participant again\n\
            `/participant list` - List everyone, hidden included";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds someone to the ledger.
    #[poise::command(slash_command, rename = "add")]
    pub async fn participant_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name used in orders"] name: String,
        #[description = "Opening balance (default 0)"] balance: Option<f64>,
    ) -> Result<()> {
        match ledger::add_participant(&ctx.data().database, &name, balance.unwrap_or(0.0)).await {
            Ok(participant) => {
                ctx.say(format!(
                    "✅ Added **{}** with balance {}",
                    participant.name,
                    format_balance(participant.balance)
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Hides someone from pickers and the podium. Their balance is kept.
    #[poise::command(slash_command, rename = "hide")]
    pub async fn participant_hide(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Participant to hide"]
        #[autocomplete = "autocomplete::autocomplete_participant"]
        name: String,
    ) -> Result<()> {
        match ledger::set_participant_hidden(&ctx.data().database, &name, true).await {
            Ok(_) => {
                ctx.say(format!("✅ **{name}** is now hidden.")).await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Shows a hidden participant again.
    #[poise::command(slash_command, rename = "show")]
    pub async fn participant_show(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Participant to show"] name: String,
    ) -> Result<()> {
        match ledger::set_participant_hidden(&ctx.data().database, &name, false).await {
            Ok(_) => {
                ctx.say(format!("✅ **{name}** is visible again.")).await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Lists every participant, hidden ones included.
    #[poise::command(slash_command, rename = "list")]
    pub async fn participant_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let participants = ledger::list_participants(&ctx.data().database, true).await?;
        if participants.is_empty() {
            ctx.say("The ledger is empty.").await?;
            return Ok(());
        }

        let mut text = String::from("**Participants**\n");
        for participant in &participants {
            let hidden = if participant.is_hidden { " (hidden)" } else { "" };
            let _ = writeln!(
                text,
                "• {}{hidden}: {}",
                participant.name,
                format_balance(participant.balance)
            );
        }
        ctx.say(text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
