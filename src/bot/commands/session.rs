//! Session Discord commands - `ticket`, `reopen`, `payer` and `close`.
//!
//! These walk the current breakfast through its lifecycle, from the frozen ticket to
//! the ledger update.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, reply_error},
        core::{
            session,
            tally::{format_euros, format_ticket},
        },
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Prices the current orders and freezes the ticket.
    #[poise::command(slash_command)]
    pub async fn ticket(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let ticket = match session::generate_ticket(&data.database, &data.menu).await {
            Ok(ticket) => ticket,
            Err(e) => return reply_error(ctx, e).await,
        };

        let mut text = format_ticket(&ticket);
        if let Some(suggested) = session::suggest_payer(&data.database).await? {
            let _ = write!(
                text,
                "\n\n💡 Next payer by the ledger: **{suggested}**. Confirm with `/payer`."
            );
        }
        ctx.say(text).await?;
        Ok(())
    }

    /// Discards the frozen ticket so orders can be edited again.
    #[poise::command(slash_command)]
    pub async fn reopen(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        match session::reopen(&ctx.data().database).await {
            Ok(_) => {
                ctx.say("✅ Ticket discarded, orders are open again.")
                    .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Chooses who pays the ticket. Without a name, the ledger's suggestion is used.
    #[poise::command(slash_command)]
    pub async fn payer(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Who pays (defaults to the highest balance)"]
        #[autocomplete = "autocomplete::autocomplete_participant"]
        name: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let name = match name {
            Some(name) => name,
            None => match session::suggest_payer(db).await? {
                Some(suggested) => suggested,
                None => {
                    ctx.say("❌ Nobody has ordered yet.").await?;
                    return Ok(());
                }
            },
        };

        match session::select_payer(db, &name).await {
            Ok(selected) => {
                let total = selected.total.unwrap_or_default();
                ctx.say(format!(
                    "✅ **{name}** pays {}. Run `/close` once it is paid.",
                    format_euros(total)
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Closes the breakfast: charges everyone and credits the payer.
    #[poise::command(slash_command)]
    pub async fn close(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let closure = match session::close_session(&ctx.data().database).await {
            Ok(closure) => closure,
            Err(e) => return reply_error(ctx, e).await,
        };

        let mut text = format!(
            "✅ Breakfast closed. **{}** paid {}.\n",
            closure.payer,
            format_euros(closure.total)
        );
        for (name, charge) in &closure.charges {
            let _ = writeln!(text, "• {name}: +{}", format_euros(*charge));
        }
        text.push_str("\nA new breakfast is open for orders.");
        ctx.say(text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
