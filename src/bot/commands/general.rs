//! General Discord commands - ping and help.
//! Simple commands that don't touch the database.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**BreakfastBuddy Help**\n\
        Order breakfast, get the ticket, and let the ledger decide who pays.\n\n\
        **Ordering**\n\
        • `/order <drink> <food> [participant]` - Orders for you or someone else. Use `none` to skip an item.\n\
        • `/orders` - Lists the current orders.\n\
        • `/unorder <id>` - Removes an order.\n\
        • `/menu` - Shows prices and combos.\n\n\
        **Paying**\n\
        • `/ticket` - Prices the orders: what to ask at the bar, what to key into the machine, and who owes what.\n\
        • `/reopen` - Discards the ticket to edit orders again.\n\
        • `/payer [name]` - Chooses who pays, by default the highest balance.\n\
        • `/close` - Records the payment in the ledger and opens a new breakfast.\n\n\
        **Ledger**\n\
        • `/debts` - Balances, highest debt first.\n\
        • `/history [limit]` - Past breakfasts.\n\
        • `/stats` - Favourite items, payers and consumption.\n\
        • `/participant <subcommand>` - Manage the roster (add, hide, show, list).\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
