//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for `BreakfastBuddy`, including all
//! slash commands, autocomplete handlers, and the bot context.

/// Discord command implementations (orders, session, ledger, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    core::catalog::Menu,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// The validated menu loaded at startup
    pub menu: Arc<Menu>,
}

impl BotData {
    /// Creates a new `BotData` instance with the given database connection and menu.
    #[must_use]
    pub const fn new(database: DatabaseConnection, menu: Arc<Menu>) -> Self {
        Self { database, menu }
    }
}

/// Shows a request error to the user; any other error is handed back to the framework.
pub async fn reply_error(ctx: poise::Context<'_, BotData, Error>, error: Error) -> Result<()> {
    if error.is_user_error() {
        ctx.say(format!("❌ {error}")).await?;
        Ok(())
    } else {
        Err(error)
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say("❌ Something went wrong, please try again.").await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Every command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::order(),
        commands::orders(),
        commands::unorder(),
        commands::menu(),
        commands::ticket(),
        commands::reopen(),
        commands::payer(),
        commands::close(),
        commands::debts(),
        commands::history(),
        commands::stats(),
        commands::participant(),
        commands::ping(),
        commands::help(),
    ]
}

/// Connects to Discord and runs until the client stops.
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered {} commands", framework.options().commands.len());
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot client...");
    client.start().await?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
