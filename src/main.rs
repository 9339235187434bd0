use breakfast_buddy::{
    bot::{self, BotData},
    config::{database, menu},
    core::ledger,
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load and validate the menu; nothing runs on a partial menu
    let config = menu::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    let menu = Arc::new(
        config
            .menu()
            .inspect_err(|e| error!("Invalid menu configuration: {}", e))?,
    );
    info!(
        "Menu ready: {} combo rules in {} drink pools",
        menu.rules().len(),
        menu.pools().len()
    );

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the roster
    ledger::seed_participants(&db, &config.participants)
        .await
        .inspect_err(|e| error!("Failed to seed participants: {}", e))?;

    // 6. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(db, menu)).await
}
