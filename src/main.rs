use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vinoteka_bot::bot;
use vinoteka_bot::directory::PgDirectory;
use vinoteka_bot::session::SessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting winery Telegram bot");

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let bot_token = env::var("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN must be set")?;
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("Failed to connect to the winery database")?;

    let directory = Arc::new(PgDirectory::new(pool));
    let sessions = SessionStore::new();

    let bot = Bot::new(bot_token);

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint({
            let directory = Arc::clone(&directory);
            let sessions = sessions.clone();
            move |bot: Bot, msg: Message| {
                let directory = Arc::clone(&directory);
                let sessions = sessions.clone();
                async move { bot::message_entry(bot, msg, directory, sessions).await }
            }
        }))
        .branch(Update::filter_callback_query().endpoint({
            let directory = Arc::clone(&directory);
            let sessions = sessions.clone();
            move |bot: Bot, q: CallbackQuery| {
                let directory = Arc::clone(&directory);
                let sessions = sessions.clone();
                async move { bot::callback_entry(bot, q, directory, sessions).await }
            }
        }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
