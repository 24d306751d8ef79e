//! Bot initialization and message routing utilities
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Recognition of YouTube references and commands in message text

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config::{self, Config};

/// Host markers a message must contain to be treated as a YouTube reference
pub const YOUTUBE_MARKERS: &[&str] = &["youtube.com", "youtu.be"];

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Perintah yang tersedia:")]
pub enum Command {
    #[command(description = "mulai bot")]
    Start,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Missing token, invalid API URL or HTTP client failure
pub fn create_bot(config: &Config) -> anyhow::Result<Bot> {
    let token = config.require_bot_token()?;
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;

    let bot = if let Some(bot_api_url) = &config.bot_api_url {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        Bot::with_client(token, client).set_api_url(url)
    } else {
        Bot::with_client(token, client)
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

/// Returns true if the text looks like a YouTube link.
///
/// Plain substring match on the host markers; the rest of the text is opaque.
pub fn is_supported_reference(text: &str) -> bool {
    YOUTUBE_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Returns true for command messages (`/start`, `/help@some_bot`, ...).
///
/// Commands the bot does not know are ignored rather than treated as links.
pub fn is_command(text: &str) -> bool {
    text.trim_start().starts_with('/')
}
