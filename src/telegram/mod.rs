//! Telegram bot integration and handlers

pub mod bot;
pub mod handlers;
pub mod sink;
pub mod supervisor;

pub type Bot = teloxide::Bot;

// Re-exports for convenience
pub use bot::{create_bot, is_supported_reference, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use sink::TelegramSink;
pub use supervisor::RequestSupervisor;
