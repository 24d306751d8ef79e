//! tubetag - Telegram bot that downloads YouTube audio and tags it
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, process helpers and user texts
//! - `download`: extraction, request orchestration, scratch files and delivery sinks
//! - `tagging`: metadata derivation, cover art and container tagging
//! - `telegram`: bot commands, handlers, the Telegram sink and request supervision

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod cli;
pub mod core;
pub mod download;
pub mod tagging;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult, Config};
pub use download::{Pipeline, RequestOutcome};
