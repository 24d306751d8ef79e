//! Logging initialization and configuration checking
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Extraction authentication reporting at startup

use anyhow::Result;
use simplelog::*;
use std::fs::File;
use std::path::Path;

use crate::core::config::Config as AppConfig;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the log file or a logger was already installed
pub fn init_logger(log_file_path: &Path) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs which authentication mode extraction will run in.
///
/// Missing cookies are not fatal: yt-dlp still works unauthenticated for most public videos.
pub fn log_cookies_configuration(config: &AppConfig) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🍪 Extraction authentication");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match config.cookies_b64.as_deref() {
        Some(blob) => {
            log::info!("✅ YTDL_COOKIES_B64: set ({} bytes encoded)", blob.len());
            log::info!("   Cookies will be decoded into the scratch directory");
        }
        None => {
            log::warn!("⚠️  YTDL_COOKIES_B64: not set, yt-dlp runs unauthenticated");
            log::warn!("   Age-restricted or members-only videos will fail");
        }
    }

    log::info!("yt-dlp binary: {}", config.ytdl_bin);
    log::info!("Scratch directory: {}", config.download_dir.display());
}
