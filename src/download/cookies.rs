//! YouTube cookies for yt-dlp
//!
//! The cookies come in as a base64-encoded Netscape cookies file
//! (`YTDL_COOKIES_B64`). They are decoded once at startup into a file that
//! yt-dlp reads via `--cookies`. Anything wrong with the blob drops the bot
//! into unauthenticated mode with a warning.

use std::path::{Path, PathBuf};

use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};

/// File name of the decoded cookies inside the scratch directory
pub const COOKIES_FILE_NAME: &str = "cookies.txt";

/// Decodes and validates a base64 Netscape cookies blob.
pub fn decode_cookies(cookies_b64: &str) -> Result<String> {
    let decoded = general_purpose::STANDARD
        .decode(cookies_b64.trim())
        .map_err(|e| anyhow::anyhow!("Invalid base64: {}", e))?;

    let content = String::from_utf8(decoded).map_err(|e| anyhow::anyhow!("Invalid UTF-8 in cookies: {}", e))?;

    if !content.contains("# Netscape HTTP Cookie File") && !content.contains(".youtube.com") {
        return Err(anyhow::anyhow!(
            "Invalid cookies format. Expected Netscape HTTP Cookie File format with youtube.com entries"
        ));
    }
    Ok(content)
}

/// Writes the decoded cookies into `dir` and returns the file path.
///
/// Writes to a temp file first and renames it into place.
pub async fn write_cookies_file(dir: &Path, cookies_b64: &str) -> Result<PathBuf> {
    let content = decode_cookies(cookies_b64)?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", dir.display(), e))?;

    let cookies_path = dir.join(COOKIES_FILE_NAME);
    let temp_path = dir.join(format!("{}.tmp.{}", COOKIES_FILE_NAME, std::process::id()));

    tokio::fs::write(&temp_path, &content)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to write temp cookies file: {}", e))?;

    tokio::fs::rename(&temp_path, &cookies_path).await.map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        anyhow::anyhow!("Failed to rename cookies file: {}", e)
    })?;

    log::info!("✅ Cookies file written: {}", cookies_path.display());
    Ok(cookies_path)
}

/// Resolves the cookies file for the extractor.
///
/// `None` means unauthenticated: either no blob was configured or it was unusable.
pub async fn prepare_cookies(dir: &Path, cookies_b64: Option<&str>) -> Option<PathBuf> {
    let blob = cookies_b64?;
    match write_cookies_file(dir, blob).await {
        Ok(path) => Some(path),
        Err(e) => {
            log::warn!("⚠️ YTDL_COOKIES_B64 is unusable ({}), continuing without cookies", e);
            None
        }
    }
}
