//! Process execution utilities with timeout support
//!
//! Runs external processes (yt-dlp) with a bounded wait so a hung child
//! cannot hold a request forever.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use crate::core::error::AppError;
use crate::download::error::DownloadError;

/// Timeout for quick checks like `yt-dlp --version`
pub const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(15);

/// Run an async Command with a timeout.
///
/// The child is spawned with `kill_on_drop`, so hitting the timeout kills it.
/// A timeout yields `DownloadError::Timeout` whose text contains "timed out".
pub async fn run_with_timeout(cmd: &mut Command, timeout: Duration, label: &str) -> Result<Output, AppError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(AppError::Download(DownloadError::Process(format!(
            "failed to run {}: {}",
            label, e
        )))),
        Err(_) => Err(AppError::Download(DownloadError::Timeout(format!(
            "{} timed out after {}s",
            label,
            timeout.as_secs()
        )))),
    }
}
