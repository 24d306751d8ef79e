//! Extraction: turns a source reference into downloaded audio files plus source metadata.
//!
//! `yt-dlp` is run once per reference with `--dump-json --no-simulate`, which
//! downloads every item (playlists are expanded) and prints one info dict per
//! item on stdout. Lines are read as they arrive so each produced path is
//! registered for cleanup even if the run later fails or times out.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use crate::core::config::{self, sentinel::UNKNOWN_ALBUM, Config};
use crate::core::error::AppError;
use crate::core::process::{run_with_timeout, VERSION_CHECK_TIMEOUT};
use crate::download::error::DownloadError;
use crate::download::scratch::ScratchFiles;

/// One downloaded item with its source fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedItem {
    pub raw_title: Option<String>,
    pub uploader: Option<String>,
    pub thumbnail_url: Option<String>,
    pub album: String,
    /// Scratch file, extension already normalized
    pub local_file_path: PathBuf,
    /// Path as yt-dlp reported it. Differs from `local_file_path` when yt-dlp
    /// fell back to a webm/opus stream.
    pub downloaded_path: PathBuf,
}

impl ExtractedItem {
    /// Every path this item may occupy on disk.
    pub fn scratch_paths(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.local_file_path.as_path()).chain(
            (self.downloaded_path != self.local_file_path).then_some(self.downloaded_path.as_path()),
        )
    }
}

/// Extraction step of the request pipeline
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Downloads every item behind `reference`.
    ///
    /// Returns an empty list when nothing could be downloaded. Every path learned
    /// along the way is registered in `scratch`, on success and on failure.
    async fn extract(&self, reference: &str, scratch: &mut ScratchFiles) -> Result<Vec<ExtractedItem>, AppError>;
}

/// Rewrites `webm`/`opus` extensions to `m4a`. Other paths are returned unchanged.
pub fn normalize_extension(path: &Path) -> PathBuf {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if config::download::FOREIGN_EXTENSIONS.contains(&ext.to_lowercase().as_str()) => {
            path.with_extension(config::download::TARGET_EXTENSION)
        }
        _ => path.to_path_buf(),
    }
}

#[derive(Debug, Deserialize)]
struct RequestedDownload {
    filepath: Option<String>,
}

/// Subset of the yt-dlp info dict this crate reads
#[derive(Debug, Deserialize)]
struct InfoDict {
    title: Option<String>,
    uploader: Option<String>,
    thumbnail: Option<String>,
    album: Option<String>,
    #[serde(rename = "_filename")]
    private_filename: Option<String>,
    filename: Option<String>,
    requested_downloads: Option<Vec<RequestedDownload>>,
}

impl InfoDict {
    fn file_path(&self) -> Option<PathBuf> {
        self.requested_downloads
            .as_ref()
            .and_then(|downloads| downloads.iter().find_map(|d| d.filepath.clone()))
            .or_else(|| self.private_filename.clone())
            .or_else(|| self.filename.clone())
            .map(PathBuf::from)
    }

    fn into_item(self) -> Option<ExtractedItem> {
        let path = self.file_path()?;
        Some(ExtractedItem {
            raw_title: self.title,
            uploader: self.uploader,
            thumbnail_url: self.thumbnail,
            album: self.album.unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
            local_file_path: normalize_extension(&path),
            downloaded_path: path,
        })
    }
}

/// Parses one stdout line of `--dump-json` into an item.
///
/// Blank lines, non-JSON lines and dicts without a file name yield `None`.
pub fn parse_info_line(line: &str) -> Option<ExtractedItem> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str::<InfoDict>(line) {
        Ok(info) => {
            let title = info.title.clone();
            let item = info.into_item();
            if item.is_none() {
                log::warn!("yt-dlp info for {:?} has no file name, skipping", title);
            }
            item
        }
        Err(e) => {
            log::debug!("Skipping non-JSON yt-dlp output line: {}", e);
            None
        }
    }
}

/// Extractor backed by the `yt-dlp` binary
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    ytdl_bin: String,
    download_dir: PathBuf,
    cookies_file: Option<PathBuf>,
    timeout: Duration,
}

impl YtDlpExtractor {
    pub fn new(ytdl_bin: impl Into<String>, download_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            ytdl_bin: ytdl_bin.into(),
            download_dir: download_dir.into(),
            cookies_file: None,
            timeout,
        }
    }

    pub fn from_config(config: &Config, cookies_file: Option<PathBuf>) -> Self {
        Self::new(config.ytdl_bin.clone(), config.download_dir.clone(), config.extract_timeout)
            .with_cookies(cookies_file)
    }

    pub fn with_cookies(mut self, cookies_file: Option<PathBuf>) -> Self {
        self.cookies_file = cookies_file;
        self
    }

    /// Full argument list for one reference.
    pub fn build_args(&self, reference: &str) -> Vec<String> {
        let output = self.download_dir.join(config::download::OUTPUT_TEMPLATE);
        let mut args = vec![
            "-f".to_string(),
            config::download::FORMAT_SELECTOR.to_string(),
            "-o".to_string(),
            output.to_string_lossy().into_owned(),
            "--yes-playlist".to_string(),
            "--socket-timeout".to_string(),
            config::download::SOCKET_TIMEOUT_SECS.to_string(),
            "--dump-json".to_string(),
            "--no-simulate".to_string(),
            "--no-progress".to_string(),
            "--quiet".to_string(),
        ];
        if let Some(cookies) = &self.cookies_file {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().into_owned());
        }
        args.push("--".to_string());
        args.push(reference.to_string());
        args
    }

    async fn run(&self, reference: &str, scratch: &mut ScratchFiles) -> Result<Vec<ExtractedItem>, AppError> {
        tokio::fs::create_dir_all(&self.download_dir).await?;

        let mut child = Command::new(&self.ytdl_bin)
            .args(self.build_args(reference))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DownloadError::Process(format!("failed to start {}: {}", self.ytdl_bin, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloadError::Process("yt-dlp stdout not captured".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| DownloadError::Process("yt-dlp stderr not captured".to_string()))?;

        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        });

        let mut items = Vec::new();
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            if let Some(item) = parse_info_line(&line) {
                for path in item.scratch_paths() {
                    scratch.register(path);
                }
                items.push(item);
            }
        }

        let status = child.wait().await?;
        let stderr_text = stderr_task.await.unwrap_or_default();

        if !status.success() {
            let detail = stderr_text.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("no output");
            log::warn!(
                "Ignored yt-dlp error for {} (exit {:?}): {}",
                reference,
                status.code(),
                detail.trim()
            );
            return Ok(Vec::new());
        }

        log::info!("yt-dlp produced {} item(s) for {}", items.len(), reference);
        Ok(items)
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    async fn extract(&self, reference: &str, scratch: &mut ScratchFiles) -> Result<Vec<ExtractedItem>, AppError> {
        log::debug!("Running {} for {}", self.ytdl_bin, reference);
        match tokio::time::timeout(self.timeout, self.run(reference, scratch)).await {
            Ok(result) => result,
            Err(_) => Err(DownloadError::Timeout(format!("yt-dlp timed out after {}s", self.timeout.as_secs())).into()),
        }
    }
}

/// Returns the installed yt-dlp version string.
pub async fn ytdlp_version(ytdl_bin: &str) -> Result<String, AppError> {
    let output = run_with_timeout(Command::new(ytdl_bin).arg("--version"), VERSION_CHECK_TIMEOUT, ytdl_bin).await?;
    if !output.status.success() {
        return Err(DownloadError::YtDlp(format!(
            "{} --version exited with {:?}",
            ytdl_bin,
            output.status.code()
        ))
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Logs the yt-dlp version at startup. A missing binary only warns.
pub async fn log_ytdlp_version(ytdl_bin: &str) {
    match ytdlp_version(ytdl_bin).await {
        Ok(version) => log::info!("yt-dlp version: {}", version),
        Err(e) => log::warn!("Failed to get yt-dlp version from '{}': {}", ytdl_bin, e),
    }
}
