use std::fmt;

/// Structured error type for download operations.
///
/// Categorized variants for logging; `Display` is always the bare message so the
/// error classifier sees the same text yt-dlp or the OS produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadError {
    /// yt-dlp specific failures (bad exit code, unparsable output)
    YtDlp(String),
    /// Scratch file missing at delivery time
    FileNotFound(String),
    /// Download or processing timed out
    Timeout(String),
    /// Process execution failure (spawn, wait)
    Process(String),
    /// Catch-all for uncategorized errors
    Other(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for DownloadError {}

impl DownloadError {
    /// Returns subcategory for logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::YtDlp(_) => "ytdlp",
            DownloadError::FileNotFound(_) => "file_not_found",
            DownloadError::Timeout(_) => "timeout",
            DownloadError::Process(_) => "process",
            DownloadError::Other(_) => "other",
        }
    }

    /// Returns the inner message
    pub fn message(&self) -> &str {
        match self {
            DownloadError::YtDlp(msg)
            | DownloadError::FileNotFound(msg)
            | DownloadError::Timeout(msg)
            | DownloadError::Process(msg)
            | DownloadError::Other(msg) => msg,
        }
    }
}
