use thiserror::Error;

use crate::download::error::DownloadError;

/// Centralized error types for the application
///
/// All errors in the application are converted to this enum for consistent error handling.
/// Uses `thiserror` for automatic error conversion and display formatting.
///
/// `Display` carries a category prefix for logs. The request pipeline classifies
/// and shows [`AppError::user_message`] instead, which is the source error's own text.
#[derive(Error, Debug)]
pub enum AppError {
    /// Download/yt-dlp errors
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// HTTP/Fetch errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP status code errors
    #[error("HTTP request failed with status: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Audio container tag read/write errors
    #[error("Tagging error: {0}")]
    Tag(#[from] lofty::error::LoftyError),

    /// Cover art decode/encode errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Background task failed to complete (panic or cancellation)
    #[error("Task error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Text of the underlying error without the category prefix.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Download(e) => e.to_string(),
            AppError::Telegram(teloxide::RequestError::Api(e)) => e.to_string(),
            AppError::Telegram(teloxide::RequestError::Io(e)) => e.to_string(),
            AppError::Telegram(e) => e.to_string(),
            AppError::Http(e) => e.to_string(),
            AppError::HttpStatus(status) => status.to_string(),
            AppError::Io(e) => e.to_string(),
            AppError::Tag(e) => e.to_string(),
            AppError::Image(e) => e.to_string(),
            AppError::Config(msg) => msg.clone(),
            AppError::Join(e) => e.to_string(),
        }
    }
}

/// Helper function to convert String to AppError::Download
impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Download(DownloadError::Other(err))
    }
}

/// Helper function to convert &str to AppError::Download
impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Download(DownloadError::Other(err.to_string()))
    }
}
