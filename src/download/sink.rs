//! Delivery sinks: where finished audio files and user-facing notices go.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::core::error::AppError;

/// Outbound caption for one audio file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioCaption {
    /// Derived (tagged) title
    pub title: String,
    /// Raw uploader as reported by the source, not the normalized artist
    pub performer: Option<String>,
}

/// Receiver of a request's results
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Sends a short text notice to the requester.
    async fn notify(&self, text: &str) -> Result<(), AppError>;

    /// Delivers one finished audio file.
    async fn deliver_audio(&self, path: &Path, caption: &AudioCaption) -> Result<(), AppError>;
}

/// Copies delivered files into a local directory. Used by the `download` subcommand.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    output_dir: PathBuf,
}

impl DirectorySink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl DeliverySink for DirectorySink {
    async fn notify(&self, text: &str) -> Result<(), AppError> {
        println!("{}", text);
        Ok(())
    }

    async fn deliver_audio(&self, path: &Path, caption: &AudioCaption) -> Result<(), AppError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| AppError::from(format!("no file name in {}", path.display())))?;
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let target = self.output_dir.join(file_name);
        tokio::fs::copy(path, &target).await?;

        log::info!(
            "Saved '{}' by {} to {}",
            caption.title,
            caption.performer.as_deref().unwrap_or("-"),
            target.display()
        );
        println!("🎵 {}", target.display());
        Ok(())
    }
}
