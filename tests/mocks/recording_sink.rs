//! Recording delivery sink
//!
//! Keeps every notice and delivery so tests can assert on what the user would see.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tubetag::core::error::AppError;
use tubetag::download::{AudioCaption, DeliverySink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub path: PathBuf,
    pub caption: AudioCaption,
    /// Whether the file was on disk at delivery time
    pub existed: bool,
}

#[derive(Default)]
struct Recorded {
    notices: Vec<String>,
    deliveries: Vec<Delivery>,
}

/// Cheap to clone; clones share the same record.
#[derive(Clone, Default)]
pub struct RecordingSink {
    recorded: Arc<Mutex<Recorded>>,
    /// Delivery of a file whose name contains the key fails with the value
    fail_delivery: Option<(String, String)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_delivery(mut self, file_name_part: &str, error: &str) -> Self {
        self.fail_delivery = Some((file_name_part.to_string(), error.to_string()));
        self
    }

    pub fn notices(&self) -> Vec<String> {
        self.recorded.lock().unwrap().notices.clone()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.recorded.lock().unwrap().deliveries.clone()
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    async fn notify(&self, text: &str) -> Result<(), AppError> {
        self.recorded.lock().unwrap().notices.push(text.to_string());
        Ok(())
    }

    async fn deliver_audio(&self, path: &Path, caption: &AudioCaption) -> Result<(), AppError> {
        if let Some((part, error)) = &self.fail_delivery {
            if path.to_string_lossy().contains(part.as_str()) {
                return Err(AppError::from(error.as_str()));
            }
        }
        self.recorded.lock().unwrap().deliveries.push(Delivery {
            path: path.to_path_buf(),
            caption: caption.clone(),
            existed: path.exists(),
        });
        Ok(())
    }
}
