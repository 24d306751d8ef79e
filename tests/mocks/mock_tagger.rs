//! Mock tagger
//!
//! Records the metadata it would have written and can fail for chosen titles.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use tubetag::core::error::AppError;
use tubetag::download::ExtractedItem;
use tubetag::tagging::{derive_metadata, NormalizedMetadata, Tagger};

enum Failure {
    Text(String),
    Io(std::io::ErrorKind, String),
}

impl Failure {
    fn to_error(&self) -> AppError {
        match self {
            Failure::Text(text) => AppError::from(text.as_str()),
            Failure::Io(kind, text) => AppError::from(std::io::Error::new(*kind, text.clone())),
        }
    }
}

#[derive(Default)]
pub struct MockTagger {
    /// raw title -> failure
    failures: HashMap<String, Failure>,
    /// Remove the file before returning, like a concurrent request's cleanup
    delete_files: bool,
    tagged: Mutex<Vec<NormalizedMetadata>>,
}

impl MockTagger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, raw_title: &str, error: &str) -> Self {
        self.failures.insert(raw_title.to_string(), Failure::Text(error.to_string()));
        self
    }

    /// Fails with a real `AppError::Io`, as a full disk would.
    pub fn failing_with_io(mut self, raw_title: &str, kind: std::io::ErrorKind, error: &str) -> Self {
        self.failures.insert(raw_title.to_string(), Failure::Io(kind, error.to_string()));
        self
    }

    pub fn deleting_files(mut self) -> Self {
        self.delete_files = true;
        self
    }

    pub fn tagged(&self) -> Vec<NormalizedMetadata> {
        self.tagged.lock().unwrap().clone()
    }
}

#[async_trait]
impl Tagger for MockTagger {
    async fn tag(&self, item: &ExtractedItem) -> Result<PathBuf, AppError> {
        if let Some(failure) = item.raw_title.as_ref().and_then(|t| self.failures.get(t)) {
            return Err(failure.to_error());
        }
        let metadata = derive_metadata(item.raw_title.as_deref(), item.uploader.as_deref(), Some(&item.album));
        self.tagged.lock().unwrap().push(metadata);
        if self.delete_files {
            std::fs::remove_file(&item.local_file_path).unwrap();
        }
        Ok(item.local_file_path.clone())
    }
}
