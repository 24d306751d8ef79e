//! Mock extractor
//!
//! Writes fake audio files into a scratch directory, registers them like the
//! real extractor does and returns the configured items or error.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tubetag::core::error::AppError;
use tubetag::download::error::DownloadError;
use tubetag::download::{ExtractedItem, Extractor, ScratchFiles};

/// Source fields for one fake item
#[derive(Debug, Clone)]
pub struct MockItem {
    pub file_name: String,
    pub raw_title: Option<String>,
    pub uploader: Option<String>,
}

impl MockItem {
    pub fn new(file_name: &str, raw_title: &str, uploader: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            raw_title: Some(raw_title.to_string()),
            uploader: Some(uploader.to_string()),
        }
    }
}

pub struct MockExtractor {
    scratch_dir: PathBuf,
    items: Vec<MockItem>,
    failure: Option<DownloadError>,
    panics: bool,
    delay: Duration,
    running: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl MockExtractor {
    pub fn new(scratch_dir: impl Into<PathBuf>, items: Vec<MockItem>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            items,
            failure: None,
            panics: false,
            delay: Duration::ZERO,
            running: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Writes the files, then fails with `error` (like a run that died midway).
    pub fn failing_after_write(mut self, error: DownloadError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Writes the files, then panics.
    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Highest number of concurrent `extract` calls observed.
    pub fn peak_concurrency(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.peak)
    }

    pub fn call_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    fn scratch_path(&self, reference: &str, file_name: &str) -> PathBuf {
        // Keep concurrent requests from sharing a file.
        let prefix: String = reference.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        self.scratch_dir.join(format!("{}-{}", prefix, file_name))
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self, reference: &str, scratch: &mut ScratchFiles) -> Result<Vec<ExtractedItem>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut items = Vec::new();
        for item in &self.items {
            let path = self.scratch_path(reference, &item.file_name);
            std::fs::write(&path, b"fake audio").unwrap();
            scratch.register(&path);
            items.push(ExtractedItem {
                raw_title: item.raw_title.clone(),
                uploader: item.uploader.clone(),
                thumbnail_url: None,
                album: "Unknown Album".to_string(),
                downloaded_path: path.clone(),
                local_file_path: path,
            });
        }

        self.running.fetch_sub(1, Ordering::SeqCst);

        if self.panics {
            panic!("mock extractor panicked for {}", reference);
        }

        match &self.failure {
            Some(error) => Err(error.clone().into()),
            None => Ok(items),
        }
    }
}
