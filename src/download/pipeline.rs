//! Request pipeline orchestrator.
//!
//! One request goes through:
//!   extract → (0 items → not found) → per item concurrently: tag → deliver → cleanup
//!
//! Per-item failures never cancel siblings. All failures of a request are
//! classified; suppressed ones are only logged, the most relevant reportable
//! one is shown to the user. Scratch files are removed on every exit path.

use std::fmt;
use std::sync::Arc;

use futures_util::future::join_all;

use crate::core::config::Config;
use crate::core::error::AppError;
use crate::core::messages;
use crate::download::cookies::prepare_cookies;
use crate::download::error::DownloadError;
use crate::download::errors::{ClassifiedError, ErrorKind};
use crate::download::extractor::{ExtractedItem, Extractor, YtDlpExtractor};
use crate::download::scratch::ScratchFiles;
use crate::download::sink::{AudioCaption, DeliverySink};
use crate::tagging::cover::CoverFetcher;
use crate::tagging::derive::derive_metadata;
use crate::tagging::tagger::{LoftyTagger, Tagger};

/// Lifecycle of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    Extracting,
    NotFound,
    Tagging,
    Delivering,
    Completed,
    Failed,
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestState::Received => "received",
            RequestState::Extracting => "extracting",
            RequestState::NotFound => "not_found",
            RequestState::Tagging => "tagging",
            RequestState::Delivering => "delivering",
            RequestState::Completed => "completed",
            RequestState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Terminal result of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// At least one item was delivered. `failed` items were logged (and the
    /// most relevant reportable one shown to the user).
    Completed { delivered: usize, failed: usize },
    /// Extraction produced nothing
    NotFound,
    /// Nothing was delivered
    Failed { kind: ErrorKind, message: String },
}

/// Extractor plus tagger, shared across requests
#[derive(Clone)]
pub struct Pipeline {
    extractor: Arc<dyn Extractor>,
    tagger: Arc<dyn Tagger>,
}

fn transition(reference: &str, from: RequestState, to: RequestState) {
    log::debug!("[{}] {} -> {}", reference, from, to);
}

impl Pipeline {
    pub fn new(extractor: Arc<dyn Extractor>, tagger: Arc<dyn Tagger>) -> Self {
        Self { extractor, tagger }
    }

    /// Production wiring: yt-dlp extraction (with cookies if usable) and lofty tagging.
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let cookies_file = prepare_cookies(&config.download_dir, config.cookies_b64.as_deref()).await;
        let extractor = YtDlpExtractor::from_config(config, cookies_file);
        let tagger = LoftyTagger::new(CoverFetcher::new()?);
        Ok(Self::new(Arc::new(extractor), Arc::new(tagger)))
    }

    /// Runs one request to a terminal state. Scratch files are gone when this returns.
    pub async fn process(&self, reference: &str, sink: &dyn DeliverySink) -> RequestOutcome {
        let mut scratch = ScratchFiles::new();
        let outcome = self.run(reference, sink, &mut scratch).await;
        let removed = scratch.cleanup().await;
        log::debug!("[{}] cleanup removed {} scratch file(s)", reference, removed);
        outcome
    }

    async fn run(&self, reference: &str, sink: &dyn DeliverySink, scratch: &mut ScratchFiles) -> RequestOutcome {
        transition(reference, RequestState::Received, RequestState::Extracting);

        let items = match self.extractor.extract(reference, scratch).await {
            Ok(items) => items,
            Err(e) => {
                if let AppError::Download(download_error) = &e {
                    log::debug!("[{}] extraction failed ({})", reference, download_error.subcategory());
                }
                transition(reference, RequestState::Extracting, RequestState::Failed);
                return self.fail(sink, vec![ClassifiedError::new(&e.user_message())]).await;
            }
        };

        if items.is_empty() {
            transition(reference, RequestState::Extracting, RequestState::NotFound);
            log::info!("[{}] no items extracted", reference);
            notify_logged(sink, messages::NOT_FOUND).await;
            return RequestOutcome::NotFound;
        }

        transition(reference, RequestState::Extracting, RequestState::Tagging);
        let results = join_all(items.iter().map(|item| self.process_item(item, sink))).await;

        let total = results.len();
        let errors: Vec<ClassifiedError> = results
            .into_iter()
            .filter_map(|result| result.err())
            .map(|e| ClassifiedError::new(&e.user_message()))
            .collect();
        let delivered = total - errors.len();

        if errors.is_empty() {
            transition(reference, RequestState::Delivering, RequestState::Completed);
            log::info!("[{}] delivered {} item(s)", reference, delivered);
            return RequestOutcome::Completed { delivered, failed: 0 };
        }

        let failed = errors.len();
        if delivered == 0 {
            transition(reference, RequestState::Delivering, RequestState::Failed);
            return self.fail(sink, errors).await;
        }

        transition(reference, RequestState::Delivering, RequestState::Completed);
        log::warn!("[{}] delivered {} item(s), {} failed", reference, delivered, failed);
        self.report(sink, errors).await;
        RequestOutcome::Completed { delivered, failed }
    }

    async fn process_item(&self, item: &ExtractedItem, sink: &dyn DeliverySink) -> Result<(), AppError> {
        let path = self.tagger.tag(item).await?;

        let metadata = derive_metadata(item.raw_title.as_deref(), item.uploader.as_deref(), Some(&item.album));
        let caption = AudioCaption {
            title: metadata.title,
            performer: item.uploader.clone(),
        };

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(DownloadError::FileNotFound(format!("No such file or directory: {}", path.display())).into());
        }

        transition(&path.display().to_string(), RequestState::Tagging, RequestState::Delivering);
        sink.deliver_audio(&path, &caption).await
    }

    async fn fail(&self, sink: &dyn DeliverySink, errors: Vec<ClassifiedError>) -> RequestOutcome {
        match self.report(sink, errors).await {
            Some(err) => RequestOutcome::Failed {
                kind: err.kind,
                message: err.message,
            },
            None => RequestOutcome::Failed {
                kind: ErrorKind::Reportable,
                message: String::new(),
            },
        }
    }

    /// Logs every error and surfaces the most relevant one if it is reportable.
    async fn report(&self, sink: &dyn DeliverySink, errors: Vec<ClassifiedError>) -> Option<ClassifiedError> {
        for err in &errors {
            err.log();
        }
        let picked = ClassifiedError::most_relevant(errors)?;
        if picked.kind.is_reportable() {
            notify_logged(sink, &messages::error_text(&picked.message)).await;
        }
        Some(picked)
    }
}

async fn notify_logged(sink: &dyn DeliverySink, text: &str) {
    if let Err(e) = sink.notify(text).await {
        log::error!("Failed to notify requester: {}", e);
    }
}
