//! Bounded request spawning.
//!
//! Every accepted message becomes one task. At most `max_concurrent` of them
//! run the pipeline at a time; the rest wait for a permit without blocking
//! the dispatcher. The tracker lets shutdown wait for in-flight requests.
//!
//! The pipeline itself runs in a nested task, so a panicking request is caught
//! and logged here instead of only reaching the panic hook.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

use crate::download::errors::ErrorKind;
use crate::download::pipeline::{Pipeline, RequestOutcome};
use crate::download::sink::DeliverySink;

#[derive(Clone)]
pub struct RequestSupervisor {
    pipeline: Pipeline,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
}

impl RequestSupervisor {
    pub fn new(pipeline: Pipeline, max_concurrent: usize) -> Self {
        Self {
            pipeline,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            tracker: TaskTracker::new(),
        }
    }

    /// Spawns one request. The returned handle yields its terminal outcome; it
    /// may be dropped, the outcome is logged either way.
    pub fn spawn<S>(&self, reference: String, sink: S) -> JoinHandle<RequestOutcome>
    where
        S: DeliverySink + 'static,
    {
        let pipeline = self.pipeline.clone();
        let permits = Arc::clone(&self.permits);

        self.tracker.spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    log::error!("Dropping {}: {}", reference, e);
                    return RequestOutcome::Failed {
                        kind: ErrorKind::Reportable,
                        message: e.to_string(),
                    };
                }
            };
            log::info!("▶️ Processing {}", reference);
            let request = {
                let reference = reference.clone();
                tokio::spawn(async move { pipeline.process(&reference, &sink).await })
            };
            match request.await {
                Ok(outcome) => {
                    log::info!("⏹ Finished {}: {:?}", reference, outcome);
                    outcome
                }
                Err(e) => {
                    log::error!("❌ Request {} aborted: {}", reference, e);
                    RequestOutcome::Failed {
                        kind: ErrorKind::Reportable,
                        message: e.to_string(),
                    }
                }
            }
        })
    }

    /// Requests currently running or waiting for a permit.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Stops accepting work and waits for every spawned request to finish.
    pub async fn shutdown(&self) {
        self.tracker.close();
        log::info!("Waiting for {} in-flight request(s)", self.tracker.len());
        self.tracker.wait().await;
    }
}
