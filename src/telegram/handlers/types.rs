//! Handler types and dependencies

use std::sync::Arc;

use crate::telegram::supervisor::RequestSupervisor;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub supervisor: Arc<RequestSupervisor>,
}

impl HandlerDeps {
    pub fn new(supervisor: Arc<RequestSupervisor>) -> Self {
        Self { supervisor }
    }
}
