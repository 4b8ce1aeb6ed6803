use std::sync::Arc;

use crate::pipeline::PrintService;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub print: Arc<PrintService>,
    /// Request body cap applied by the router.
    pub body_limit: usize,
}

impl AppState {
    pub fn new(print: Arc<PrintService>) -> Self {
        Self {
            print,
            body_limit: crate::config::DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }
}
