use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ResumeGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// AI Generation Service. `LlmClient` in production, a stub in tests.
    pub generator: Arc<dyn ResumeGenerator>,
    pub config: Config,
}
