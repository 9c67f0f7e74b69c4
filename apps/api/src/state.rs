use std::sync::Arc;

use crate::export::ExportArchive;
use crate::generation::RateLimiter;
use crate::llm_client::LlmClient;
use crate::resumes::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Resume persistence. Default: PgResumeStore.
    pub store: Arc<dyn ResumeStore>,
    /// Where exported PDFs go after download. Default: S3Archive (S3 + Redis counter).
    pub archive: Arc<dyn ExportArchive>,
    pub llm: LlmClient,
    /// Per-user quota for generation requests.
    pub limiter: Arc<RateLimiter>,
}
