//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::generation::modes::{generate, validate_request, GenerateRequest, GeneratedOutput};
use crate::generation::rate_limit::RateDecision;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub output: GeneratedOutput,
    /// Requests left in the caller's current rate-limit window.
    pub remaining: u32,
}

/// POST /api/v1/generate
///
/// Input checks run first so malformed requests do not use up quota.
/// The quota slot is spent before the LLM call and kept even if the call fails.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    validate_request(&request)?;

    let remaining = match state.limiter.check(request.user_id) {
        RateDecision::Allowed { remaining } => remaining,
        RateDecision::Limited { retry_after } => {
            info!(user_id = %request.user_id, "generation rate limited");
            return Err(AppError::RateLimited {
                // Rounded up to whole seconds.
                retry_after_secs: retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0),
            });
        }
    };

    let output = generate(&state.llm, &request).await?;

    Ok(Json(GenerateResponse { output, remaining }))
}
