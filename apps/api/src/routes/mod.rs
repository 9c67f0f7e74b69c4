pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(resumes::handle_list_templates))
        // Resume API
        .route(
            "/api/v1/resumes",
            post(resumes::handle_create_resume).get(resumes::handle_list_resumes),
        )
        .route("/api/v1/resumes/validate", post(resumes::handle_validate))
        .route("/api/v1/resumes/preview", post(resumes::handle_preview))
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handle_get_resume)
                .put(resumes::handle_update_resume)
                .delete(resumes::handle_delete_resume),
        )
        .route("/api/v1/resumes/:id/export", get(resumes::handle_export))
        // Writing assistant
        .route("/api/v1/generate", post(generation::handle_generate))
        .with_state(state)
}
