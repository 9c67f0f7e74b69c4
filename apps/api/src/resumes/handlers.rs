//! Axum route handlers for the Resume API.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::{export_resume, ExportError};
use crate::layout::{
    layout_resume, LaidOutDocument, PageGeometry, StandardFontMeasurer, TemplateId, TemplateStyle,
};
use crate::models::resume::{NewResume, ResumeContent, ResumeRecord, ResumeUpdate};
use crate::resumes::validation::{validate_content, ValidationReport};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub user_id: Uuid,
    /// Overrides the stored template for this download only.
    pub template: Option<TemplateId>,
}

#[derive(Debug, Serialize)]
pub struct TemplateInfo {
    pub id: TemplateId,
    pub style: TemplateStyle,
}

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<ResumeRecord>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub template: TemplateId,
    pub content: ResumeContent,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub template: TemplateId,
    pub page_count: usize,
    pub document: LaidOutDocument,
}

fn require_valid(content: &ResumeContent) -> Result<(), AppError> {
    let report = validate_content(content);
    if report.valid {
        Ok(())
    } else {
        Err(AppError::Validation(report.error_summary()))
    }
}

fn require_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    Ok(())
}

/// Builds a download filename from the resume name: ASCII letters, digits, `-` and `_`.
fn download_filename(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if stem.is_empty() {
        "resume.pdf".to_string()
    } else {
        format!("{stem}.pdf")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<Vec<TemplateInfo>> {
    Json(
        TemplateId::ALL
            .into_iter()
            .map(|id| TemplateInfo {
                id,
                style: id.style(),
            })
            .collect(),
    )
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Json(request): Json<NewResume>,
) -> Result<(StatusCode, Json<ResumeRecord>), AppError> {
    require_name(&request.name)?;
    require_valid(&request.content)?;

    let record = state.store.create(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/v1/resumes?user_id=
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(owner): Query<OwnerQuery>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let resumes = state.store.list_for_user(owner.user_id).await?;
    Ok(Json(ResumeListResponse { resumes }))
}

/// GET /api/v1/resumes/:id?user_id=
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Query(owner): Query<OwnerQuery>,
) -> Result<Json<ResumeRecord>, AppError> {
    Ok(Json(state.store.get(owner.user_id, resume_id).await?))
}

/// PUT /api/v1/resumes/:id?user_id=
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Query(owner): Query<OwnerQuery>,
    Json(update): Json<ResumeUpdate>,
) -> Result<Json<ResumeRecord>, AppError> {
    require_name(&update.name)?;
    require_valid(&update.content)?;

    Ok(Json(
        state
            .store
            .update(owner.user_id, resume_id, update)
            .await?,
    ))
}

/// DELETE /api/v1/resumes/:id?user_id=
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Query(owner): Query<OwnerQuery>,
) -> Result<StatusCode, AppError> {
    state.store.delete(owner.user_id, resume_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/validate
///
/// Always 200: the report itself says whether the content would be accepted.
pub async fn handle_validate(Json(content): Json<ResumeContent>) -> Json<ValidationReport> {
    Json(validate_content(&content))
}

/// POST /api/v1/resumes/preview
///
/// Lays out unsaved content and returns the page model for the live preview.
pub async fn handle_preview(
    Json(request): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let template = request.template;
    let content = request.content;

    let document = tokio::task::spawn_blocking(move || {
        layout_resume(
            &content,
            &template.style(),
            PageGeometry::a4(),
            &StandardFontMeasurer,
        )
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in preview: {e}")))?
    .map_err(ExportError::from)?;

    Ok(Json(PreviewResponse {
        template,
        page_count: document.page_count(),
        document,
    }))
}

/// GET /api/v1/resumes/:id/export?user_id=&template=
///
/// Streams the PDF back, then archives it and counts the download in the background.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let user_id = query.user_id;
    let record = state.store.get(user_id, resume_id).await?;
    let template = query.template.unwrap_or(record.template);

    let exported = export_resume(record.content, template).await?;
    let page_count = exported.page_count;
    let pdf = Bytes::from(exported.bytes);

    let archive = state.archive.clone();
    let store = state.store.clone();
    let archived = pdf.clone();
    tokio::spawn(async move {
        if let Err(e) = archive.archive(user_id, resume_id, archived).await {
            warn!(%user_id, %resume_id, "export archive failed: {e:#}");
        }
        if let Err(e) = store.record_download(user_id, resume_id).await {
            warn!(%user_id, %resume_id, "recording download failed: {e}");
        }
    });

    let disposition = format!(
        "attachment; filename=\"{}\"",
        download_filename(&record.name)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (
                header::HeaderName::from_static("x-page-count"),
                page_count.to_string(),
            ),
        ],
        pdf,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_filename_is_header_safe() {
        assert_eq!(download_filename("Backend roles 2024"), "Backend_roles_2024.pdf");
        assert_eq!(download_filename("  \"quoted\"; x "), "quoted_x.pdf");
        assert_eq!(download_filename("Lebenslauf für Jörg"), "Lebenslauf_fr_Jrg.pdf");
        assert_eq!(download_filename("???"), "resume.pdf");
    }
}
