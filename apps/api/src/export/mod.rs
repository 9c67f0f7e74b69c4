//! Export pipeline: layout → PDF bytes, plus the post-export archive step.
//!
//! Layout and encoding are CPU-bound and run on `spawn_blocking`. A failure in
//! either one fails the whole export with no partial output.

pub mod archive;

use thiserror::Error;
use tracing::info;

use crate::errors::AppError;
use crate::layout::{layout_resume, LayoutError, PageGeometry, StandardFontMeasurer, TemplateId};
use crate::models::resume::ResumeContent;
use crate::pdf::{write_document, PdfError, PdfOptions};

pub use archive::{ExportArchive, S3Archive};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] PdfError),
}

/// A finished export.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Lays out and encodes `content` synchronously.
pub fn render_pdf(
    content: &ResumeContent,
    template: TemplateId,
    options: &PdfOptions,
) -> Result<ExportedDocument, ExportError> {
    let document = layout_resume(
        content,
        &template.style(),
        PageGeometry::a4(),
        &StandardFontMeasurer,
    )?;
    let bytes = write_document(&document, options)?;

    Ok(ExportedDocument {
        bytes,
        page_count: document.page_count(),
    })
}

/// Renders a resume to PDF off the async executor.
pub async fn export_resume(
    content: ResumeContent,
    template: TemplateId,
) -> Result<ExportedDocument, AppError> {
    let options = PdfOptions {
        title: Some(match content.personal_info.full_name.trim() {
            "" => "Resume".to_string(),
            name => format!("{name} - Resume"),
        }),
        ..PdfOptions::default()
    };

    let exported = tokio::task::spawn_blocking(move || render_pdf(&content, template, &options))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in export: {e}")))??;

    info!(
        template = %template,
        pages = exported.page_count,
        bytes = exported.bytes.len(),
        "resume exported"
    );
    Ok(exported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Experience, PersonalInfo};

    fn content_with_jobs(jobs: usize) -> ResumeContent {
        ResumeContent {
            personal_info: PersonalInfo {
                full_name: "Jane Doe".to_string(),
                email: Some("jane@example.com".to_string()),
                ..Default::default()
            },
            experience: (1..=jobs)
                .map(|i| Experience {
                    title: format!("Engineer {i}"),
                    company: "Acme".to_string(),
                    description: Some("Line one\nLine two\nLine three\nLine four".to_string()),
                    highlights: vec!["Cut p99 latency by 40%".to_string()],
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_pdf_is_byte_identical_across_runs() {
        let content = content_with_jobs(12);
        let options = PdfOptions::default();
        let first = render_pdf(&content, TemplateId::Classic, &options).unwrap();
        let second = render_pdf(&content, TemplateId::Classic, &options).unwrap();
        assert_eq!(first.bytes, second.bytes);
        assert_eq!(first.page_count, second.page_count);
    }

    #[test]
    fn test_uncompressed_output_carries_page_footers() {
        let content = content_with_jobs(12);
        let options = PdfOptions {
            compress: false,
            title: None,
        };
        let exported = render_pdf(&content, TemplateId::Modern, &options).unwrap();
        assert!(exported.page_count >= 2);

        let text = String::from_utf8_lossy(&exported.bytes);
        for i in 1..=exported.page_count {
            let footer = format!("(Page {i} of {}) Tj", exported.page_count);
            assert_eq!(text.matches(&footer).count(), 1, "{footer}");
        }
    }

    #[test]
    fn test_unsupported_glyph_fails_export() {
        let mut content = content_with_jobs(1);
        content.personal_info.full_name = "Łukasz 王".to_string();
        let result = render_pdf(&content, TemplateId::Modern, &PdfOptions::default());
        assert!(matches!(result, Err(ExportError::Layout(LayoutError::UnsupportedGlyph { .. }))));
    }

    #[tokio::test]
    async fn test_export_resume_runs_off_executor() {
        let exported = export_resume(content_with_jobs(1), TemplateId::Minimal).await.unwrap();
        assert_eq!(exported.page_count, 1);
        assert!(exported.bytes.starts_with(b"%PDF-1.4"));
    }
}
