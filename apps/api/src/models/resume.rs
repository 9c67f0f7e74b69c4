use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layout::TemplateId;

// ────────────────────────────────────────────────────────────────────────────
// Resume content (the document the wizard edits and the layout engine renders)
// ────────────────────────────────────────────────────────────────────────────

/// Full structured content of one resume.
///
/// List order is render order. Wire format is camelCase to match the editor's payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeContent {
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub professional_title: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// A single skill. `level` is 1..=5; the range is enforced by validation, not by the type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    #[serde(default = "default_skill_level")]
    pub level: u8,
    #[serde(default)]
    pub category: Option<String>,
}

fn default_skill_level() -> u8 {
    3
}

/// Returns the trimmed value if the optional field carries any visible text.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Persisted records
// ────────────────────────────────────────────────────────────────────────────

/// A stored resume, scoped to its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub template: TemplateId,
    pub content: ResumeContent,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new resume.
#[derive(Debug, Clone, Deserialize)]
pub struct NewResume {
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub template: TemplateId,
    pub content: ResumeContent,
}

/// Full replacement of the editable fields of a resume.
#[derive(Debug, Clone, Deserialize)]
pub struct ResumeUpdate {
    pub name: String,
    pub template: TemplateId,
    pub content: ResumeContent,
}
