//! Generation modes: request checks, prompt assembly and typed outputs.
//!
//! Every mode sends the whole resume as plain text so the model can stay
//! consistent with it. Experience modes additionally single out one entry.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::prompts::{
    ATS_PROMPT_TEMPLATE, ATS_SYSTEM, BULLETS_PROMPT_TEMPLATE, COVER_LETTER_PROMPT_TEMPLATE,
    DESCRIPTION_PROMPT_TEMPLATE, JOB_CONTEXT_TEMPLATE, SUMMARY_PROMPT_TEMPLATE, WRITER_SYSTEM,
};
use crate::layout::dates::date_range;
use crate::llm_client::LlmClient;
use crate::models::resume::{non_blank, Experience, ResumeContent};

// ────────────────────────────────────────────────────────────────────────────
// Request / Output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    Summary,
    ExperienceBullets,
    ExperienceDescription,
    CoverLetter,
    AtsScore,
}

impl GenerationMode {
    fn needs_job_description(&self) -> bool {
        matches!(self, GenerationMode::CoverLetter | GenerationMode::AtsScore)
    }

    fn needs_target(&self) -> bool {
        matches!(
            self,
            GenerationMode::ExperienceBullets | GenerationMode::ExperienceDescription
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub user_id: Uuid,
    pub mode: GenerationMode,
    pub content: ResumeContent,
    #[serde(default)]
    pub job_description: Option<String>,
    /// Index into `content.experience` for the experience modes.
    #[serde(default)]
    pub target: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratedOutput {
    Summary {
        text: String,
    },
    Bullets {
        bullets: Vec<String>,
    },
    Description {
        text: String,
    },
    CoverLetter {
        text: String,
    },
    AtsScore {
        score: u8,
        matched_keywords: Vec<String>,
        missing_keywords: Vec<String>,
        suggestions: Vec<String>,
    },
}

// Raw JSON shapes the prompts ask for.

#[derive(Debug, Deserialize)]
struct SummaryJson {
    summary: String,
}

#[derive(Debug, Deserialize)]
struct BulletsJson {
    bullets: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DescriptionJson {
    description: String,
}

#[derive(Debug, Deserialize)]
struct CoverLetterJson {
    cover_letter: String,
}

#[derive(Debug, Deserialize)]
struct AtsJson {
    score: f64,
    #[serde(default)]
    matched_keywords: Vec<String>,
    #[serde(default)]
    missing_keywords: Vec<String>,
    #[serde(default)]
    suggestions: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Request checks and prompt assembly
// ────────────────────────────────────────────────────────────────────────────

/// A fully assembled LLM call.
#[derive(Debug, Clone)]
pub struct PromptPlan {
    pub system: &'static str,
    pub prompt: String,
}

/// Checks mode-specific inputs. Runs before any quota is consumed.
pub fn validate_request(request: &GenerateRequest) -> Result<(), AppError> {
    let mode = request.mode;

    if mode.needs_job_description() && non_blank(&request.job_description).is_none() {
        return Err(AppError::Validation(format!(
            "job_description is required for {mode:?}"
        )));
    }

    if mode.needs_target() {
        let entries = request.content.experience.len();
        match request.target {
            None => {
                return Err(AppError::Validation(format!(
                    "target experience index is required for {mode:?}"
                )))
            }
            Some(i) if i >= entries => {
                return Err(AppError::Validation(format!(
                    "target {i} is out of range ({entries} experience entries)"
                )))
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Builds the system and user prompt for a validated request.
pub fn plan_prompt(request: &GenerateRequest) -> Result<PromptPlan, AppError> {
    validate_request(request)?;

    let resume = render_resume_text(&request.content);
    let job_description = non_blank(&request.job_description).unwrap_or_default();
    let job_context = if job_description.is_empty() {
        String::new()
    } else {
        fill_template(JOB_CONTEXT_TEMPLATE, &[("job_description", job_description)])
    };
    let entry = request
        .target
        .and_then(|i| request.content.experience.get(i))
        .map(render_experience)
        .unwrap_or_default();

    let (system, template) = match request.mode {
        GenerationMode::Summary => (WRITER_SYSTEM, SUMMARY_PROMPT_TEMPLATE),
        GenerationMode::ExperienceBullets => (WRITER_SYSTEM, BULLETS_PROMPT_TEMPLATE),
        GenerationMode::ExperienceDescription => (WRITER_SYSTEM, DESCRIPTION_PROMPT_TEMPLATE),
        GenerationMode::CoverLetter => (WRITER_SYSTEM, COVER_LETTER_PROMPT_TEMPLATE),
        GenerationMode::AtsScore => (ATS_SYSTEM, ATS_PROMPT_TEMPLATE),
    };

    let prompt = fill_template(
        template,
        &[
            ("resume", resume.as_str()),
            ("entry", entry.as_str()),
            ("job_context", job_context.as_str()),
            ("job_description", job_description),
        ],
    );

    Ok(PromptPlan { system, prompt })
}

/// Replaces `{name}` markers in one left-to-right pass. Inserted values are
/// never rescanned, and braces that do not name a value are copied through.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let hit = values.iter().find(|(name, _)| {
            tail.strip_prefix(*name)
                .is_some_and(|after| after.starts_with('}'))
        });
        match hit {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Plain-text rendering of the resume used as prompt context.
pub fn render_resume_text(content: &ResumeContent) -> String {
    let info = &content.personal_info;
    let mut out = String::new();

    out.push_str(&format!("Name: {}\n", info.full_name.trim()));
    if !info.professional_title.trim().is_empty() {
        out.push_str(&format!("Title: {}\n", info.professional_title.trim()));
    }
    if let Some(summary) = non_blank(&info.summary) {
        out.push_str(&format!("Summary: {summary}\n"));
    }

    if !content.experience.is_empty() {
        out.push_str("\nExperience:\n");
        for job in &content.experience {
            out.push_str(&render_experience(job));
        }
    }

    if !content.education.is_empty() {
        out.push_str("\nEducation:\n");
        for school in &content.education {
            let degree = [non_blank(&school.degree), non_blank(&school.field)]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" in ");
            out.push_str(&format!("- {}", school.institution.trim()));
            if !degree.is_empty() {
                out.push_str(&format!(", {degree}"));
            }
            if let Some(dates) = date_range(
                school.start_date.as_deref(),
                school.end_date.as_deref(),
                school.current,
            ) {
                out.push_str(&format!(" ({dates})"));
            }
            out.push('\n');
        }
    }

    let skills: Vec<&str> = content
        .skills
        .iter()
        .map(|s| s.name.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if !skills.is_empty() {
        out.push_str(&format!("\nSkills: {}\n", skills.join(", ")));
    }

    out
}

fn render_experience(job: &Experience) -> String {
    let mut out = format!("- {} at {}", job.title.trim(), job.company.trim());
    if let Some(dates) = date_range(job.start_date.as_deref(), job.end_date.as_deref(), job.current) {
        out.push_str(&format!(" ({dates})"));
    }
    out.push('\n');
    if let Some(description) = non_blank(&job.description) {
        out.push_str(&format!("  {description}\n"));
    }
    for highlight in job.highlights.iter().map(|h| h.trim()).filter(|h| !h.is_empty()) {
        out.push_str(&format!("  * {highlight}\n"));
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Execution
// ────────────────────────────────────────────────────────────────────────────

/// Runs one generation request through the LLM and returns the typed output.
pub async fn generate(llm: &LlmClient, request: &GenerateRequest) -> Result<GeneratedOutput, AppError> {
    let plan = plan_prompt(request)?;
    let mode = request.mode;

    let output = match mode {
        GenerationMode::Summary => {
            let raw: SummaryJson = ask(llm, &plan, mode).await?;
            GeneratedOutput::Summary {
                text: raw.summary.trim().to_string(),
            }
        }
        GenerationMode::ExperienceBullets => {
            let raw: BulletsJson = ask(llm, &plan, mode).await?;
            GeneratedOutput::Bullets {
                bullets: clean_bullets(raw.bullets),
            }
        }
        GenerationMode::ExperienceDescription => {
            let raw: DescriptionJson = ask(llm, &plan, mode).await?;
            GeneratedOutput::Description {
                text: raw.description.trim().to_string(),
            }
        }
        GenerationMode::CoverLetter => {
            let raw: CoverLetterJson = ask(llm, &plan, mode).await?;
            GeneratedOutput::CoverLetter {
                text: raw.cover_letter.trim().to_string(),
            }
        }
        GenerationMode::AtsScore => ats_output(ask(llm, &plan, mode).await?),
    };

    info!(user_id = %request.user_id, mode = ?request.mode, "generation complete");
    Ok(output)
}

async fn ask<T: DeserializeOwned>(
    llm: &LlmClient,
    plan: &PromptPlan,
    mode: GenerationMode,
) -> Result<T, AppError> {
    llm.call_json::<T>(&plan.prompt, plan.system)
        .await
        .map_err(|e| AppError::Llm(format!("{mode:?} generation failed: {e}")))
}

/// Strips list markers the model sometimes adds and drops empty lines.
fn clean_bullets(bullets: Vec<String>) -> Vec<String> {
    bullets
        .into_iter()
        .map(|b| {
            b.trim()
                .trim_start_matches(['-', '*', '•'])
                .trim()
                .to_string()
        })
        .filter(|b| !b.is_empty())
        .collect()
}

fn ats_output(raw: AtsJson) -> GeneratedOutput {
    GeneratedOutput::AtsScore {
        score: raw.score.round().clamp(0.0, 100.0) as u8,
        matched_keywords: raw.matched_keywords,
        missing_keywords: raw.missing_keywords,
        suggestions: raw.suggestions,
    }
}
