// All LLM prompt constants for the Generation module.
// Templates use `{placeholder}` markers replaced before sending.

/// System prompt shared by every mode. Enforces JSON-only output and honesty about the source.
pub const WRITER_SYSTEM: &str = "You are an expert resume writer and career coach. \
    You only use facts present in the resume you are given. \
    Do NOT invent employers, titles, dates, degrees or metrics. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// System prompt for ATS scoring.
pub const ATS_SYSTEM: &str = "You are an applicant tracking system analyst. \
    You compare a resume against a job description the way keyword-based screening software does. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Replace: {resume}, {job_context}
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Write a professional summary for the top of this resume.

RESUME:
{resume}
{job_context}
Rules:
- 2 to 4 sentences, third person implied (no "I"), no buzzword lists
- Lead with the candidate's role and strongest area of experience
- Stay under 600 characters

Return a JSON object:
{"summary": "..."}"#;

/// Replace: {resume}, {entry}, {job_context}
pub const BULLETS_PROMPT_TEMPLATE: &str = r#"Write achievement bullets for one experience entry of this resume.

RESUME:
{resume}

ENTRY TO WRITE BULLETS FOR:
{entry}
{job_context}
Rules:
- 3 to 5 bullets, each a single sentence starting with a strong past-tense verb
- Prefer concrete outcomes; only use numbers that appear in the entry
- No leading bullet characters or numbering

Return a JSON object:
{"bullets": ["...", "..."]}"#;

/// Replace: {resume}, {entry}, {job_context}
pub const DESCRIPTION_PROMPT_TEMPLATE: &str = r#"Write a short role description for one experience entry of this resume.

RESUME:
{resume}

ENTRY TO DESCRIBE:
{entry}
{job_context}
Rules:
- 1 to 2 sentences describing scope and responsibility, not individual achievements
- Stay under 300 characters

Return a JSON object:
{"description": "..."}"#;

/// Replace: {resume}, {job_description}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a cover letter for this candidate applying to the job below.

RESUME:
{resume}

JOB DESCRIPTION:
{job_description}

Rules:
- 3 to 4 paragraphs separated by blank lines, under 350 words
- Connect specific experience from the resume to requirements in the job description
- Open with the role being applied for; close with a call to action
- No placeholders such as [Company Name]; omit anything you do not know

Return a JSON object:
{"cover_letter": "..."}"#;

/// Replace: {resume}, {job_description}
pub const ATS_PROMPT_TEMPLATE: &str = r#"Score how well this resume matches the job description.

RESUME:
{resume}

JOB DESCRIPTION:
{job_description}

Return a JSON object with this EXACT schema:
{
  "score": 72,
  "matched_keywords": ["Rust", "PostgreSQL"],
  "missing_keywords": ["Kubernetes"],
  "suggestions": ["Mention container orchestration experience if you have it"]
}

Rules:
- score is an integer from 0 to 100
- keywords are skills, tools and qualifications named in the job description
- at most 5 suggestions, each actionable and specific to this resume"#;

/// Appended to prompts when the caller supplied a job description.
pub const JOB_CONTEXT_TEMPLATE: &str = r#"
TARGET JOB DESCRIPTION (tailor wording toward it without inventing facts):
{job_description}
"#;
