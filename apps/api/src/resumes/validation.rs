use serde::{Deserialize, Serialize};

use crate::layout::dates::parse_month;
use crate::models::resume::{non_blank, ResumeContent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Path into the content, e.g. `experience[2].endDate`.
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<FieldIssue>,
    pub warnings: Vec<FieldIssue>,
}

impl ValidationReport {
    /// All error messages joined for a single 400 response.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Checks content before it is stored or exported.
///
/// Errors block saving. Warnings are soft recommendations (empty sections).
/// Dates that do not parse as `YYYY-MM` are free-form and never compared.
pub fn validate_content(content: &ResumeContent) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let info = &content.personal_info;

    if info.full_name.trim().is_empty() {
        errors.push(FieldIssue::new("personalInfo.fullName", "full name is required"));
    }
    if let Some(email) = non_blank(&info.email) {
        if !is_plausible_email(email) {
            errors.push(FieldIssue::new("personalInfo.email", "email address is malformed"));
        }
    }

    for (i, job) in content.experience.iter().enumerate() {
        check_dates(
            &format!("experience[{i}]"),
            job.start_date.as_deref(),
            job.end_date.as_deref(),
            job.current,
            &mut errors,
        );
    }
    for (i, school) in content.education.iter().enumerate() {
        check_dates(
            &format!("education[{i}]"),
            school.start_date.as_deref(),
            school.end_date.as_deref(),
            school.current,
            &mut errors,
        );
    }

    for (i, skill) in content.skills.iter().enumerate() {
        if skill.name.trim().is_empty() {
            errors.push(FieldIssue::new(format!("skills[{i}].name"), "skill name is required"));
        }
        if !(1..=5).contains(&skill.level) {
            errors.push(FieldIssue::new(
                format!("skills[{i}].level"),
                format!("level must be between 1 and 5, got {}", skill.level),
            ));
        }
    }

    for (field, empty) in [
        ("experience", content.experience.is_empty()),
        ("education", content.education.is_empty()),
        ("skills", content.skills.is_empty()),
    ] {
        if empty {
            warnings.push(FieldIssue::new(field, "at least one entry is recommended"));
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn check_dates(
    prefix: &str,
    start: Option<&str>,
    end: Option<&str>,
    current: bool,
    errors: &mut Vec<FieldIssue>,
) {
    let end = end.map(str::trim).filter(|s| !s.is_empty());

    if current && end.is_some() {
        errors.push(FieldIssue::new(
            format!("{prefix}.endDate"),
            "an ongoing entry cannot have an end date",
        ));
        return;
    }

    if let (Some(start), Some(end)) = (start.and_then(parse_month), end.and_then(parse_month)) {
        if end < start {
            errors.push(FieldIssue::new(
                format!("{prefix}.endDate"),
                "end date is before start date",
            ));
        }
    }
}

/// One `@`, a non-empty local part, and a dotted domain.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Education, Experience, PersonalInfo, Skill};

    fn complete() -> ResumeContent {
        ResumeContent {
            personal_info: PersonalInfo {
                full_name: "Jane Doe".to_string(),
                email: Some("jane@example.com".to_string()),
                ..Default::default()
            },
            experience: vec![Experience {
                title: "Engineer".to_string(),
                start_date: Some("2020-01".to_string()),
                end_date: Some("2022-06".to_string()),
                ..Default::default()
            }],
            education: vec![Education {
                institution: "TU Berlin".to_string(),
                ..Default::default()
            }],
            skills: vec![Skill {
                name: "Rust".to_string(),
                level: 4,
                category: None,
            }],
        }
    }

    fn fields(issues: &[FieldIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.field.as_str()).collect()
    }

    #[test]
    fn test_complete_content_is_valid_without_warnings() {
        let report = validate_content(&complete());
        assert!(report.valid, "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_name_only_is_valid_with_section_warnings() {
        let content = ResumeContent {
            personal_info: PersonalInfo {
                full_name: "Jane Doe".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let report = validate_content(&content);
        assert!(report.valid);
        assert_eq!(fields(&report.warnings), vec!["experience", "education", "skills"]);
    }

    #[test]
    fn test_blank_name_is_an_error() {
        let mut content = complete();
        content.personal_info.full_name = "   ".to_string();
        let report = validate_content(&content);
        assert!(!report.valid);
        assert_eq!(fields(&report.errors), vec!["personalInfo.fullName"]);
    }

    #[test]
    fn test_email_shapes() {
        for good in ["a@b.co", "jane.doe@mail.example.org"] {
            assert!(is_plausible_email(good), "{good}");
        }
        for bad in ["jane", "@example.com", "jane@", "jane@localhost", "jane@.com", "a b@c.de", "a@b@c.de"] {
            assert!(!is_plausible_email(bad), "{bad}");
        }
    }

    #[test]
    fn test_skill_level_out_of_range() {
        let mut content = complete();
        content.skills.push(Skill {
            name: "Go".to_string(),
            level: 6,
            category: None,
        });
        content.skills.push(Skill {
            name: " ".to_string(),
            level: 0,
            category: None,
        });
        let report = validate_content(&content);
        assert_eq!(
            fields(&report.errors),
            vec!["skills[1].level", "skills[2].name", "skills[2].level"]
        );
    }

    #[test]
    fn test_end_before_start_and_current_with_end() {
        let mut content = complete();
        content.experience[0].end_date = Some("2019-12".to_string());
        content.education[0].current = true;
        content.education[0].end_date = Some("2024-06".to_string());

        let report = validate_content(&content);
        assert_eq!(
            fields(&report.errors),
            vec!["experience[0].endDate", "education[0].endDate"]
        );
        assert!(report.error_summary().contains("end date is before start date"));
    }

    #[test]
    fn test_free_form_dates_are_not_compared() {
        let mut content = complete();
        content.experience[0].start_date = Some("Summer 2023".to_string());
        content.experience[0].end_date = Some("2019-01".to_string());
        assert!(validate_content(&content).valid);
    }
}
