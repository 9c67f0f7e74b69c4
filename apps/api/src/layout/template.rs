//! Template identifiers and their style records.
//!
//! A template is data only. The layout engine consumes `TemplateStyle`
//! uniformly and never branches on `TemplateId`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An sRGB color, 0–255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const GRAY: Rgb = Rgb::new(128, 128, 128);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// The closed set of templates offered by the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    #[default]
    Modern,
    Classic,
    Minimal,
    Creative,
    Professional,
}

impl TemplateId {
    pub const ALL: [TemplateId; 5] = [
        TemplateId::Modern,
        TemplateId::Classic,
        TemplateId::Minimal,
        TemplateId::Creative,
        TemplateId::Professional,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Modern => "modern",
            TemplateId::Classic => "classic",
            TemplateId::Minimal => "minimal",
            TemplateId::Creative => "creative",
            TemplateId::Professional => "professional",
        }
    }

    /// Looks up the style record for this template.
    pub fn style(&self) -> TemplateStyle {
        match self {
            TemplateId::Modern => MODERN,
            TemplateId::Classic => CLASSIC,
            TemplateId::Minimal => MINIMAL,
            TemplateId::Creative => CREATIVE,
            TemplateId::Professional => PROFESSIONAL,
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown template '{s}'"))
    }
}

/// Presentation parameters applied by the layout engine.
///
/// Spacings are in millimeters. Font sizes are not part of the template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplateStyle {
    /// Section titles and the candidate's name.
    pub header_color: Rgb,
    /// Professional title and divider rule.
    pub accent_color: Rgb,
    /// Gap above each section title; half of it separates entries.
    pub section_spacing: f32,
    /// Gap above each bullet highlight and skill group.
    pub bullet_spacing: f32,
    /// Advance per wrapped line of body text.
    pub line_spacing: f32,
}

const MODERN: TemplateStyle = TemplateStyle {
    header_color: Rgb::new(37, 99, 235),
    accent_color: Rgb::new(59, 130, 246),
    section_spacing: 8.0,
    bullet_spacing: 1.5,
    line_spacing: 5.0,
};

const CLASSIC: TemplateStyle = TemplateStyle {
    header_color: Rgb::new(31, 41, 55),
    accent_color: Rgb::new(75, 85, 99),
    section_spacing: 10.0,
    bullet_spacing: 2.0,
    line_spacing: 5.5,
};

const MINIMAL: TemplateStyle = TemplateStyle {
    header_color: Rgb::new(17, 24, 39),
    accent_color: Rgb::new(156, 163, 175),
    section_spacing: 7.0,
    bullet_spacing: 1.0,
    line_spacing: 4.5,
};

const CREATIVE: TemplateStyle = TemplateStyle {
    header_color: Rgb::new(124, 58, 237),
    accent_color: Rgb::new(236, 72, 153),
    section_spacing: 9.0,
    bullet_spacing: 2.0,
    line_spacing: 5.0,
};

const PROFESSIONAL: TemplateStyle = TemplateStyle {
    header_color: Rgb::new(15, 118, 110),
    accent_color: Rgb::new(20, 184, 166),
    section_spacing: 8.0,
    bullet_spacing: 1.5,
    line_spacing: 5.0,
};
