//! Document layout engine: lays out resume content across A4 pages.
//!
//! # Passes
//! 1. `build_blocks` turns content into measured blocks in strict render order:
//!    header → contact → divider → summary → experience → education → skills.
//!    Every string is wrapped with the `TextMeasurer`, so each block knows its
//!    exact height before anything is placed.
//! 2. `paginate` walks the blocks with a `LayoutCursor`. Before a block is
//!    drawn its height is compared to the remaining space; if it does not fit
//!    the cursor breaks to a new page first. Blocks taller than a whole page
//!    are flowed line by line instead, so nothing is ever clipped.
//! 3. `stamp_page_numbers` runs over the finished page set and adds
//!    "Page i of N" to every page.
//!
//! Template variation arrives only through `TemplateStyle`; font sizes are
//! fixed per block type.

use tracing::debug;

use crate::layout::cursor::LayoutCursor;
use crate::layout::dates::date_range;
use crate::layout::document::{DrawOp, LaidOutDocument, Page, PageGeometry};
use crate::layout::font_metrics::{wrap_text, FontFace, TextMeasurer, PT_TO_MM};
use crate::layout::template::{Rgb, TemplateStyle};
use crate::layout::LayoutError;
use crate::models::resume::{non_blank, Education, Experience, ResumeContent, Skill};

// ────────────────────────────────────────────────────────────────────────────
// Fixed typography
// ────────────────────────────────────────────────────────────────────────────

pub const NAME_SIZE_PT: f32 = 24.0;
pub const SUBHEADER_SIZE_PT: f32 = 14.0;
pub const ENTRY_TITLE_SIZE_PT: f32 = 12.0;
pub const BODY_SIZE_PT: f32 = 10.0;
pub const FOOTER_SIZE_PT: f32 = 8.0;

/// Baseline offset below the top of a line box, as a fraction of font size.
const ASCENT: f32 = 0.8;
/// Line box height for single-size heading lines, as a multiple of font size.
const HEADING_LEADING: f32 = 1.3;
const DIVIDER_HEIGHT: f32 = 6.0;
const DIVIDER_THICKNESS: f32 = 0.5;
/// Footer baseline distance from the bottom edge. Sits inside the bottom margin.
const FOOTER_OFFSET: f32 = 10.0;
const DATE_GAP: f32 = 4.0;
const BULLET_INDENT: f32 = 5.0;
const BULLET_GLYPH_INSET: f32 = 1.5;
const BULLET_GLYPH: &str = "•";
const SKILL_SEPARATOR: &str = " • ";
const CONTACT_SEPARATOR: &str = " | ";
const UNCATEGORIZED_SKILLS: &str = "Other";

const SUMMARY_TITLE: &str = "Professional Summary";
const EXPERIENCE_TITLE: &str = "Experience";
const EDUCATION_TITLE: &str = "Education";
const SKILLS_TITLE: &str = "Skills";

const NAME_PLACEHOLDER: &str = "Your Name";
const POSITION_PLACEHOLDER: &str = "Position";
const COMPANY_PLACEHOLDER: &str = "Company";
const INSTITUTION_PLACEHOLDER: &str = "Institution";

fn heading_line_height(size_pt: f32) -> f32 {
    size_pt * PT_TO_MM * HEADING_LEADING
}

// ────────────────────────────────────────────────────────────────────────────
// Blocks
// ────────────────────────────────────────────────────────────────────────────

/// A text run positioned horizontally; its baseline is decided at placement.
#[derive(Debug, Clone)]
struct Run {
    x: f32,
    text: String,
    face: FontFace,
    size_pt: f32,
    color: Rgb,
}

#[derive(Debug, Clone)]
enum LineItem {
    Text(Run),
    /// Horizontal rule across the content width, centered in the line box.
    Rule { thickness: f32, color: Rgb },
}

#[derive(Debug, Clone)]
struct BlockLine {
    height: f32,
    items: Vec<LineItem>,
}

/// The unit of the page-break check.
#[derive(Debug, Clone)]
struct Block {
    /// Vertical gap above the block; dropped when the block starts a page.
    gap_before: f32,
    /// Move to a new page together with the following block (section titles).
    keep_with_next: bool,
    lines: Vec<BlockLine>,
}

impl Block {
    fn new(gap_before: f32, lines: Vec<BlockLine>) -> Self {
        Self {
            gap_before,
            keep_with_next: false,
            lines,
        }
    }

    fn height(&self) -> f32 {
        self.lines.iter().map(|l| l.height).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry point
// ────────────────────────────────────────────────────────────────────────────

/// Lays out `content` with `style` on pages of `geometry`.
///
/// Deterministic for identical input. Fails only when the measurer cannot
/// measure a string (a glyph the output fonts cannot show); there is no
/// partial result in that case.
pub fn layout_resume(
    content: &ResumeContent,
    style: &TemplateStyle,
    geometry: PageGeometry,
    measurer: &dyn TextMeasurer,
) -> Result<LaidOutDocument, LayoutError> {
    let builder = BlockBuilder {
        measurer,
        style,
        geometry,
    };
    let blocks = builder.build_blocks(content)?;
    let pages = paginate(&blocks, geometry);

    let mut document = LaidOutDocument { geometry, pages };
    stamp_page_numbers(&mut document, measurer)?;

    debug!(
        blocks = blocks.len(),
        pages = document.page_count(),
        "resume laid out"
    );
    Ok(document)
}

// ────────────────────────────────────────────────────────────────────────────
// Pass 1: content → measured blocks
// ────────────────────────────────────────────────────────────────────────────

struct BlockBuilder<'a> {
    measurer: &'a dyn TextMeasurer,
    style: &'a TemplateStyle,
    geometry: PageGeometry,
}

impl<'a> BlockBuilder<'a> {
    fn build_blocks(&self, content: &ResumeContent) -> Result<Vec<Block>, LayoutError> {
        let mut blocks = vec![self.header_block(content)?];

        if let Some(summary) = non_blank(&content.personal_info.summary) {
            blocks.push(self.section_title(SUMMARY_TITLE)?);
            blocks.push(Block::new(0.0, self.body_lines(summary, FontFace::Regular, 0.0)?));
        }

        if !content.experience.is_empty() {
            blocks.push(self.section_title(EXPERIENCE_TITLE)?);
            for (i, job) in content.experience.iter().enumerate() {
                let gap = if i == 0 { 0.0 } else { self.entry_gap() };
                blocks.push(self.experience_head(job, gap)?);
                for highlight in &job.highlights {
                    let highlight = highlight.trim();
                    if !highlight.is_empty() {
                        blocks.push(self.bullet(highlight)?);
                    }
                }
            }
        }

        if !content.education.is_empty() {
            blocks.push(self.section_title(EDUCATION_TITLE)?);
            for (i, school) in content.education.iter().enumerate() {
                let gap = if i == 0 { 0.0 } else { self.entry_gap() };
                blocks.push(self.education_head(school, gap)?);
            }
        }

        let skill_blocks = self.skill_blocks(&content.skills)?;
        if !skill_blocks.is_empty() {
            blocks.push(self.section_title(SKILLS_TITLE)?);
            blocks.extend(skill_blocks);
        }

        Ok(blocks)
    }

    fn entry_gap(&self) -> f32 {
        self.style.section_spacing / 2.0
    }

    // ── Header ────────────────────────────────────────────────────────────────

    fn header_block(&self, content: &ResumeContent) -> Result<Block, LayoutError> {
        let info = &content.personal_info;
        let width = self.geometry.content_width();
        let left = self.geometry.margin;
        let mut lines = Vec::new();

        let name = match info.full_name.trim() {
            "" => NAME_PLACEHOLDER,
            name => name,
        };
        lines.extend(self.wrapped(
            name,
            FontFace::Bold,
            NAME_SIZE_PT,
            self.style.header_color,
            left,
            width,
            heading_line_height(NAME_SIZE_PT),
        )?);

        let title = info.professional_title.trim();
        if !title.is_empty() {
            lines.extend(self.wrapped(
                title,
                FontFace::Regular,
                SUBHEADER_SIZE_PT,
                self.style.accent_color,
                left,
                width,
                heading_line_height(SUBHEADER_SIZE_PT),
            )?);
        }

        let contact: Vec<&str> = [&info.email, &info.phone, &info.location, &info.website]
            .into_iter()
            .filter_map(non_blank)
            .collect();
        if !contact.is_empty() {
            lines.extend(self.body_lines(&contact.join(CONTACT_SEPARATOR), FontFace::Regular, 0.0)?);
        }

        lines.push(BlockLine {
            height: DIVIDER_HEIGHT,
            items: vec![LineItem::Rule {
                thickness: DIVIDER_THICKNESS,
                color: self.style.accent_color,
            }],
        });

        Ok(Block::new(0.0, lines))
    }

    fn section_title(&self, title: &str) -> Result<Block, LayoutError> {
        let lines = self.wrapped(
            title,
            FontFace::Bold,
            SUBHEADER_SIZE_PT,
            self.style.header_color,
            self.geometry.margin,
            self.geometry.content_width(),
            heading_line_height(SUBHEADER_SIZE_PT),
        )?;
        Ok(Block {
            gap_before: self.style.section_spacing,
            keep_with_next: true,
            lines,
        })
    }

    // ── Entries ───────────────────────────────────────────────────────────────

    fn experience_head(&self, job: &Experience, gap: f32) -> Result<Block, LayoutError> {
        let title = match job.title.trim() {
            "" => POSITION_PLACEHOLDER,
            t => t,
        };
        let company = match job.company.trim() {
            "" => COMPANY_PLACEHOLDER,
            c => c,
        };
        let dates = date_range(job.start_date.as_deref(), job.end_date.as_deref(), job.current);

        let mut lines = self.title_with_dates(&format!("{title} | {company}"), dates.as_deref())?;
        if let Some(location) = non_blank(&job.location) {
            lines.extend(self.body_lines(location, FontFace::Italic, 0.0)?);
        }
        if let Some(description) = non_blank(&job.description) {
            lines.extend(self.body_lines(description, FontFace::Regular, 0.0)?);
        }
        Ok(Block::new(gap, lines))
    }

    fn education_head(&self, school: &Education, gap: f32) -> Result<Block, LayoutError> {
        let institution = match school.institution.trim() {
            "" => INSTITUTION_PLACEHOLDER,
            i => i,
        };
        let dates = date_range(
            school.start_date.as_deref(),
            school.end_date.as_deref(),
            school.current,
        );

        let mut lines = self.title_with_dates(institution, dates.as_deref())?;
        let degree_line = match (non_blank(&school.degree), non_blank(&school.field)) {
            (Some(degree), Some(field)) => Some(format!("{degree} in {field}")),
            (Some(degree), None) => Some(degree.to_string()),
            (None, Some(field)) => Some(field.to_string()),
            (None, None) => None,
        };
        if let Some(degree_line) = degree_line {
            lines.extend(self.body_lines(&degree_line, FontFace::Italic, 0.0)?);
        }
        if let Some(location) = non_blank(&school.location) {
            lines.extend(self.body_lines(location, FontFace::Italic, 0.0)?);
        }
        if let Some(description) = non_blank(&school.description) {
            lines.extend(self.body_lines(description, FontFace::Regular, 0.0)?);
        }
        Ok(Block::new(gap, lines))
    }

    /// Bold entry title wrapped beside a right-aligned date label on its first line.
    /// A label wider than half the content width goes below the title instead,
    /// wrapped from the left margin.
    fn title_with_dates(&self, title: &str, dates: Option<&str>) -> Result<Vec<BlockLine>, LayoutError> {
        let right = self.geometry.right_edge();
        let content_width = self.geometry.content_width();
        let title_lines = |width: f32| {
            self.wrapped(
                title,
                FontFace::Bold,
                ENTRY_TITLE_SIZE_PT,
                Rgb::BLACK,
                self.geometry.margin,
                width,
                heading_line_height(ENTRY_TITLE_SIZE_PT),
            )
        };

        let Some(label) = dates else {
            return title_lines(content_width);
        };
        let label_width = self
            .measurer
            .text_width(label, FontFace::Regular, BODY_SIZE_PT)?;
        let reserved = label_width + DATE_GAP;

        if reserved > content_width / 2.0 {
            let mut lines = title_lines(content_width)?;
            lines.extend(self.body_lines(label, FontFace::Regular, 0.0)?);
            return Ok(lines);
        }

        let mut lines = title_lines(content_width - reserved)?;
        if let Some(first) = lines.first_mut() {
            first.items.push(LineItem::Text(Run {
                x: right - label_width,
                text: label.to_string(),
                face: FontFace::Regular,
                size_pt: BODY_SIZE_PT,
                color: Rgb::BLACK,
            }));
        }
        Ok(lines)
    }

    fn bullet(&self, text: &str) -> Result<Block, LayoutError> {
        let indent = self.geometry.margin + BULLET_INDENT;
        let mut lines = self.wrapped(
            text,
            FontFace::Regular,
            BODY_SIZE_PT,
            Rgb::BLACK,
            indent,
            self.geometry.content_width() - BULLET_INDENT,
            self.style.line_spacing,
        )?;
        if let Some(first) = lines.first_mut() {
            first.items.insert(
                0,
                LineItem::Text(Run {
                    x: self.geometry.margin + BULLET_GLYPH_INSET,
                    text: BULLET_GLYPH.to_string(),
                    face: FontFace::Regular,
                    size_pt: BODY_SIZE_PT,
                    color: Rgb::BLACK,
                }),
            );
        }
        Ok(Block::new(self.style.bullet_spacing, lines))
    }

    // ── Skills ────────────────────────────────────────────────────────────────

    /// Flat list when no skill has a category, otherwise one block per category
    /// in first-appearance order with uncategorized skills last.
    fn skill_blocks(&self, skills: &[Skill]) -> Result<Vec<Block>, LayoutError> {
        let named: Vec<&Skill> = skills.iter().filter(|s| !s.name.trim().is_empty()).collect();
        if named.is_empty() {
            return Ok(Vec::new());
        }

        let grouped = named.iter().any(|s| non_blank(&s.category).is_some());
        if !grouped {
            let names: Vec<&str> = named.iter().map(|s| s.name.trim()).collect();
            let lines = self.body_lines(&names.join(SKILL_SEPARATOR), FontFace::Regular, 0.0)?;
            return Ok(vec![Block::new(0.0, lines)]);
        }

        let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
        let mut uncategorized: Vec<&str> = Vec::new();
        for skill in &named {
            match non_blank(&skill.category) {
                Some(category) => match groups.iter_mut().find(|(c, _)| *c == category) {
                    Some((_, names)) => names.push(skill.name.trim()),
                    None => groups.push((category, vec![skill.name.trim()])),
                },
                None => uncategorized.push(skill.name.trim()),
            }
        }
        if !uncategorized.is_empty() {
            groups.push((UNCATEGORIZED_SKILLS, uncategorized));
        }

        groups
            .into_iter()
            .enumerate()
            .map(|(i, (category, names))| {
                let mut lines = self.body_lines(category, FontFace::Bold, 0.0)?;
                lines.extend(self.body_lines(&names.join(SKILL_SEPARATOR), FontFace::Regular, 0.0)?);
                let gap = if i == 0 { 0.0 } else { self.style.bullet_spacing };
                Ok(Block::new(gap, lines))
            })
            .collect()
    }

    // ── Line helpers ──────────────────────────────────────────────────────────

    /// Body text at the content width, advancing `line_spacing` per wrapped line.
    fn body_lines(&self, text: &str, face: FontFace, indent: f32) -> Result<Vec<BlockLine>, LayoutError> {
        self.wrapped(
            text,
            face,
            BODY_SIZE_PT,
            Rgb::BLACK,
            self.geometry.margin + indent,
            self.geometry.content_width() - indent,
            self.style.line_spacing,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn wrapped(
        &self,
        text: &str,
        face: FontFace,
        size_pt: f32,
        color: Rgb,
        x: f32,
        width: f32,
        line_height: f32,
    ) -> Result<Vec<BlockLine>, LayoutError> {
        Ok(wrap_text(self.measurer, text, face, size_pt, width)?
            .into_iter()
            .map(|line| BlockLine {
                height: line_height,
                items: if line.is_empty() {
                    Vec::new()
                } else {
                    vec![LineItem::Text(Run {
                        x,
                        text: line,
                        face,
                        size_pt,
                        color,
                    })]
                },
            })
            .collect())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pass 2: blocks → pages
// ────────────────────────────────────────────────────────────────────────────

fn paginate(blocks: &[Block], geometry: PageGeometry) -> Vec<Page> {
    let mut cursor = LayoutCursor::new(geometry);
    let mut pages = vec![Page::new(1)];
    let capacity = geometry.content_height();

    for (i, block) in blocks.iter().enumerate() {
        if block.lines.is_empty() {
            continue;
        }

        let mut needed = block.height();
        if block.keep_with_next {
            if let Some(next) = blocks.get(i + 1) {
                if needed + next.height() <= capacity {
                    needed += next.height();
                }
            }
        }

        if needed <= capacity {
            reserve(&mut cursor, &mut pages, block.gap_before, needed);
            for line in &block.lines {
                emit_line(&mut cursor, &mut pages, line);
            }
        } else {
            // Taller than a page: each line gets its own check.
            for (j, line) in block.lines.iter().enumerate() {
                let gap = if j == 0 { block.gap_before } else { 0.0 };
                reserve(&mut cursor, &mut pages, gap, line.height);
                emit_line(&mut cursor, &mut pages, line);
            }
        }
    }

    pages
}

/// Makes room for `height` (plus `gap` unless at a page top), breaking the page if needed.
fn reserve(cursor: &mut LayoutCursor, pages: &mut Vec<Page>, gap: f32, height: f32) {
    let gap = if cursor.at_page_top() { 0.0 } else { gap };
    if cursor.fits(gap + height) {
        cursor.advance(gap);
    } else {
        cursor.break_page();
        pages.push(Page::new(cursor.page_index() + 1));
    }
}

fn emit_line(cursor: &mut LayoutCursor, pages: &mut [Page], line: &BlockLine) {
    let top = cursor.y();
    let geometry = *cursor.geometry();
    let page = &mut pages[cursor.page_index()];

    for item in &line.items {
        match item {
            LineItem::Text(run) => page.ops.push(DrawOp::Text {
                x: run.x,
                y: top + run.size_pt * PT_TO_MM * ASCENT,
                text: run.text.clone(),
                face: run.face,
                size_pt: run.size_pt,
                color: run.color,
            }),
            LineItem::Rule { thickness, color } => {
                let y = top + line.height / 2.0;
                page.ops.push(DrawOp::Rule {
                    x1: geometry.margin,
                    y1: y,
                    x2: geometry.right_edge(),
                    y2: y,
                    thickness: *thickness,
                    color: *color,
                });
            }
        }
    }
    cursor.advance(line.height);
}

// ────────────────────────────────────────────────────────────────────────────
// Pass 3: page numbers
// ────────────────────────────────────────────────────────────────────────────

/// Stamps "Page i of N" bottom-right on every page. Needs the final page count,
/// so it only runs once layout is complete.
pub fn stamp_page_numbers(
    document: &mut LaidOutDocument,
    measurer: &dyn TextMeasurer,
) -> Result<(), LayoutError> {
    let total = document.pages.len();
    let geometry = document.geometry;

    for page in &mut document.pages {
        let label = format!("Page {} of {}", page.number, total);
        let width = measurer.text_width(&label, FontFace::Regular, FOOTER_SIZE_PT)?;
        page.ops.push(DrawOp::Text {
            x: geometry.right_edge() - width,
            y: geometry.height - FOOTER_OFFSET,
            text: label,
            face: FontFace::Regular,
            size_pt: FOOTER_SIZE_PT,
            color: Rgb::GRAY,
        });
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::StandardFontMeasurer;
    use crate::layout::template::TemplateId;
    use crate::models::resume::PersonalInfo;

    fn layout(content: &ResumeContent) -> LaidOutDocument {
        layout_resume(
            content,
            &TemplateId::Modern.style(),
            PageGeometry::a4(),
            &StandardFontMeasurer,
        )
        .unwrap()
    }

    fn named(name: &str) -> ResumeContent {
        ResumeContent {
            personal_info: PersonalInfo {
                full_name: name.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn job(i: usize, description_lines: usize) -> Experience {
        let description = (1..=description_lines)
            .map(|n| format!("Entry {i} detail {n}"))
            .collect::<Vec<_>>()
            .join("\n");
        Experience {
            title: format!("Engineer {i}"),
            company: format!("Company {i}"),
            start_date: Some("2020-01".to_string()),
            end_date: Some("2021-06".to_string()),
            description: Some(description),
            ..Default::default()
        }
    }

    fn all_texts(doc: &LaidOutDocument) -> Vec<String> {
        doc.pages
            .iter()
            .flat_map(|p| p.texts().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }

    fn page_of(doc: &LaidOutDocument, text: &str) -> usize {
        doc.pages
            .iter()
            .find(|p| p.texts().any(|t| t == text))
            .map(|p| p.number)
            .unwrap_or_else(|| panic!("'{text}' not found"))
    }

    // ── Minimal content ─────────────────────────────────────────────────────

    #[test]
    fn test_name_only_is_single_page_without_sections() {
        let doc = layout(&named("Jane Doe"));
        assert_eq!(doc.page_count(), 1);
        let texts: Vec<&str> = doc.pages[0].texts().collect();
        assert_eq!(texts, vec!["Jane Doe", "Page 1 of 1"]);
        for section in [SUMMARY_TITLE, EXPERIENCE_TITLE, EDUCATION_TITLE, SKILLS_TITLE] {
            assert!(!texts.contains(&section), "{section} should not be drawn");
        }
    }

    #[test]
    fn test_contact_line_joins_present_fields() {
        let mut content = named("Jane Doe");
        content.personal_info.email = Some("jane@example.com".to_string());
        content.personal_info.location = Some("Berlin".to_string());
        content.personal_info.phone = Some("   ".to_string());

        let doc = layout(&content);
        assert_eq!(doc.page_count(), 1);
        let texts: Vec<&str> = doc.pages[0].texts().collect();
        assert_eq!(texts, vec!["Jane Doe", "jane@example.com | Berlin", "Page 1 of 1"]);
    }

    #[test]
    fn test_header_has_divider_rule_in_accent_color() {
        let doc = layout(&named("Jane Doe"));
        let rule = doc.pages[0]
            .ops
            .iter()
            .find(|op| matches!(op, DrawOp::Rule { .. }))
            .expect("divider rule");
        match rule {
            DrawOp::Rule { color, x1, x2, .. } => {
                assert_eq!(*color, TemplateId::Modern.style().accent_color);
                assert_eq!(*x1, 20.0);
                assert_eq!(*x2, 190.0);
            }
            DrawOp::Text { .. } => unreachable!(),
        }
    }

    #[test]
    fn test_missing_name_and_entry_fields_use_placeholders() {
        let content = ResumeContent {
            experience: vec![Experience::default()],
            education: vec![Education::default()],
            ..Default::default()
        };
        let texts = all_texts(&layout(&content));
        assert!(texts.contains(&"Your Name".to_string()));
        assert!(texts.contains(&"Position | Company".to_string()));
        assert!(texts.contains(&"Institution".to_string()));
    }

    // ── Render order & styling ──────────────────────────────────────────────

    #[test]
    fn test_sections_render_in_fixed_order() {
        let mut content = named("Jane Doe");
        content.personal_info.professional_title = "Backend Engineer".to_string();
        content.personal_info.summary = Some("Builds reliable systems.".to_string());
        content.experience = vec![job(1, 1)];
        content.education = vec![Education {
            institution: "TU Berlin".to_string(),
            degree: Some("MSc".to_string()),
            field: Some("Computer Science".to_string()),
            ..Default::default()
        }];
        content.skills = vec![Skill {
            name: "Rust".to_string(),
            level: 5,
            category: None,
        }];

        let texts = all_texts(&layout(&content));
        let pos = |t: &str| texts.iter().position(|x| x == t).unwrap();
        assert!(pos("Jane Doe") < pos("Backend Engineer"));
        assert!(pos("Backend Engineer") < pos(SUMMARY_TITLE));
        assert!(pos(SUMMARY_TITLE) < pos(EXPERIENCE_TITLE));
        assert!(pos(EXPERIENCE_TITLE) < pos("Engineer 1 | Company 1"));
        assert!(pos("Engineer 1 | Company 1") < pos(EDUCATION_TITLE));
        assert!(pos(EDUCATION_TITLE) < pos("MSc in Computer Science"));
        assert!(pos("MSc in Computer Science") < pos(SKILLS_TITLE));
        assert!(pos(SKILLS_TITLE) < pos("Rust"));
    }

    #[test]
    fn test_section_titles_use_header_color_and_body_is_black() {
        let mut content = named("Jane Doe");
        content.experience = vec![job(1, 1)];

        for id in [TemplateId::Modern, TemplateId::Creative] {
            let style = id.style();
            let doc = layout_resume(&content, &style, PageGeometry::a4(), &StandardFontMeasurer)
                .unwrap();
            for op in &doc.pages[0].ops {
                if let DrawOp::Text { text, color, .. } = op {
                    if text == EXPERIENCE_TITLE {
                        assert_eq!(*color, style.header_color);
                    }
                    if text == "Entry 1 detail 1" {
                        assert_eq!(*color, Rgb::BLACK);
                    }
                }
            }
        }
    }

    #[test]
    fn test_date_range_is_right_aligned_on_title_line() {
        let mut content = named("Jane Doe");
        content.experience = vec![job(1, 1)];
        let doc = layout(&content);

        let (title_y, date) = doc.pages[0]
            .ops
            .iter()
            .fold((None, None), |(title_y, date), op| match op {
                DrawOp::Text { text, y, .. } if text == "Engineer 1 | Company 1" => (Some(*y), date),
                DrawOp::Text { text, x, y, .. } if text == "Jan 2020 - Jun 2021" => {
                    (title_y, Some((*x, *y)))
                }
                _ => (title_y, date),
            });
        let (date_x, date_y) = date.expect("date label");
        let width = StandardFontMeasurer
            .text_width("Jan 2020 - Jun 2021", FontFace::Regular, BODY_SIZE_PT)
            .unwrap();
        assert!((date_x + width - 190.0).abs() < 1e-3);
        // Same line box; baselines differ only by font size.
        assert!((title_y.unwrap() - date_y).abs() < 2.0);
    }

    #[test]
    fn test_long_date_label_moves_below_title_inside_margins() {
        let mut content = named("Jane Doe");
        let mut entry = job(1, 1);
        entry.start_date = Some(
            "Part-time contract alongside full-time studies, mostly remote with on-site visits \
             during release weeks and some weekends"
                .to_string(),
        );
        entry.end_date = None;
        entry.current = true;
        content.experience = vec![entry];
        let doc = layout(&content);
        let geometry = PageGeometry::a4();

        for op in &doc.pages[0].ops {
            if let DrawOp::Text { x, text, face, size_pt, .. } = op {
                let width = StandardFontMeasurer.text_width(text, *face, *size_pt).unwrap();
                assert!(*x >= geometry.margin - 1e-3, "'{text}' starts at x={x}");
                assert!(x + width <= geometry.right_edge() + 1e-3, "'{text}' ends past the margin");
            }
        }

        let texts = all_texts(&doc);
        let title = texts.iter().position(|t| t == "Engineer 1 | Company 1").unwrap();
        assert!(texts[title + 1].starts_with("Part-time contract"));
        assert!(texts.iter().any(|t| t.ends_with("Present")));
    }

    #[test]
    fn test_skills_grouped_by_category_with_uncategorized_last() {
        let mut content = named("Jane Doe");
        content.skills = vec![
            Skill { name: "Docker".to_string(), level: 3, category: None },
            Skill { name: "Rust".to_string(), level: 5, category: Some("Languages".to_string()) },
            Skill { name: "Go".to_string(), level: 4, category: Some("Languages".to_string()) },
        ];
        let texts = all_texts(&layout(&content));
        let pos = |t: &str| texts.iter().position(|x| x == t).unwrap();
        assert!(pos("Languages") < pos("Rust • Go"));
        assert!(pos("Rust • Go") < pos("Other"));
        assert!(pos("Other") < pos("Docker"));
    }

    #[test]
    fn test_skills_flat_list_without_categories() {
        let mut content = named("Jane Doe");
        content.skills = ["Rust", "Go", " ", "SQL"]
            .into_iter()
            .map(|n| Skill { name: n.to_string(), level: 3, category: None })
            .collect();
        let texts = all_texts(&layout(&content));
        assert!(texts.contains(&"Rust • Go • SQL".to_string()));
    }

    #[test]
    fn test_blank_skill_names_only_skip_section() {
        let mut content = named("Jane Doe");
        content.skills = vec![Skill { name: "  ".to_string(), level: 1, category: None }];
        let texts = all_texts(&layout(&content));
        assert!(!texts.contains(&SKILLS_TITLE.to_string()));
    }

    // ── Pagination ──────────────────────────────────────────────────────────

    #[test]
    fn test_twenty_entries_break_only_at_entry_boundaries() {
        let mut content = named("Jane Doe");
        content.experience = (1..=20).map(|i| job(i, 5)).collect();
        let doc = layout(&content);

        assert!(doc.page_count() > 1, "expected multiple pages");

        for page in doc.pages.iter().skip(1) {
            let first = page.texts().next().unwrap();
            assert!(first.starts_with("Engineer "), "page {} starts mid-entry with '{first}'", page.number);
        }
        for i in 1..=20 {
            let title_page = page_of(&doc, &format!("Engineer {i} | Company {i}"));
            for n in 1..=5 {
                assert_eq!(page_of(&doc, &format!("Entry {i} detail {n}")), title_page);
            }
        }
    }

    #[test]
    fn test_bullets_of_one_job_may_span_pages() {
        let mut content = named("Jane Doe");
        let mut long_job = job(1, 1);
        long_job.highlights = (1..=80).map(|n| format!("Delivered milestone {n}")).collect();
        content.experience = vec![long_job];

        let doc = layout(&content);
        assert!(doc.page_count() >= 2);
        assert_eq!(doc.pages[1].texts().next(), Some(BULLET_GLYPH));
        assert_eq!(page_of(&doc, "Engineer 1 | Company 1"), 1);
    }

    #[test]
    fn test_oversized_description_flows_without_clipping() {
        let mut content = named("Jane Doe");
        content.experience = vec![job(1, 150)];
        let doc = layout(&content);

        assert!(doc.page_count() >= 3);
        let geometry = doc.geometry;
        for page in &doc.pages {
            for op in &page.ops {
                if let DrawOp::Text { text, y, .. } = op {
                    if !text.starts_with("Page ") {
                        assert!(*y > geometry.margin && *y <= geometry.content_bottom(), "'{text}' at {y}");
                    }
                }
            }
        }
        assert!(all_texts(&doc).contains(&"Entry 1 detail 150".to_string()));
    }

    #[test]
    fn test_section_title_moves_with_first_block() {
        let run = |text: &str| LineItem::Text(Run {
            x: 20.0,
            text: text.to_string(),
            face: FontFace::Regular,
            size_pt: BODY_SIZE_PT,
            color: Rgb::BLACK,
        });
        let block = |text: &str, height: f32, keep: bool| Block {
            gap_before: 0.0,
            keep_with_next: keep,
            lines: vec![BlockLine { height, items: vec![run(text)] }],
        };

        // 257mm of capacity: 250 used, 7 left. The title (6) fits alone but not with its entry (10).
        let blocks = vec![
            block("filler", 250.0, false),
            block("Title", 6.0, true),
            block("Entry", 10.0, false),
        ];
        let pages = paginate(&blocks, PageGeometry::a4());
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].texts().collect::<Vec<_>>(), vec!["Title", "Entry"]);
    }

    #[test]
    fn test_gap_is_dropped_at_page_top() {
        let block = Block {
            gap_before: 8.0,
            keep_with_next: false,
            lines: vec![BlockLine { height: 5.0, items: vec![] }],
        };
        let mut cursor = LayoutCursor::new(PageGeometry::a4());
        let mut pages = vec![Page::new(1)];
        reserve(&mut cursor, &mut pages, block.gap_before, block.height());
        assert_eq!(cursor.y(), 20.0);
    }

    // ── Page numbering ──────────────────────────────────────────────────────

    #[test]
    fn test_every_page_has_exact_page_footer() {
        let mut content = named("Jane Doe");
        content.experience = (1..=20).map(|i| job(i, 5)).collect();
        let doc = layout(&content);
        let total = doc.page_count();

        for page in &doc.pages {
            let footers: Vec<&str> = page.texts().filter(|t| t.starts_with("Page ")).collect();
            assert_eq!(footers, vec![format!("Page {} of {}", page.number, total)]);
            match page.ops.last() {
                Some(DrawOp::Text { y, .. }) => assert_eq!(*y, 287.0),
                other => panic!("footer should be drawn last, got {other:?}"),
            }
        }
    }

    // ── Determinism & failure ───────────────────────────────────────────────

    #[test]
    fn test_layout_is_deterministic() {
        let mut content = named("Jane Doe");
        content.experience = (1..=6).map(|i| job(i, 3)).collect();
        assert_eq!(layout(&content), layout(&content));
    }

    #[test]
    fn test_unsupported_glyph_fails_whole_layout() {
        let mut content = named("Jane Doe");
        content.personal_info.summary = Some("Loves 日本語".to_string());
        let result = layout_resume(
            &content,
            &TemplateId::Modern.style(),
            PageGeometry::a4(),
            &StandardFontMeasurer,
        );
        assert!(matches!(result, Err(LayoutError::UnsupportedGlyph { .. })));
    }

    #[test]
    fn test_spacing_follows_template_not_font_size() {
        let mut content = named("Jane Doe");
        content.personal_info.summary = Some("One\nTwo".to_string());
        let y_of = |id: TemplateId, text: &str| {
            let doc = layout_resume(&content, &id.style(), PageGeometry::a4(), &StandardFontMeasurer)
                .unwrap();
            doc.pages[0]
                .ops
                .iter()
                .find_map(|op| match op {
                    DrawOp::Text { text: t, y, size_pt, .. } if t == text => Some((*y, *size_pt)),
                    _ => None,
                })
                .unwrap()
        };
        for id in [TemplateId::Minimal, TemplateId::Classic] {
            let (one_y, one_size) = y_of(id, "One");
            let (two_y, two_size) = y_of(id, "Two");
            assert_eq!(one_size, BODY_SIZE_PT);
            assert_eq!(two_size, BODY_SIZE_PT);
            assert!((two_y - one_y - id.style().line_spacing).abs() < 1e-3);
        }
    }
}
