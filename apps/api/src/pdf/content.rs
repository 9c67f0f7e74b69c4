//! Page content stream builder.
//!
//! Only the operators the resume renderer needs: filled text in the three
//! standard fonts and stroked straight rules. Coordinates given to the builder
//! are already in PDF user space (points, origin bottom-left).

use std::io::Write;

use crate::layout::font_metrics::win_ansi_code;
use crate::layout::template::Rgb;
use crate::pdf::PdfError;

#[derive(Debug, Default)]
pub struct ContentStream {
    data: Vec<u8>,
}

impl ContentStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    // ── Graphics state ────────────────────────────────────────────────────────

    pub fn save_state(&mut self) -> &mut Self {
        self.write_line("q");
        self
    }

    pub fn restore_state(&mut self) -> &mut Self {
        self.write_line("Q");
        self
    }

    pub fn set_line_width(&mut self, width: f32) -> &mut Self {
        self.write_fmt(format_args!("{} w\n", fmt_num(width)));
        self
    }

    pub fn set_fill_rgb(&mut self, color: Rgb) -> &mut Self {
        let (r, g, b) = components(color);
        self.write_fmt(format_args!("{r} {g} {b} rg\n"));
        self
    }

    pub fn set_stroke_rgb(&mut self, color: Rgb) -> &mut Self {
        let (r, g, b) = components(color);
        self.write_fmt(format_args!("{r} {g} {b} RG\n"));
        self
    }

    // ── Paths ─────────────────────────────────────────────────────────────────

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.write_fmt(format_args!("{} {} m\n", fmt_num(x), fmt_num(y)));
        self
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.write_fmt(format_args!("{} {} l\n", fmt_num(x), fmt_num(y)));
        self
    }

    pub fn stroke(&mut self) -> &mut Self {
        self.write_line("S");
        self
    }

    // ── Text ──────────────────────────────────────────────────────────────────

    pub fn begin_text(&mut self) -> &mut Self {
        self.write_line("BT");
        self
    }

    pub fn end_text(&mut self) -> &mut Self {
        self.write_line("ET");
        self
    }

    /// Selects a font resource (Tf), e.g. `F1` at 10pt.
    pub fn set_font(&mut self, resource: &str, size_pt: f32) -> &mut Self {
        self.write_fmt(format_args!("/{} {} Tf\n", resource, fmt_num(size_pt)));
        self
    }

    /// Moves to the start of the next line (Td). Inside a fresh BT this is absolute.
    pub fn move_text(&mut self, x: f32, y: f32) -> &mut Self {
        self.write_fmt(format_args!("{} {} Td\n", fmt_num(x), fmt_num(y)));
        self
    }

    /// Shows a string (Tj), encoded as WinAnsi.
    pub fn show_text(&mut self, text: &str) -> Result<&mut Self, PdfError> {
        let encoded = encode_win_ansi(text)?;
        self.write_pdf_string(&encoded);
        self.write_line(" Tj");
        Ok(self)
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn write_line(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(b'\n');
    }

    fn write_fmt(&mut self, args: std::fmt::Arguments<'_>) {
        // Writing into a Vec cannot fail.
        let _ = self.data.write_fmt(args);
    }

    fn write_pdf_string(&mut self, bytes: &[u8]) {
        write_literal_string(&mut self.data, bytes);
    }
}

/// Encodes text into single-byte WinAnsi codes. Tabs become spaces.
pub fn encode_win_ansi(text: &str) -> Result<Vec<u8>, PdfError> {
    text.chars()
        .map(|c| {
            let c = if c == '\t' { ' ' } else { c };
            win_ansi_code(c).ok_or(PdfError::UnsupportedGlyph { ch: c })
        })
        .collect()
}

/// Writes `bytes` as a PDF literal string. Delimiters are escaped and bytes
/// outside printable ASCII are written as octal escapes.
pub fn write_literal_string(out: &mut Vec<u8>, bytes: &[u8]) {
    out.push(b'(');
    for &byte in bytes {
        match byte {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            0x20..=0x7E => out.push(byte),
            _ => out.extend_from_slice(format!("\\{byte:03o}").as_bytes()),
        }
    }
    out.push(b')');
}

/// Formats a number with at most two decimals and no trailing zeros.
pub fn fmt_num(n: f32) -> String {
    let s = format!("{n:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_string(),
        s => s.to_string(),
    }
}

fn components(color: Rgb) -> (String, String, String) {
    let channel = |v: u8| fmt_num(v as f32 / 255.0);
    (channel(color.r), channel(color.g), channel(color.b))
}
