//! Static font-metric tables for the three PDF base-14 faces used by the exporter.
//!
//! Widths are the Adobe AFM advance widths divided by 1000, so they are in em
//! units (relative to font size). There is no kerning, which keeps the width of
//! a string equal to the sum of its glyph widths and makes wrapping additive.
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.
//!
//! Characters outside ASCII are accepted only when WinAnsiEncoding can encode
//! them; anything else is a measurement failure, because the exported PDF would
//! not be able to show it.

use serde::{Deserialize, Serialize};

use crate::layout::LayoutError;

/// Points to millimeters (1pt = 1/72in, 1in = 25.4mm).
pub const PT_TO_MM: f32 = 25.4 / 72.0;

// ────────────────────────────────────────────────────────────────────────────
// Font faces
// ────────────────────────────────────────────────────────────────────────────

/// The faces the layout engine draws with. Each maps onto a base-14 PDF font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
}

impl FontFace {
    /// The base-14 PostScript name written into the PDF font dictionary.
    pub fn base_font(&self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
            FontFace::Italic => "Helvetica-Oblique",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Text measurement
// ────────────────────────────────────────────────────────────────────────────

/// Measures rendered text. Widths are returned in millimeters.
pub trait TextMeasurer {
    fn text_width(&self, text: &str, face: FontFace, size_pt: f32) -> Result<f32, LayoutError>;
}

/// Measurer backed by the static Helvetica tables below.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFontMeasurer;

impl TextMeasurer for StandardFontMeasurer {
    fn text_width(&self, text: &str, face: FontFace, size_pt: f32) -> Result<f32, LayoutError> {
        let em = get_metrics(face).measure_str(text)?;
        Ok(em * size_pt * PT_TO_MM)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a face.
///
/// `widths[i]` = width of ASCII character `(i + 32)`, covering 0x20 (space) through 0x7E (~).
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Width for encodable non-ASCII characters (accents, dashes, bullet).
    pub average_char_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    ///
    /// Tabs count as spaces. Non-ASCII characters that WinAnsiEncoding can
    /// represent fall back to `average_char_width`; anything else is an error.
    pub fn measure_str(&self, s: &str) -> Result<f32, LayoutError> {
        s.chars()
            .map(|c| {
                let c = if c == '\t' { ' ' } else { c };
                let code = c as usize;
                if (32..=126).contains(&code) {
                    Ok(self.widths[code - 32])
                } else if win_ansi_code(c).is_some() {
                    Ok(self.average_char_width)
                } else {
                    Err(LayoutError::UnsupportedGlyph { ch: c })
                }
            })
            .sum()
    }
}

/// Helvetica (regular and oblique share advance widths).
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.611,
};

/// Returns the static metric table for a face.
pub fn get_metrics(face: FontFace) -> &'static FontMetricTable {
    match face {
        FontFace::Regular | FontFace::Italic => &HELVETICA_TABLE,
        FontFace::Bold => &HELVETICA_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// WinAnsiEncoding
// ────────────────────────────────────────────────────────────────────────────

/// Maps a character to its WinAnsiEncoding byte, if the base-14 fonts can show it.
pub fn win_ansi_code(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => Some(match c {
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => return None,
        }),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Word wrap
// ────────────────────────────────────────────────────────────────────────────

/// Greedy word-wrap of `text` to `max_width_mm`.
///
/// Explicit newlines start a new line; blank input lines are kept as empty
/// lines. A single word wider than the line is broken between characters.
/// Empty or whitespace-only text yields no lines.
pub fn wrap_text(
    measurer: &dyn TextMeasurer,
    text: &str,
    face: FontFace,
    size_pt: f32,
    max_width_mm: f32,
) -> Result<Vec<String>, LayoutError> {
    let space_w = measurer.text_width(" ", face, size_pt)?;
    let mut lines = Vec::new();

    for paragraph in text.trim().lines() {
        let mut current = String::new();
        let mut current_w = 0.0_f32;
        let mut any_word = false;

        for word in paragraph.split_whitespace() {
            any_word = true;
            let word_w = measurer.text_width(word, face, size_pt)?;

            if word_w > max_width_mm {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let mut pieces = split_long_word(measurer, word, face, size_pt, max_width_mm)?;
                let (last, last_w) = pieces.pop().unwrap_or_default();
                lines.extend(pieces.into_iter().map(|(piece, _)| piece));
                current = last;
                current_w = last_w;
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
                current_w = word_w;
            } else if current_w + space_w + word_w > max_width_mm {
                lines.push(std::mem::replace(&mut current, word.to_string()));
                current_w = word_w;
            } else {
                current.push(' ');
                current.push_str(word);
                current_w += space_w + word_w;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        } else if !any_word {
            lines.push(String::new());
        }
    }

    Ok(lines)
}

/// Breaks an over-wide word into pieces that each fit `max_width_mm`.
/// Every piece holds at least one character.
fn split_long_word(
    measurer: &dyn TextMeasurer,
    word: &str,
    face: FontFace,
    size_pt: f32,
    max_width_mm: f32,
) -> Result<Vec<(String, f32)>, LayoutError> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_w = 0.0_f32;
    let mut buf = [0u8; 4];

    for c in word.chars() {
        let char_w = measurer.text_width(c.encode_utf8(&mut buf), face, size_pt)?;
        if !current.is_empty() && current_w + char_w > max_width_mm {
            pieces.push((std::mem::take(&mut current), current_w));
            current_w = 0.0;
        }
        current.push(c);
        current_w += char_w;
    }
    if !current.is_empty() {
        pieces.push((current, current_w));
    }
    Ok(pieces)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
