//! PDF file assembly: header, numbered objects, cross-reference table, trailer.
//!
//! Object layout for a document with N pages:
//! ```text
//! 1        catalog
//! 2        page tree
//! 3        info dictionary
//! 4..=6    fonts F1 (regular), F2 (bold), F3 (italic)
//! 7..      page i at 7 + 2i, its content stream at 8 + 2i
//! ```
//! Output carries no timestamps or file identifiers, so identical input
//! produces identical bytes.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use tracing::debug;

use crate::layout::document::{DrawOp, LaidOutDocument, Page, PageGeometry};
use crate::layout::font_metrics::{FontFace, PT_TO_MM};
use crate::pdf::content::{encode_win_ansi, fmt_num, write_literal_string, ContentStream};
use crate::pdf::{PdfError, PdfOptions};

const PRODUCER: &str = "Folio";
const FONT_FACES: [FontFace; 3] = [FontFace::Regular, FontFace::Bold, FontFace::Italic];

fn font_resource(face: FontFace) -> &'static str {
    match face {
        FontFace::Regular => "F1",
        FontFace::Bold => "F2",
        FontFace::Italic => "F3",
    }
}

fn mm_to_pt(mm: f32) -> f32 {
    mm / PT_TO_MM
}

// ────────────────────────────────────────────────────────────────────────────
// Low-level object writer
// ────────────────────────────────────────────────────────────────────────────

struct PdfWriter<W: Write> {
    writer: W,
    position: u64,
    /// (object number, byte offset)
    offsets: Vec<(u32, u64)>,
    next_obj_num: u32,
    compress: bool,
}

impl<W: Write> PdfWriter<W> {
    fn new(writer: W, compress: bool) -> Self {
        Self {
            writer,
            position: 0,
            offsets: Vec::new(),
            next_obj_num: 1,
            compress,
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), PdfError> {
        self.writer.write_all(data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> Result<(), PdfError> {
        self.write_bytes(s.as_bytes())
    }

    fn allocate_object(&mut self) -> u32 {
        let num = self.next_obj_num;
        self.next_obj_num += 1;
        num
    }

    fn write_header(&mut self) -> Result<(), PdfError> {
        self.write_str("%PDF-1.4\n")?;
        // Binary marker so transfer tools treat the file as binary.
        self.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])
    }

    /// Writes `obj_num 0 obj <body> endobj`. `body` is raw PDF syntax.
    fn write_object(&mut self, obj_num: u32, body: &[u8]) -> Result<(), PdfError> {
        self.offsets.push((obj_num, self.position));
        self.write_str(&format!("{obj_num} 0 obj\n"))?;
        self.write_bytes(body)?;
        self.write_str("\nendobj\n")
    }

    fn write_stream_object(&mut self, obj_num: u32, data: Vec<u8>) -> Result<(), PdfError> {
        let (data, filter) = if self.compress {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&data)?;
            (encoder.finish()?, " /Filter /FlateDecode")
        } else {
            (data, "")
        };

        let mut body = format!("<< /Length {}{} >>\nstream\n", data.len(), filter).into_bytes();
        body.extend_from_slice(&data);
        body.extend_from_slice(b"\nendstream");
        self.write_object(obj_num, &body)
    }

    fn write_xref_and_trailer(&mut self, catalog_ref: u32, info_ref: u32) -> Result<(), PdfError> {
        let xref_offset = self.position;
        let mut entries = std::mem::take(&mut self.offsets);
        entries.sort_by_key(|(num, _)| *num);

        self.write_str("xref\n")?;
        self.write_str(&format!("0 {}\n", self.next_obj_num))?;
        self.write_str("0000000000 65535 f \n")?;

        let mut expected = 1u32;
        for (obj_num, offset) in entries {
            while expected < obj_num {
                self.write_str("0000000000 65535 f \n")?;
                expected += 1;
            }
            self.write_str(&format!("{offset:010} 00000 n \n"))?;
            expected = obj_num + 1;
        }

        self.write_str(&format!(
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\n",
            self.next_obj_num, catalog_ref, info_ref
        ))?;
        self.write_str(&format!("startxref\n{xref_offset}\n%%EOF\n"))
    }

    fn finish(mut self) -> Result<W, PdfError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document writer
// ────────────────────────────────────────────────────────────────────────────

/// Encodes a laid-out document as a complete PDF file.
pub fn write_document(document: &LaidOutDocument, options: &PdfOptions) -> Result<Vec<u8>, PdfError> {
    let geometry = document.geometry;
    let mut pdf = PdfWriter::new(Vec::new(), options.compress);
    pdf.write_header()?;

    let catalog_ref = pdf.allocate_object();
    let pages_ref = pdf.allocate_object();
    let info_ref = pdf.allocate_object();
    let font_refs: Vec<u32> = FONT_FACES.iter().map(|_| pdf.allocate_object()).collect();
    let page_refs: Vec<(u32, u32)> = document
        .pages
        .iter()
        .map(|_| (pdf.allocate_object(), pdf.allocate_object()))
        .collect();

    pdf.write_object(
        catalog_ref,
        format!("<< /Type /Catalog /Pages {pages_ref} 0 R >>").as_bytes(),
    )?;

    let kids = page_refs
        .iter()
        .map(|(page, _)| format!("{page} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    pdf.write_object(
        pages_ref,
        format!(
            "<< /Type /Pages /Kids [{kids}] /Count {} /MediaBox [0 0 {} {}] >>",
            page_refs.len(),
            fmt_num(mm_to_pt(geometry.width)),
            fmt_num(mm_to_pt(geometry.height)),
        )
        .as_bytes(),
    )?;

    pdf.write_object(info_ref, &info_dictionary(options.title.as_deref())?)?;

    for (face, obj_num) in FONT_FACES.iter().zip(&font_refs) {
        pdf.write_object(
            *obj_num,
            format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                face.base_font()
            )
            .as_bytes(),
        )?;
    }

    let fonts = FONT_FACES
        .iter()
        .zip(&font_refs)
        .map(|(face, obj_num)| format!("/{} {obj_num} 0 R", font_resource(*face)))
        .collect::<Vec<_>>()
        .join(" ");

    for (page, (page_ref, content_ref)) in document.pages.iter().zip(&page_refs) {
        pdf.write_object(
            *page_ref,
            format!(
                "<< /Type /Page /Parent {pages_ref} 0 R /Resources << /Font << {fonts} >> >> /Contents {content_ref} 0 R >>"
            )
            .as_bytes(),
        )?;
        pdf.write_stream_object(*content_ref, page_content(page, &geometry)?)?;
    }

    pdf.write_xref_and_trailer(catalog_ref, info_ref)?;
    let bytes = pdf.finish()?;

    debug!(
        pages = document.pages.len(),
        bytes = bytes.len(),
        compressed = options.compress,
        "pdf written"
    );
    Ok(bytes)
}

fn info_dictionary(title: Option<&str>) -> Result<Vec<u8>, PdfError> {
    let mut body = b"<< /Producer ".to_vec();
    write_literal_string(&mut body, PRODUCER.as_bytes());
    if let Some(title) = title {
        body.extend_from_slice(b" /Title ");
        write_literal_string(&mut body, &encode_win_ansi(title)?);
    }
    body.extend_from_slice(b" >>");
    Ok(body)
}

/// Translates one page's draw ops into content-stream operators.
/// Layout coordinates (mm, top-left origin) become points with a bottom-left origin.
fn page_content(page: &Page, geometry: &PageGeometry) -> Result<Vec<u8>, PdfError> {
    let flip = |y: f32| mm_to_pt(geometry.height - y);
    let mut stream = ContentStream::new();

    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                text,
                face,
                size_pt,
                color,
            } => {
                stream
                    .begin_text()
                    .set_font(font_resource(*face), *size_pt)
                    .set_fill_rgb(*color)
                    .move_text(mm_to_pt(*x), flip(*y));
                stream.show_text(text)?.end_text();
            }
            DrawOp::Rule {
                x1,
                y1,
                x2,
                y2,
                thickness,
                color,
            } => {
                stream
                    .save_state()
                    .set_stroke_rgb(*color)
                    .set_line_width(mm_to_pt(*thickness))
                    .move_to(mm_to_pt(*x1), flip(*y1))
                    .line_to(mm_to_pt(*x2), flip(*y2))
                    .stroke()
                    .restore_state();
            }
        }
    }

    Ok(stream.into_bytes())
}
