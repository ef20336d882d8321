// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page stamping: draw text over every page of an existing PDF (watermarks,
// page numbers) by appending a content stream per page.

use docwerk_core::WatermarkStyle;
use docwerk_core::error::{DocwerkError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, info, instrument};

use super::reader::{PdfReader, inherited_attribute, page_dictionary_mut, resolve, serialise};

/// Resource name of the font added for stamps. Unusual enough not to clash
/// with fonts already on the page.
const STAMP_FONT: &[u8] = b"FDocwerkStamp";

/// Average Helvetica glyph advance as a fraction of the font size.
const HELVETICA_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Approximate Helvetica cap height as a fraction of the font size.
const HELVETICA_CAP_HEIGHT_RATIO: f32 = 0.7;

/// Characters WinAnsiEncoding places in 0x80..=0x9F. Everything else it
/// covers sits at its Latin-1 code point.
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('\u{20AC}', 0x80),
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

const PAGE_NUMBER_FONT_SIZE: f32 = 10.0;
const PAGE_NUMBER_MARGIN: f32 = 20.0;

/// US Letter, used when a page has no readable /MediaBox.
const DEFAULT_MEDIA_BOX: PageBox = PageBox {
    left: 0.0,
    bottom: 0.0,
    right: 612.0,
    top: 792.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct PageBox {
    left: f32,
    bottom: f32,
    right: f32,
    top: f32,
}

impl PageBox {
    fn centre(&self) -> (f32, f32) {
        (
            (self.left + self.right) / 2.0,
            (self.bottom + self.top) / 2.0,
        )
    }
}

impl PdfReader {
    /// Stamp `text` diagonally across the centre of every page.
    ///
    /// Stamps accumulate: watermarking an already watermarked document adds a
    /// second stamp on top of the first.
    ///
    /// The text is drawn in WinAnsi-encoded Helvetica; characters outside that
    /// encoding are rejected with `InvalidParameter`.
    #[instrument(skip(self, style), fields(text_len = text.len()))]
    pub fn watermark(&self, text: &str, style: &WatermarkStyle) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(DocwerkError::InvalidParameter(
                "watermark text is empty".into(),
            ));
        }
        let encoded = win_ansi(text)?;

        let (sin, cos) = style.angle_degrees.to_radians().sin_cos();
        let size = style.font_size;
        let width = text_width(text, size);
        let cap_height = size * HELVETICA_CAP_HEIGHT_RATIO;

        let mut doc = self.document().clone();
        stamp_every_page(&mut doc, |_, _, media_box| {
            let (cx, cy) = media_box.centre();
            // Start the baseline so the text's midpoint lands on the page centre.
            let x = cx - cos * width / 2.0 + sin * cap_height / 2.0;
            let y = cy - sin * width / 2.0 - cos * cap_height / 2.0;
            text_operations(
                &encoded,
                size,
                style.gray,
                [cos, sin, -sin, cos, x, y],
            )
        })?;

        info!(pages = doc.get_pages().len(), "Watermark applied");
        serialise(&mut doc, "watermarked PDF")
    }

    /// Stamp `n / total` at the bottom centre of every page.
    #[instrument(skip(self))]
    pub fn number_pages(&self) -> Result<Vec<u8>> {
        let mut doc = self.document().clone();
        stamp_every_page(&mut doc, |index, total, media_box| {
            let label = format!("{} / {}", index + 1, total);
            let (cx, _) = media_box.centre();
            let x = cx - text_width(&label, PAGE_NUMBER_FONT_SIZE) / 2.0;
            let y = media_box.bottom + PAGE_NUMBER_MARGIN;
            // Digits, spaces and '/' encode to themselves.
            text_operations(
                label.as_bytes(),
                PAGE_NUMBER_FONT_SIZE,
                0.0,
                [1.0, 0.0, 0.0, 1.0, x, y],
            )
        })?;

        info!(pages = doc.get_pages().len(), "Page numbers applied");
        serialise(&mut doc, "numbered PDF")
    }
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * HELVETICA_CHAR_WIDTH_RATIO
}

/// Encode `text` as WinAnsiEncoding bytes for the stamp font.
fn win_ansi(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|c| {
            win_ansi_byte(c).ok_or_else(|| {
                DocwerkError::InvalidParameter(format!(
                    "watermark character {:?} (U+{:04X}) cannot be drawn",
                    c,
                    u32::from(c)
                ))
            })
        })
        .collect()
}

fn win_ansi_byte(c: char) -> Option<u8> {
    match u32::from(c) {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => u8::try_from(code).ok(),
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(glyph, _)| *glyph == c)
            .map(|(_, byte)| *byte),
    }
}

/// Operations drawing one line of already encoded text with the given text
/// matrix. The leading `Q` closes the `q` inserted before the page's original
/// content.
fn text_operations(text: &[u8], size: f32, gray: f32, matrix: [f32; 6]) -> Vec<Operation> {
    vec![
        Operation::new("Q", vec![]),
        Operation::new("q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new("g", vec![Object::Real(gray)]),
        Operation::new(
            "Tf",
            vec![Object::Name(STAMP_FONT.to_vec()), Object::Real(size)],
        ),
        Operation::new("Tm", matrix.iter().map(|v| Object::Real(*v)).collect()),
        Operation::new(
            "Tj",
            vec![Object::String(text.to_vec(), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
    ]
}

/// Append a stamp content stream to every page. `operations_for` receives the
/// zero-based page index, the page count and the page's media box.
fn stamp_every_page<F>(doc: &mut Document, mut operations_for: F) -> Result<()>
where
    F: FnMut(usize, usize, PageBox) -> Vec<Operation>,
{
    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    let font_id = doc.add_object(font);

    // Isolates the original content's graphics state from the stamp.
    let save_state_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));

    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    let total = page_ids.len();

    for (index, page_id) in page_ids.into_iter().enumerate() {
        let media_box = media_box(doc, page_id);
        let content = Content {
            operations: operations_for(index, total, media_box),
        }
        .encode()
        .map_err(|err| DocwerkError::PdfError(format!("failed to encode stamp: {}", err)))?;
        let stamp_id = doc.add_object(Stream::new(Dictionary::new(), content));

        let mut resources = page_resources(doc, page_id);
        let mut fonts = resources
            .get(b"Font")
            .ok()
            .and_then(|fonts| resolve(doc, fonts).ok())
            .and_then(|fonts| fonts.as_dict().ok())
            .cloned()
            .unwrap_or_else(Dictionary::new);
        fonts.set(STAMP_FONT.to_vec(), Object::Reference(font_id));
        resources.set("Font", Object::Dictionary(fonts));

        let mut contents = content_refs(doc, page_id);
        contents.insert(0, Object::Reference(save_state_id));
        contents.push(Object::Reference(stamp_id));

        let page = page_dictionary_mut(doc, page_id)?;
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", Object::Array(contents));
    }

    debug!(pages = total, "Stamp streams appended");
    Ok(())
}

/// The page's effective resource dictionary (own or inherited), as a copy.
fn page_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    inherited_attribute(doc, page_id, b"Resources")
        .and_then(|resources| resolve(doc, resources).ok())
        .and_then(|resources| resources.as_dict().ok())
        .cloned()
        .unwrap_or_else(Dictionary::new)
}

/// The page's content streams as an array of references.
fn content_refs(doc: &Document, page_id: ObjectId) -> Vec<Object> {
    let Some(contents) = doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"Contents").ok())
    else {
        return Vec::new();
    };

    match contents {
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Object::Array(items) => items.clone(),
        _ => Vec::new(),
    }
}

fn media_box(doc: &Document, page_id: ObjectId) -> PageBox {
    let corners: Option<Vec<f32>> = inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|media_box| resolve(doc, media_box).ok())
        .and_then(|media_box| media_box.as_array().ok())
        .and_then(|values| values.iter().map(|v| v.as_float().ok()).collect());

    match corners.as_deref() {
        Some(&[left, bottom, right, top]) => PageBox {
            left,
            bottom,
            right,
            top,
        },
        _ => DEFAULT_MEDIA_BOX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{page_contents, page_labels, sample_pdf, shown_strings};

    #[test]
    fn watermark_lands_on_every_page() {
        let reader = PdfReader::from_bytes(&sample_pdf("W", 3)).unwrap();
        let stamped = reader
            .watermark("CONFIDENTIAL", &WatermarkStyle::default())
            .unwrap();

        let contents = page_contents(&stamped);
        assert_eq!(contents.len(), 3);
        for (index, content) in contents.iter().enumerate() {
            assert!(content.contains("CONFIDENTIAL"), "page {} unstamped", index + 1);
            assert!(content.contains(&format!("W-{}", index + 1)));
        }
    }

    #[test]
    fn watermarks_stack() {
        let style = WatermarkStyle::default();
        let reader = PdfReader::from_bytes(&sample_pdf("W", 1)).unwrap();
        let once = reader.watermark("DRAFT", &style).unwrap();
        let twice = PdfReader::from_bytes(&once)
            .unwrap()
            .watermark("DRAFT", &style)
            .unwrap();

        let content = &page_contents(&twice)[0];
        assert_eq!(content.matches("DRAFT").count(), 2);
    }

    #[test]
    fn blank_watermark_rejected() {
        let reader = PdfReader::from_bytes(&sample_pdf("W", 1)).unwrap();
        let err = reader.watermark("   ", &WatermarkStyle::default()).unwrap_err();
        assert!(matches!(err, DocwerkError::InvalidParameter(_)));
    }

    #[test]
    fn non_ascii_watermark_is_win_ansi_encoded() {
        let reader = PdfReader::from_bytes(&sample_pdf("W", 2)).unwrap();
        let stamped = reader
            .watermark("VERTRAULICH \u{2013} \u{C4}NDERUNG \u{A9}", &WatermarkStyle::default())
            .unwrap();

        for shown in shown_strings(&stamped) {
            assert_eq!(shown.last().unwrap(), b"VERTRAULICH \x96 \xC4NDERUNG \xA9");
        }

        let doc = Document::load_mem(&stamped).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let font_id = doc
            .get_dictionary(page_id)
            .and_then(|page| page.get(b"Resources"))
            .and_then(Object::as_dict)
            .and_then(|resources| resources.get(b"Font"))
            .and_then(Object::as_dict)
            .and_then(|fonts| fonts.get(STAMP_FONT))
            .and_then(Object::as_reference)
            .unwrap();
        let encoding = doc
            .get_dictionary(font_id)
            .and_then(|font| font.get(b"Encoding"))
            .and_then(Object::as_name)
            .unwrap();
        assert_eq!(encoding, b"WinAnsiEncoding");
    }

    #[test]
    fn unencodable_watermark_rejected() {
        let reader = PdfReader::from_bytes(&sample_pdf("W", 1)).unwrap();
        let err = reader
            .watermark("\u{6C34}\u{5370}", &WatermarkStyle::default())
            .unwrap_err();
        assert!(matches!(err, DocwerkError::InvalidParameter(ref m) if m.contains("U+6C34")));
    }

    #[test]
    fn page_numbers_count_pages() {
        let reader = PdfReader::from_bytes(&sample_pdf("N", 2)).unwrap();
        let numbered = reader.number_pages().unwrap();

        let contents = page_contents(&numbered);
        assert!(contents[0].contains("1 / 2"));
        assert!(contents[1].contains("2 / 2"));
        assert_eq!(page_labels(&numbered).len(), 2);
    }

    #[test]
    fn media_box_falls_back_to_letter() {
        let doc = Document::with_version("1.5");
        assert_eq!(media_box(&doc, (99, 0)), DEFAULT_MEDIA_BOX);
    }
}
