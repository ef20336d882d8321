// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: create new PDF documents from text or images using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use docwerk_core::PaperSize;
use docwerk_core::error::{DocwerkError, Result};
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, RawImage,
    RawImageData, RawImageFormat, TextItem, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use crate::image::ImageProcessor;

const TEXT_FONT_SIZE_PT: f32 = 11.0;
const TEXT_LINE_HEIGHT_PT: f32 = 14.0;
const TEXT_MARGIN_MM: f32 = 20.0;
const IMAGE_MARGIN_MM: f32 = 15.0;

/// Creates new PDF documents from text content or raster images.
pub struct PdfWriter {
    paper_size: PaperSize,
    /// Resolution at which image pixels map to page points.
    image_dpi: f32,
}

impl PdfWriter {
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            image_dpi: 150.0,
        }
    }

    /// Create a new writer defaulting to A4.
    pub fn a4() -> Self {
        Self::new(PaperSize::A4)
    }

    /// Set the image resolution. Non-positive or non-finite values are
    /// ignored and the current resolution is kept.
    pub fn with_image_dpi(mut self, dpi: f32) -> Self {
        if dpi.is_finite() && dpi > 0.0 {
            self.image_dpi = dpi;
        } else {
            warn!(dpi, kept = self.image_dpi, "ignoring unusable image DPI");
        }
        self
    }

    /// Paper dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    fn save(doc: &PdfDocument) -> Vec<u8> {
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(warnings = warnings.len(), "printpdf reported warnings");
        }
        output
    }

    // -- Text to PDF ----------------------------------------------------------

    /// Create a PDF from plain text content.
    ///
    /// The text flows top-to-bottom in Helvetica 11pt. Long lines are wrapped
    /// at an estimated character width and pages break automatically.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn create_from_text(&self, text: &str) -> Result<Vec<u8>> {
        let (page_w, page_h) = self.page_dimensions();
        let title = "Docwerk Document";

        info!(paper = ?self.paper_size, title, "Creating text PDF");

        let margin_pt = Mm(TEXT_MARGIN_MM).into_pt().0;
        let usable_width_mm = page_w.0 - 2.0 * TEXT_MARGIN_MM;

        // Average Helvetica glyph width is roughly half the font size
        // (1pt = 0.3528mm).
        let avg_char_width_mm = 0.50 * TEXT_FONT_SIZE_PT * 0.3528;
        let max_chars_per_line = ((usable_width_mm / avg_char_width_mm) as usize).max(1);

        let page_h_pt = page_h.into_pt().0;
        let usable_height_pt = page_h_pt - 2.0 * margin_pt;
        let lines_per_page = ((usable_height_pt / TEXT_LINE_HEIGHT_PT) as usize).max(1);

        let wrapped_lines = wrap_text(text, max_chars_per_line);

        let mut pages: Vec<PdfPage> = wrapped_lines
            .chunks(lines_per_page)
            .map(|chunk| {
                let ops = chunk
                    .iter()
                    .enumerate()
                    .flat_map(|(line_idx, line)| {
                        let y_pt = page_h_pt - margin_pt - (line_idx as f32 * TEXT_LINE_HEIGHT_PT);
                        [
                            Op::StartTextSection,
                            Op::SetTextCursor {
                                pos: Point {
                                    x: Pt(margin_pt),
                                    y: Pt(y_pt),
                                },
                            },
                            Op::SetFontSizeBuiltinFont {
                                size: Pt(TEXT_FONT_SIZE_PT),
                                font: BuiltinFont::Helvetica,
                            },
                            Op::WriteTextBuiltinFont {
                                items: vec![TextItem::Text(line.clone())],
                                font: BuiltinFont::Helvetica,
                            },
                            Op::EndTextSection,
                        ]
                    })
                    .collect();
                PdfPage::new(page_w, page_h, ops)
            })
            .collect();

        // Empty input still produces a (blank) page.
        if pages.is_empty() {
            pages.push(PdfPage::new(page_w, page_h, Vec::new()));
        }

        let mut doc = PdfDocument::new(title);
        doc.with_pages(pages);

        debug!(
            total_lines = wrapped_lines.len(),
            pages = doc.pages.len(),
            "Text layout complete"
        );

        Ok(Self::save(&doc))
    }

    // -- Images to PDF --------------------------------------------------------

    /// Create a PDF with one page per image, in the order given.
    ///
    /// Each image is centred and scaled down (never up) to fit within the page
    /// margins, preserving its aspect ratio.
    #[instrument(skip_all, fields(images = images.len()))]
    pub fn create_from_images(&self, images: &[&[u8]]) -> Result<Vec<u8>> {
        if images.is_empty() {
            return Err(DocwerkError::ImageError("no images supplied".into()));
        }

        let (page_w, page_h) = self.page_dimensions();
        let title = "Docwerk Images";
        info!(paper = ?self.paper_size, title, "Creating image PDF");

        let margin_pt = Mm(IMAGE_MARGIN_MM).into_pt().0;
        let usable_w_pt = Mm(page_w.0 - 2.0 * IMAGE_MARGIN_MM).into_pt().0;
        let usable_h_pt = Mm(page_h.0 - 2.0 * IMAGE_MARGIN_MM).into_pt().0;

        let mut doc = PdfDocument::new(title);
        let mut pages = Vec::with_capacity(images.len());

        for (index, image_bytes) in images.iter().enumerate() {
            let rgb_image = ImageProcessor::from_bytes(image_bytes)
                .map_err(|err| {
                    DocwerkError::ImageError(format!("image #{}: {}", index + 1, err))
                })?
                .into_dynamic()
                .to_rgb8();

            let img_width = rgb_image.width() as usize;
            let img_height = rgb_image.height() as usize;
            let raw = RawImage {
                pixels: RawImageData::U8(rgb_image.into_raw()),
                width: img_width,
                height: img_height,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            let img_w_pt = img_width as f32 / self.image_dpi * 72.0;
            let img_h_pt = img_height as f32 / self.image_dpi * 72.0;
            let scale = (usable_w_pt / img_w_pt).min(usable_h_pt / img_h_pt).min(1.0);

            let rendered_w_pt = img_w_pt * scale;
            let rendered_h_pt = img_h_pt * scale;
            let x_offset = margin_pt + (usable_w_pt - rendered_w_pt) / 2.0;
            let y_offset = margin_pt + (usable_h_pt - rendered_h_pt) / 2.0;

            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(x_offset)),
                    translate_y: Some(Pt(y_offset)),
                    scale_x: Some(scale),
                    scale_y: Some(scale),
                    dpi: Some(self.image_dpi),
                    rotate: None,
                },
            }];
            pages.push(PdfPage::new(page_w, page_h, ops));

            debug!(index, rendered_w_pt, rendered_h_pt, scale, "Image placed on page");
        }

        doc.with_pages(pages);
        Ok(Self::save(&doc))
    }
}

// -- Text wrapping helper -----------------------------------------------------

/// Wrap text so that no line exceeds `max_width` characters.
///
/// Existing newlines are kept; words are packed greedily; words longer than a
/// line are broken on character boundaries.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();

            if current_len > 0 && current_len + 1 + word_len <= max_width {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
                continue;
            }

            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }

            let chars: Vec<char> = word.chars().collect();
            let mut pieces = chars.chunks(max_width).peekable();
            while let Some(piece) = pieces.next() {
                if pieces.peek().is_some() {
                    lines.push(piece.iter().collect());
                } else {
                    current = piece.iter().collect();
                    current_len = piece.len();
                }
            }
        }

        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{page_count, sample_png};

    #[test]
    fn wrap_packs_words() {
        assert_eq!(wrap_text("aa bb cc", 5), vec!["aa bb", "cc"]);
    }

    #[test]
    fn wrap_breaks_long_words_on_char_boundaries() {
        assert_eq!(wrap_text("ééééé", 2), vec!["éé", "éé", "é"]);
    }

    #[test]
    fn wrap_keeps_blank_lines() {
        assert_eq!(wrap_text("one\n\ntwo", 10), vec!["one", "", "two"]);
    }

    #[test]
    fn short_text_fits_one_page() {
        let pdf = PdfWriter::a4().create_from_text("Hello, Docwerk").unwrap();
        assert_eq!(page_count(&pdf), 1);
    }

    #[test]
    fn empty_text_gives_blank_page() {
        let pdf = PdfWriter::a4().create_from_text("").unwrap();
        assert_eq!(page_count(&pdf), 1);
    }

    #[test]
    fn one_page_per_image() {
        let first = sample_png(40, 20);
        let second = sample_png(10, 30);
        let pdf = PdfWriter::a4()
            .create_from_images(&[&first[..], &second[..]])
            .unwrap();
        assert_eq!(page_count(&pdf), 2);
    }

    #[test]
    fn undecodable_image_is_named() {
        let good = sample_png(4, 4);
        let err = PdfWriter::a4()
            .create_from_images(&[&good[..], &b"garbage"[..]])
            .unwrap_err();
        assert!(matches!(err, DocwerkError::ImageError(ref m) if m.contains("#2")));
    }

    #[test]
    fn zero_dpi_keeps_the_default_resolution() {
        let writer = PdfWriter::a4().with_image_dpi(0.0).with_image_dpi(f32::NAN);
        assert_eq!(writer.image_dpi, 150.0);

        let image = sample_png(30, 30);
        let pdf = writer.create_from_images(&[&image[..]]).unwrap();
        assert_eq!(page_count(&pdf), 1);
    }
}
