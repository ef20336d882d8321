// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Format conversion between document types.
//
// Only conversions with a native implementation are performed here. Anything
// else (Office formats, HTML, PDF rasterisation) is reported as
// `UnsupportedDocument` so the caller can decide how to degrade.

use docwerk_core::DocumentType;
use docwerk_core::InputKind;
use docwerk_core::error::{DocwerkError, Result};
use tracing::{debug, info};

use crate::image::ImageProcessor;
use crate::pdf::PdfWriter;

/// JPEG quality used when converting images to JPEG.
const JPEG_QUALITY: u8 = 90;

/// Document converter for the formats Docwerk can produce natively.
pub struct DocumentConverter<'a> {
    writer: &'a PdfWriter,
}

impl<'a> DocumentConverter<'a> {
    /// `writer` lays out any PDF the conversion produces.
    pub fn new(writer: &'a PdfWriter) -> Self {
        Self { writer }
    }

    /// Whether a native path exists from `from` to `to`.
    pub fn can_convert(from: DocumentType, to: DocumentType) -> bool {
        from == to
            || matches!(
                (from.kind(), to),
                (InputKind::Text, DocumentType::Pdf)
                    | (InputKind::Image, DocumentType::Pdf)
                    | (InputKind::Image, DocumentType::Png)
                    | (InputKind::Image, DocumentType::Jpeg)
            )
    }

    /// Convert `document_bytes` from one format to another.
    pub fn convert(
        &self,
        document_bytes: &[u8],
        from: DocumentType,
        to: DocumentType,
    ) -> Result<Vec<u8>> {
        if from == to {
            debug!(format = from.mime_type(), "source already in target format");
            return Ok(document_bytes.to_vec());
        }

        if !Self::can_convert(from, to) {
            return Err(DocwerkError::UnsupportedDocument(format!(
                "no conversion path from {} to {}",
                from.mime_type(),
                to.mime_type(),
            )));
        }

        info!(from = from.mime_type(), to = to.mime_type(), "converting document");

        match (from.kind(), to) {
            (InputKind::Text, _) => {
                let text = String::from_utf8_lossy(document_bytes);
                self.writer.create_from_text(&text)
            }
            (_, DocumentType::Pdf) => self.writer.create_from_images(&[document_bytes]),
            (_, DocumentType::Png) => ImageProcessor::from_bytes(document_bytes)?.to_png_bytes(),
            _ => ImageProcessor::from_bytes(document_bytes)?.to_jpeg_bytes(JPEG_QUALITY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{page_count, sample_png};

    #[test]
    fn native_format_passes_through() {
        let writer = PdfWriter::a4();
        let converter = DocumentConverter::new(&writer);
        let bytes = b"%PDF-1.5 whatever";
        let result = converter
            .convert(bytes, DocumentType::Pdf, DocumentType::Pdf)
            .unwrap();
        assert_eq!(result, bytes);
    }

    #[test]
    fn text_becomes_pdf() {
        let writer = PdfWriter::a4();
        let pdf = DocumentConverter::new(&writer)
            .convert(b"line one\nline two", DocumentType::PlainText, DocumentType::Pdf)
            .unwrap();
        assert_eq!(page_count(&pdf), 1);
    }

    #[test]
    fn png_becomes_jpeg() {
        let writer = PdfWriter::a4();
        let jpeg = DocumentConverter::new(&writer)
            .convert(&sample_png(8, 8), DocumentType::Png, DocumentType::Jpeg)
            .unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn office_is_unsupported() {
        assert!(!DocumentConverter::can_convert(DocumentType::Docx, DocumentType::Pdf));
        assert!(!DocumentConverter::can_convert(DocumentType::Pdf, DocumentType::Jpeg));

        let writer = PdfWriter::a4();
        let err = DocumentConverter::new(&writer)
            .convert(b"PK..", DocumentType::Docx, DocumentType::Pdf)
            .unwrap_err();
        assert!(matches!(err, DocwerkError::UnsupportedDocument(_)));
    }
}
