// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The transformation surface consumed by the dispatcher.
//
// `Transformer` has one method per operation category. `LibraryTransformer`
// backs it with docwerk-document and fills in the defaults for parameters the
// caller left unset.

use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::{AppConfig, DocumentType, ToolId};
use docwerk_document::{DocumentConverter, PdfReader, PdfWriter};
use tracing::{debug, warn};

/// Rotation applied when a rotate request carries no angle.
pub const DEFAULT_ROTATION_DEGREES: i32 = 90;

/// Document transformations the dispatcher can invoke.
///
/// Implementations run on a blocking worker thread and must not assume an
/// async context.
pub trait Transformer: Send + Sync + 'static {
    /// Concatenate documents in the order given.
    fn merge(&self, documents: &[&[u8]]) -> Result<Vec<u8>>;

    /// Burst a document into single-page parts, in page order.
    fn split(&self, document: &[u8]) -> Result<Vec<Vec<u8>>>;

    /// One page per image, in the order given.
    fn images_to_document(&self, images: &[&[u8]]) -> Result<Vec<u8>>;

    fn text_to_document(&self, text: &[u8]) -> Result<Vec<u8>>;

    /// Stamp `text` (or the configured default) onto every page.
    fn watermark(&self, document: &[u8], text: Option<&str>) -> Result<Vec<u8>>;

    /// Drop the listed 1-indexed pages; `None` drops the last page.
    fn remove_pages(&self, document: &[u8], pages: Option<&[u32]>) -> Result<Vec<u8>>;

    /// Apply a 1-indexed page order; `None` reverses the document.
    fn reorder_pages(&self, document: &[u8], order: Option<&[u32]>) -> Result<Vec<u8>>;

    fn compress(&self, document: &[u8]) -> Result<Vec<u8>>;

    fn rotate(&self, document: &[u8], degrees: Option<i32>) -> Result<Vec<u8>>;

    fn number_pages(&self, document: &[u8]) -> Result<Vec<u8>>;

    /// Generic conversion for tools without a dedicated operation.
    fn convert(
        &self,
        tool: ToolId,
        document: &[u8],
        from: DocumentType,
        to: DocumentType,
    ) -> Result<Vec<u8>>;
}

/// [`Transformer`] backed by the docwerk-document library.
pub struct LibraryTransformer {
    config: AppConfig,
    writer: PdfWriter,
}

impl LibraryTransformer {
    pub fn new(config: AppConfig) -> Self {
        let writer = PdfWriter::new(config.paper_size).with_image_dpi(config.image_dpi);
        Self { config, writer }
    }
}

impl Default for LibraryTransformer {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl Transformer for LibraryTransformer {
    fn merge(&self, documents: &[&[u8]]) -> Result<Vec<u8>> {
        let (first, rest) = documents
            .split_first()
            .ok_or_else(|| DocwerkError::InvalidParameter("nothing to merge".into()))?;
        PdfReader::from_bytes(first)?.merge(rest)
    }

    fn split(&self, document: &[u8]) -> Result<Vec<Vec<u8>>> {
        PdfReader::from_bytes(document)?.burst()
    }

    fn images_to_document(&self, images: &[&[u8]]) -> Result<Vec<u8>> {
        self.writer.create_from_images(images)
    }

    fn text_to_document(&self, text: &[u8]) -> Result<Vec<u8>> {
        self.writer.create_from_text(&String::from_utf8_lossy(text))
    }

    fn watermark(&self, document: &[u8], text: Option<&str>) -> Result<Vec<u8>> {
        let style = &self.config.watermark;
        let text = text.unwrap_or(style.default_text.as_str());
        PdfReader::from_bytes(document)?.watermark(text, style)
    }

    fn remove_pages(&self, document: &[u8], pages: Option<&[u32]>) -> Result<Vec<u8>> {
        let reader = PdfReader::from_bytes(document)?;
        match pages {
            Some(pages) => reader.remove_pages(pages),
            None => {
                let last = reader.page_count() as u32;
                debug!(page = last, "no pages listed, removing the last page");
                reader.remove_pages(&[last])
            }
        }
    }

    fn reorder_pages(&self, document: &[u8], order: Option<&[u32]>) -> Result<Vec<u8>> {
        let reader = PdfReader::from_bytes(document)?;
        match order {
            Some(order) => reader.reorder_pages(order),
            None => {
                let reversed: Vec<u32> = (1..=reader.page_count() as u32).rev().collect();
                reader.reorder_pages(&reversed)
            }
        }
    }

    fn compress(&self, document: &[u8]) -> Result<Vec<u8>> {
        PdfReader::from_bytes(document)?.compress()
    }

    fn rotate(&self, document: &[u8], degrees: Option<i32>) -> Result<Vec<u8>> {
        let degrees = degrees.unwrap_or(DEFAULT_ROTATION_DEGREES);
        PdfReader::from_bytes(document)?.rotate_all(degrees)
    }

    fn number_pages(&self, document: &[u8]) -> Result<Vec<u8>> {
        PdfReader::from_bytes(document)?.number_pages()
    }

    fn convert(
        &self,
        tool: ToolId,
        document: &[u8],
        from: DocumentType,
        to: DocumentType,
    ) -> Result<Vec<u8>> {
        match DocumentConverter::new(&self.writer).convert(document, from, to) {
            Err(DocwerkError::UnsupportedDocument(reason)) => {
                warn!(%tool, %reason, "no native conversion, passing input through");
                Ok(document.to_vec())
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(pdf: &[u8]) -> usize {
        PdfReader::from_bytes(pdf).unwrap().page_count()
    }

    /// A generated text document long enough to span three pages.
    fn three_pages(transformer: &LibraryTransformer) -> Vec<u8> {
        let text = (1..=120)
            .map(|n| format!("line {n}"))
            .collect::<Vec<_>>()
            .join("\n");
        let pdf = transformer.text_to_document(text.as_bytes()).unwrap();
        assert_eq!(pages(&pdf), 3);
        pdf
    }

    #[test]
    fn remove_defaults_to_last_page() {
        let transformer = LibraryTransformer::default();
        let pdf = three_pages(&transformer);
        assert_eq!(pages(&transformer.remove_pages(&pdf, None).unwrap()), 2);
    }

    #[test]
    fn reorder_defaults_to_reverse() {
        let transformer = LibraryTransformer::default();
        let pdf = three_pages(&transformer);
        let reversed = transformer.reorder_pages(&pdf, None).unwrap();
        assert_eq!(pages(&reversed), 3);
        assert_ne!(reversed, pdf);
    }

    #[test]
    fn split_yields_every_page() {
        let transformer = LibraryTransformer::default();
        let parts = transformer.split(&three_pages(&transformer)).unwrap();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|part| pages(part) == 1));
    }

    #[test]
    fn merge_without_documents_is_rejected() {
        let err = LibraryTransformer::default().merge(&[]).unwrap_err();
        assert!(matches!(err, DocwerkError::InvalidParameter(_)));
    }

    #[test]
    fn watermark_falls_back_to_configured_text() {
        let transformer = LibraryTransformer::default();
        let pdf = transformer.text_to_document(b"body").unwrap();
        assert!(transformer.watermark(&pdf, None).is_ok());
    }

    #[test]
    fn unsupported_conversion_passes_through() {
        let transformer = LibraryTransformer::default();
        let input = b"PK\x03\x04 not really a docx";
        let output = transformer
            .convert(ToolId::WordToPdf, input, DocumentType::Docx, DocumentType::Pdf)
            .unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn native_conversion_still_fails_loudly() {
        let err = LibraryTransformer::default()
            .convert(ToolId::JpgToPdf, b"garbage", DocumentType::Png, DocumentType::Pdf)
            .unwrap_err();
        assert!(matches!(err, DocwerkError::ImageError(_)));
    }
}
