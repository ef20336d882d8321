// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Docwerk: document formats, user-supplied files and
// operation parameters.

use serde::{Deserialize, Serialize};

/// Document formats understood by the intake validator and the packager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    Pdf,
    Jpeg,
    Png,
    Tiff,
    Bmp,
    Webp,
    PlainText,
    Html,
    Docx,
    Xlsx,
    Pptx,
}

/// Broad family of an input file, used for per-tool acceptance rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    /// Paginated documents (PDF).
    Document,
    /// Raster images.
    Image,
    /// Plain text.
    Text,
    /// HTML pages.
    Markup,
    /// Word processor, spreadsheet and presentation files.
    Office,
}

impl DocumentType {
    /// MIME type string used for artifacts and content negotiation.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Tiff => "image/tiff",
            Self::Bmp => "image/bmp",
            Self::Webp => "image/webp",
            Self::PlainText => "text/plain",
            Self::Html => "text/html",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
        }
    }

    /// Canonical file extension (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Tiff => "tiff",
            Self::Bmp => "bmp",
            Self::Webp => "webp",
            Self::PlainText => "txt",
            Self::Html => "html",
            Self::Docx => "docx",
            Self::Xlsx => "xlsx",
            Self::Pptx => "pptx",
        }
    }

    pub fn kind(&self) -> InputKind {
        match self {
            Self::Pdf => InputKind::Document,
            Self::Jpeg | Self::Png | Self::Tiff | Self::Bmp | Self::Webp => InputKind::Image,
            Self::PlainText => InputKind::Text,
            Self::Html => InputKind::Markup,
            Self::Docx | Self::Xlsx | Self::Pptx => InputKind::Office,
        }
    }

    /// Infer document type from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "tif" | "tiff" => Some(Self::Tiff),
            "bmp" => Some(Self::Bmp),
            "webp" => Some(Self::Webp),
            "txt" | "text" => Some(Self::PlainText),
            "htm" | "html" => Some(Self::Html),
            "docx" | "doc" | "odt" => Some(Self::Docx),
            "xlsx" | "xls" | "ods" => Some(Self::Xlsx),
            "pptx" | "ppt" | "odp" => Some(Self::Pptx),
            _ => None,
        }
    }

    /// Infer document type from a MIME type, ignoring parameters such as
    /// `; charset=utf-8`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        let essence = essence.to_ascii_lowercase();
        match essence.as_str() {
            "application/pdf" => Some(Self::Pdf),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/tiff" => Some(Self::Tiff),
            "image/bmp" => Some(Self::Bmp),
            "image/webp" => Some(Self::Webp),
            "text/plain" => Some(Self::PlainText),
            "text/html" => Some(Self::Html),
            "application/msword" => Some(Self::Docx),
            "application/vnd.ms-excel" => Some(Self::Xlsx),
            "application/vnd.ms-powerpoint" => Some(Self::Pptx),
            other => [Self::Docx, Self::Xlsx, Self::Pptx]
                .into_iter()
                .find(|t| t.mime_type() == other),
        }
    }
}

/// Standard paper sizes for generated documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

/// A user-supplied file: display name, optional MIME type, and raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInput {
    name: String,
    mime_type: Option<String>,
    data: Vec<u8>,
}

impl FileInput {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            data,
        }
    }

    /// Attach the MIME type reported by the picker or browser.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// File name without its final extension.
    pub fn stem(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }

    /// Detect the document type: extension first, then MIME type.
    pub fn detect_type(&self) -> Option<DocumentType> {
        self.name
            .rsplit_once('.')
            .and_then(|(_, ext)| DocumentType::from_extension(ext))
            .or_else(|| self.mime_type().and_then(DocumentType::from_mime))
    }
}

/// Operation-specific options supplied alongside the files.
///
/// Every field is optional; the dispatcher falls back to defaults for
/// anything left unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationParams {
    /// Text stamped by the watermark tool.
    pub watermark_text: Option<String>,
    /// 1-indexed pages dropped by the remove-pages tool.
    pub pages: Option<Vec<u32>>,
    /// 1-indexed page order applied by the reorder-pages tool.
    pub order: Option<Vec<u32>>,
    /// Clockwise rotation in degrees (multiple of 90) for the rotate tool.
    pub rotation_degrees: Option<i32>,
}

impl OperationParams {
    pub fn watermark(text: impl Into<String>) -> Self {
        Self {
            watermark_text: Some(text.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_wins_over_mime() {
        let file = FileInput::new("scan.PNG", vec![]).with_mime_type("application/pdf");
        assert_eq!(file.detect_type(), Some(DocumentType::Png));
    }

    #[test]
    fn mime_used_without_extension() {
        let file = FileInput::new("blob", vec![]).with_mime_type("text/plain; charset=utf-8");
        assert_eq!(file.detect_type(), Some(DocumentType::PlainText));

        let docx = FileInput::new("upload", vec![])
            .with_mime_type(DocumentType::Docx.mime_type());
        assert_eq!(docx.detect_type(), Some(DocumentType::Docx));
    }

    #[test]
    fn unknown_type_is_none() {
        let file = FileInput::new("archive.zip", vec![1, 2, 3]);
        assert_eq!(file.detect_type(), None);
        assert_eq!(file.size(), 3);
    }

    #[test]
    fn stem_strips_last_extension() {
        assert_eq!(FileInput::new("report.final.pdf", vec![]).stem(), "report.final");
        assert_eq!(FileInput::new("README", vec![]).stem(), "README");
        assert_eq!(FileInput::new(".hidden", vec![]).stem(), ".hidden");
    }

    #[test]
    fn kinds() {
        assert_eq!(DocumentType::Pdf.kind(), InputKind::Document);
        assert_eq!(DocumentType::Webp.kind(), InputKind::Image);
        assert_eq!(DocumentType::from_extension("xls").map(|t| t.kind()), Some(InputKind::Office));
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let params: OperationParams =
            serde_json::from_str(r#"{"watermark_text":"DRAFT"}"#).unwrap();
        assert_eq!(params, OperationParams::watermark("DRAFT"));
    }
}
