// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tool catalog: the static table of every operation Docwerk offers, with its
// cardinality, accepted inputs, output format and dispatch target.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DocwerkError;
use crate::types::{DocumentType, InputKind};

/// Identifier of a user-facing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolId {
    Merge,
    Split,
    Compress,
    Watermark,
    RemovePages,
    ReorderPages,
    Rotate,
    PageNumbers,
    JpgToPdf,
    TextToPdf,
    PdfToJpg,
    PdfToWord,
    PdfToPowerpoint,
    PdfToExcel,
    WordToPdf,
    PowerpointToPdf,
    ExcelToPdf,
    HtmlToPdf,
}

/// Whether a tool takes exactly one file or an ordered batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    Single,
    Multiple,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => f.write_str("exactly one file"),
            Self::Multiple => f.write_str("one or more files"),
        }
    }
}

/// Transformation category a tool dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Merge,
    Split,
    ImagesToDocument,
    TextToDocument,
    Watermark,
    RemovePages,
    ReorderPages,
    Compress,
    Rotate,
    NumberPages,
    /// Generic conversion, parameterised by the tool id.
    Convert,
}

/// Immutable description of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub id: ToolId,
    pub title: &'static str,
    pub cardinality: Cardinality,
    pub accepts: &'static [InputKind],
    pub output: DocumentType,
    pub operation: Operation,
    /// Appended to the input stem (single-file) or used alone (multi-file)
    /// when naming the artifact.
    pub output_suffix: &'static str,
}

impl ToolDescriptor {
    pub fn accepts(&self, kind: InputKind) -> bool {
        self.accepts.contains(&kind)
    }

    pub fn is_multi_file(&self) -> bool {
        self.cardinality == Cardinality::Multiple
    }
}

const DOCUMENT: &[InputKind] = &[InputKind::Document];
const IMAGE: &[InputKind] = &[InputKind::Image];
const TEXT: &[InputKind] = &[InputKind::Text];
const MARKUP: &[InputKind] = &[InputKind::Markup];
const OFFICE: &[InputKind] = &[InputKind::Office];

const fn tool(
    id: ToolId,
    title: &'static str,
    cardinality: Cardinality,
    accepts: &'static [InputKind],
    output: DocumentType,
    operation: Operation,
    output_suffix: &'static str,
) -> ToolDescriptor {
    ToolDescriptor {
        id,
        title,
        cardinality,
        accepts,
        output,
        operation,
        output_suffix,
    }
}

use Cardinality::{Multiple, Single};
use DocumentType as Out;

/// Every tool, in catalog display order.
pub static CATALOG: [ToolDescriptor; 18] = [
    tool(
        ToolId::Merge,
        "Merge PDF",
        Multiple,
        DOCUMENT,
        Out::Pdf,
        Operation::Merge,
        "merged",
    ),
    tool(
        ToolId::Split,
        "Split PDF",
        Single,
        DOCUMENT,
        Out::Pdf,
        Operation::Split,
        "part-1",
    ),
    tool(
        ToolId::Compress,
        "Compress PDF",
        Single,
        DOCUMENT,
        Out::Pdf,
        Operation::Compress,
        "compressed",
    ),
    tool(
        ToolId::Watermark,
        "Add watermark",
        Single,
        DOCUMENT,
        Out::Pdf,
        Operation::Watermark,
        "watermarked",
    ),
    tool(
        ToolId::RemovePages,
        "Remove pages",
        Single,
        DOCUMENT,
        Out::Pdf,
        Operation::RemovePages,
        "trimmed",
    ),
    tool(
        ToolId::ReorderPages,
        "Organize PDF",
        Single,
        DOCUMENT,
        Out::Pdf,
        Operation::ReorderPages,
        "reordered",
    ),
    tool(
        ToolId::Rotate,
        "Rotate PDF",
        Single,
        DOCUMENT,
        Out::Pdf,
        Operation::Rotate,
        "rotated",
    ),
    tool(
        ToolId::PageNumbers,
        "Add page numbers",
        Single,
        DOCUMENT,
        Out::Pdf,
        Operation::NumberPages,
        "numbered",
    ),
    tool(
        ToolId::JpgToPdf,
        "JPG to PDF",
        Multiple,
        IMAGE,
        Out::Pdf,
        Operation::ImagesToDocument,
        "images",
    ),
    tool(
        ToolId::TextToPdf,
        "Text to PDF",
        Single,
        TEXT,
        Out::Pdf,
        Operation::TextToDocument,
        "converted",
    ),
    tool(
        ToolId::PdfToJpg,
        "PDF to JPG",
        Single,
        DOCUMENT,
        Out::Jpeg,
        Operation::Convert,
        "converted",
    ),
    tool(
        ToolId::PdfToWord,
        "PDF to Word",
        Single,
        DOCUMENT,
        Out::Docx,
        Operation::Convert,
        "converted",
    ),
    tool(
        ToolId::PdfToPowerpoint,
        "PDF to PowerPoint",
        Single,
        DOCUMENT,
        Out::Pptx,
        Operation::Convert,
        "converted",
    ),
    tool(
        ToolId::PdfToExcel,
        "PDF to Excel",
        Single,
        DOCUMENT,
        Out::Xlsx,
        Operation::Convert,
        "converted",
    ),
    tool(
        ToolId::WordToPdf,
        "Word to PDF",
        Single,
        OFFICE,
        Out::Pdf,
        Operation::Convert,
        "converted",
    ),
    tool(
        ToolId::PowerpointToPdf,
        "PowerPoint to PDF",
        Single,
        OFFICE,
        Out::Pdf,
        Operation::Convert,
        "converted",
    ),
    tool(
        ToolId::ExcelToPdf,
        "Excel to PDF",
        Single,
        OFFICE,
        Out::Pdf,
        Operation::Convert,
        "converted",
    ),
    tool(
        ToolId::HtmlToPdf,
        "HTML to PDF",
        Single,
        MARKUP,
        Out::Pdf,
        Operation::Convert,
        "converted",
    ),
];

impl ToolId {
    /// Kebab-case identifier, as used by the shell and in serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Split => "split",
            Self::Compress => "compress",
            Self::Watermark => "watermark",
            Self::RemovePages => "remove-pages",
            Self::ReorderPages => "reorder-pages",
            Self::Rotate => "rotate",
            Self::PageNumbers => "page-numbers",
            Self::JpgToPdf => "jpg-to-pdf",
            Self::TextToPdf => "text-to-pdf",
            Self::PdfToJpg => "pdf-to-jpg",
            Self::PdfToWord => "pdf-to-word",
            Self::PdfToPowerpoint => "pdf-to-powerpoint",
            Self::PdfToExcel => "pdf-to-excel",
            Self::WordToPdf => "word-to-pdf",
            Self::PowerpointToPdf => "powerpoint-to-pdf",
            Self::ExcelToPdf => "excel-to-pdf",
            Self::HtmlToPdf => "html-to-pdf",
        }
    }

    /// Look up this tool's descriptor in the catalog.
    pub fn descriptor(&self) -> &'static ToolDescriptor {
        // The catalog is ordered like the enum, so the discriminant indexes it.
        &CATALOG[*self as usize]
    }

    pub fn all() -> impl Iterator<Item = ToolId> {
        CATALOG.iter().map(|descriptor| descriptor.id)
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolId {
    type Err = DocwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| DocwerkError::UnknownTool(s.to_owned()))
    }
}
