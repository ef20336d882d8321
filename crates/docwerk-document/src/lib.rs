// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docwerk-document: transformation library for Docwerk.
//
// Provides PDF operations (merge, burst, remove/reorder pages, rotate, compress,
// watermark, page numbers), PDF generation from text and images, image
// re-encoding, and format conversion.

pub mod convert;
pub mod image;
pub mod pdf;

#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;

// Re-export the primary structs so callers can use `docwerk_document::PdfReader` etc.
pub use convert::DocumentConverter;
pub use self::image::processor::ImageProcessor;
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfWriter;
