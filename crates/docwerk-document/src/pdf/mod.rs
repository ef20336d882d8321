// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: editing existing PDFs, stamping pages, and creating new PDFs.

pub mod reader;
pub mod stamp;
pub mod writer;

pub use reader::PdfReader;
pub use writer::PdfWriter;
