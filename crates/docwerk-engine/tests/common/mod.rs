// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fixtures shared by the integration tests. The PDF and image builders come
// from docwerk-document's `test-support` feature.

#![allow(dead_code)]

use docwerk_core::{AppConfig, FileInput};

pub use docwerk_document::test_support::{
    page_contents, page_count, page_labels, page_rotations, sample_pdf, sample_png, shown_strings,
};

/// Configuration with the processing delay switched off.
pub fn quiet_config() -> AppConfig {
    AppConfig {
        processing_delay_ms: 0,
        ..AppConfig::default()
    }
}

/// Configuration with a delay long enough to observe `Processing`.
pub fn slow_config() -> AppConfig {
    AppConfig {
        processing_delay_ms: 300,
        ..AppConfig::default()
    }
}

pub fn pdf_file(name: &str, label: &str, pages: u32) -> FileInput {
    FileInput::new(name, sample_pdf(label, pages))
}
