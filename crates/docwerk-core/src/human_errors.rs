// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the presentation shell.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the shell presents the error state.

use crate::error::DocwerkError;
use crate::tools::Cardinality;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something went wrong while working; trying again may help.
    Transient,
    /// The user must change their selection (different files, fewer pages).
    ActionRequired,
    /// Cannot be fixed by retrying with this input.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether offering a "try again" button makes sense.
    pub retriable: bool,
    pub severity: Severity,
}

impl HumanError {
    fn new(
        message: impl Into<String>,
        suggestion: impl Into<String>,
        retriable: bool,
        severity: Severity,
    ) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            retriable,
            severity,
        }
    }
}

/// Convert a `DocwerkError` into a `HumanError`.
pub fn humanize_error(err: &DocwerkError) -> HumanError {
    match err {
        DocwerkError::InvalidInputCount {
            expected, actual, ..
        } => match (expected, actual) {
            (_, 0) => HumanError::new(
                "No files selected.",
                "Choose a file to continue.",
                false,
                Severity::ActionRequired,
            ),
            (Cardinality::Single, _) => HumanError::new(
                "This tool works on one file at a time.",
                "Choose a single file, then try again.",
                false,
                Severity::ActionRequired,
            ),
            (Cardinality::Multiple, _) => HumanError::new(
                "Please add your files.",
                "Choose one or more files, then try again.",
                false,
                Severity::ActionRequired,
            ),
        },

        DocwerkError::UnsupportedType { tool, file } => HumanError::new(
            format!("{file} can't be used with this tool."),
            format!(
                "Pick a file type listed for \"{}\".",
                tool.descriptor().title
            ),
            false,
            Severity::ActionRequired,
        ),

        DocwerkError::ProcessingFailed { source, .. } => {
            let inner = humanize_error(source);
            HumanError {
                retriable: true,
                ..inner
            }
        }

        DocwerkError::PdfError(_) => HumanError::new(
            "We couldn't read this PDF.",
            "The file may be damaged or password protected. Try another copy of it.",
            true,
            Severity::Transient,
        ),

        DocwerkError::ImageError(_) => HumanError::new(
            "We couldn't read this picture.",
            "Try saving it as a JPG or PNG, then add it again.",
            true,
            Severity::Transient,
        ),

        DocwerkError::UnsupportedDocument(detail) => HumanError::new(
            "This conversion isn't available.",
            format!("Try a different file type. ({detail})"),
            false,
            Severity::Permanent,
        ),

        DocwerkError::InvalidParameter(detail) => HumanError::new(
            "Some of the options don't fit this file.",
            format!("Check the page numbers and try again. ({detail})"),
            true,
            Severity::ActionRequired,
        ),

        DocwerkError::Busy => HumanError::new(
            "Still working on your last request.",
            "Please wait for it to finish.",
            false,
            Severity::Transient,
        ),

        DocwerkError::InvalidState(_) => HumanError::new(
            "Your file is already done.",
            "Download it, or start a new task.",
            false,
            Severity::ActionRequired,
        ),

        DocwerkError::UnknownTool(name) => HumanError::new(
            "That tool isn't available.",
            format!("Pick a tool from the list. ({name})"),
            false,
            Severity::Permanent,
        ),

        DocwerkError::Worker(_) | DocwerkError::Io(_) | DocwerkError::Serialization(_) => {
            HumanError::new(
                "Something went wrong on our side.",
                "Please try again.",
                true,
                Severity::Transient,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolId;

    #[test]
    fn empty_selection_is_action_required() {
        let err = DocwerkError::InvalidInputCount {
            tool: ToolId::Compress,
            expected: Cardinality::Single,
            actual: 0,
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert_eq!(human.message, "No files selected.");
        assert!(!human.retriable);
    }

    #[test]
    fn processing_failure_is_always_retriable() {
        let err = DocwerkError::processing(
            ToolId::Watermark,
            DocwerkError::UnsupportedDocument("no converter".into()),
        );
        let human = humanize_error(&err);
        assert!(human.retriable);
        assert_eq!(human.severity, Severity::Permanent);
    }

    #[test]
    fn unsupported_type_names_the_tool() {
        let err = DocwerkError::UnsupportedType {
            tool: ToolId::JpgToPdf,
            file: "notes.txt".into(),
        };
        let human = humanize_error(&err);
        assert!(human.message.contains("notes.txt"));
        assert!(human.suggestion.contains("JPG to PDF"));
    }

    #[test]
    fn corrupt_pdf_is_transient() {
        let human = humanize_error(&DocwerkError::PdfError("trailer missing".into()));
        assert_eq!(human.severity, Severity::Transient);
    }
}
