// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Docwerk.

use thiserror::Error;

use crate::tools::{Cardinality, ToolId};

/// Top-level error type for all Docwerk operations.
#[derive(Debug, Error)]
pub enum DocwerkError {
    // -- Intake errors (rejected before dispatch) --
    #[error("{tool} expects {expected} but received {actual} file(s)")]
    InvalidInputCount {
        tool: ToolId,
        expected: Cardinality,
        actual: usize,
    },

    #[error("{tool} does not accept {file}")]
    UnsupportedType { tool: ToolId, file: String },

    // -- Dispatch errors --
    #[error("{tool} failed: {source}")]
    ProcessingFailed {
        tool: ToolId,
        #[source]
        source: Box<DocwerkError>,
    },

    // -- Transformation library errors --
    #[error("unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    // -- Session errors --
    #[error("an operation is already in progress")]
    Busy,

    #[error("invalid session state: {0}")]
    InvalidState(String),

    // -- Catalog --
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    // -- Ambient --
    #[error("background worker failed: {0}")]
    Worker(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of a [`DocwerkError`], cheap to copy into UI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInputCount,
    UnsupportedType,
    ProcessingFailed,
    Busy,
    InvalidState,
    Other,
}

impl DocwerkError {
    /// Wrap a library failure as a dispatch failure for `tool`.
    pub fn processing(tool: ToolId, source: DocwerkError) -> Self {
        Self::ProcessingFailed {
            tool,
            source: Box::new(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInputCount { .. } => ErrorKind::InvalidInputCount,
            Self::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            Self::ProcessingFailed { .. } => ErrorKind::ProcessingFailed,
            Self::Busy => ErrorKind::Busy,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            _ => ErrorKind::Other,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocwerkError>;
