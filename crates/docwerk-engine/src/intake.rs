// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Intake validation: the only way to build an `OperationRequest`.
//
// Cardinality is checked before type, so a tool given no files always fails
// with `InvalidInputCount` whatever it accepts.

use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::{Cardinality, DocumentType, FileInput, OperationParams, ToolDescriptor};
use tracing::{debug, instrument};

/// A file accepted by intake, tagged with its detected type.
#[derive(Debug, Clone)]
pub struct TypedFile {
    file: FileInput,
    document_type: DocumentType,
}

impl TypedFile {
    pub fn file(&self) -> &FileInput {
        &self.file
    }

    pub fn data(&self) -> &[u8] {
        self.file.data()
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }
}

/// A validated batch for one tool. Immutable once built.
///
/// Always holds at least one file; single-file tools hold exactly one.
#[derive(Debug, Clone)]
pub struct OperationRequest {
    descriptor: &'static ToolDescriptor,
    files: Vec<TypedFile>,
    params: OperationParams,
}

impl OperationRequest {
    pub fn descriptor(&self) -> &'static ToolDescriptor {
        self.descriptor
    }

    pub fn files(&self) -> &[TypedFile] {
        &self.files
    }

    /// The first file of the batch; its stem names the artifact.
    pub fn primary(&self) -> &TypedFile {
        &self.files[0]
    }

    pub fn params(&self) -> &OperationParams {
        &self.params
    }
}

/// Accept `files` for `descriptor`, or explain why they cannot be used.
///
/// Multi-file tools keep every file in submission order. Single-file tools
/// keep the first file and drop the rest.
#[instrument(skip_all, fields(tool = %descriptor.id, submitted = files.len()))]
pub fn validate(
    descriptor: &'static ToolDescriptor,
    mut files: Vec<FileInput>,
    params: OperationParams,
) -> Result<OperationRequest> {
    if files.is_empty() {
        return Err(DocwerkError::InvalidInputCount {
            tool: descriptor.id,
            expected: descriptor.cardinality,
            actual: 0,
        });
    }

    if descriptor.cardinality == Cardinality::Single && files.len() > 1 {
        debug!(dropped = files.len() - 1, "single-file tool, keeping the first file");
        files.truncate(1);
    }

    let files = files
        .into_iter()
        .map(|file| match file.detect_type() {
            Some(document_type) if descriptor.accepts(document_type.kind()) => Ok(TypedFile {
                file,
                document_type,
            }),
            _ => Err(DocwerkError::UnsupportedType {
                tool: descriptor.id,
                file: file.name().to_owned(),
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(accepted = files.len(), "intake passed");
    Ok(OperationRequest {
        descriptor,
        files,
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docwerk_core::ToolId;

    fn pdf(name: &str) -> FileInput {
        FileInput::new(name, b"%PDF-1.5".to_vec())
    }

    #[test]
    fn empty_batch_is_a_count_error() {
        let err = validate(ToolId::Compress.descriptor(), vec![], OperationParams::default())
            .unwrap_err();
        assert!(matches!(
            err,
            DocwerkError::InvalidInputCount {
                tool: ToolId::Compress,
                actual: 0,
                ..
            }
        ));
    }

    #[test]
    fn single_file_tool_keeps_first() {
        let request = validate(
            ToolId::Watermark.descriptor(),
            vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")],
            OperationParams::default(),
        )
        .unwrap();
        assert_eq!(request.files().len(), 1);
        assert_eq!(request.primary().file().name(), "a.pdf");
    }

    #[test]
    fn multi_file_tool_keeps_order() {
        let request = validate(
            ToolId::Merge.descriptor(),
            vec![pdf("b.pdf"), pdf("a.pdf")],
            OperationParams::default(),
        )
        .unwrap();
        let names: Vec<_> = request.files().iter().map(|f| f.file().name()).collect();
        assert_eq!(names, ["b.pdf", "a.pdf"]);
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let err = validate(
            ToolId::Merge.descriptor(),
            vec![pdf("a.pdf"), FileInput::new("photo.png", vec![])],
            OperationParams::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DocwerkError::UnsupportedType { ref file, .. } if file == "photo.png"
        ));
    }

    #[test]
    fn unknown_extension_falls_back_to_mime() {
        let request = validate(
            ToolId::JpgToPdf.descriptor(),
            vec![FileInput::new("camera-upload", vec![]).with_mime_type("image/jpeg")],
            OperationParams::default(),
        )
        .unwrap();
        assert_eq!(request.primary().document_type(), DocumentType::Jpeg);
    }

    #[test]
    fn undetectable_type_is_rejected() {
        let err = validate(
            ToolId::Compress.descriptor(),
            vec![FileInput::new("mystery", vec![])],
            OperationParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DocwerkError::UnsupportedType { .. }));
    }

    #[test]
    fn dropped_extras_are_not_type_checked() {
        let request = validate(
            ToolId::Compress.descriptor(),
            vec![pdf("a.pdf"), FileInput::new("notes.txt", vec![])],
            OperationParams::default(),
        );
        assert!(request.is_ok());
    }
}
