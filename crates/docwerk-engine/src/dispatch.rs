// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operation dispatch: routes a validated request to the transformer and
// packages what comes back.
//
// The transformer runs on tokio's blocking pool; the only suspension points
// are the configured processing delay and that blocking call.

use std::sync::Arc;
use std::time::Duration;

use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::{AppConfig, FileInput, Operation, OperationParams, ToolId};
use tracing::{debug, info, instrument};

use crate::intake::{self, OperationRequest, TypedFile};
use crate::package::{Artifact, ArtifactStore, Output, ResultPackager};
use crate::transform::{LibraryTransformer, Transformer};

/// Runs tool operations and hands back packaged artifacts.
///
/// Cloning is cheap; clones share the transformer and the artifact store.
pub struct Dispatcher<T: Transformer = LibraryTransformer> {
    transformer: Arc<T>,
    packager: ResultPackager,
    delay: Duration,
}

impl<T: Transformer> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            transformer: Arc::clone(&self.transformer),
            packager: self.packager.clone(),
            delay: self.delay,
        }
    }
}

impl Dispatcher<LibraryTransformer> {
    /// A dispatcher over the document library, configured from `config`.
    pub fn new(config: AppConfig) -> Self {
        let delay = config.processing_delay();
        Self::with_transformer(LibraryTransformer::new(config), delay)
    }
}

impl<T: Transformer> Dispatcher<T> {
    pub fn with_transformer(transformer: T, delay: Duration) -> Self {
        Self {
            transformer: Arc::new(transformer),
            packager: ResultPackager::default(),
            delay,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        self.packager.store()
    }

    pub fn transformer(&self) -> &T {
        &self.transformer
    }

    /// Validate `files` for `tool` and run it.
    ///
    /// Fails with `InvalidInputCount` or `UnsupportedType` before anything is
    /// transformed, or with `ProcessingFailed` carrying the library's cause.
    pub async fn process(
        &self,
        tool: ToolId,
        files: Vec<FileInput>,
        params: OperationParams,
    ) -> Result<Artifact> {
        let request = intake::validate(tool.descriptor(), files, params)?;
        self.dispatch(request).await
    }

    /// Run an already validated request.
    #[instrument(skip_all, fields(tool = %request.descriptor().id, files = request.files().len()))]
    pub async fn dispatch(&self, request: OperationRequest) -> Result<Artifact> {
        let descriptor = request.descriptor();
        let stem = request.primary().file().stem().to_owned();

        if !self.delay.is_zero() {
            debug!(delay_ms = self.delay.as_millis() as u64, "processing delay");
            tokio::time::sleep(self.delay).await;
        }

        info!(operation = ?descriptor.operation, "dispatching");
        let transformer = Arc::clone(&self.transformer);
        let output = tokio::task::spawn_blocking(move || execute(transformer.as_ref(), &request))
            .await
            .map_err(|err| {
                DocwerkError::processing(descriptor.id, DocwerkError::Worker(err.to_string()))
            })?
            .map_err(|err| DocwerkError::processing(descriptor.id, err))?;

        Ok(self.packager.package(descriptor, &stem, output))
    }
}

/// Invoke the transformer method for the request's operation.
fn execute<T: Transformer + ?Sized>(
    transformer: &T,
    request: &OperationRequest,
) -> Result<Output> {
    let descriptor = request.descriptor();
    let params = request.params();
    let primary = request.primary().data();
    let all = || request.files().iter().map(TypedFile::data).collect::<Vec<_>>();

    let bytes = match descriptor.operation {
        Operation::Merge => transformer.merge(&all())?,
        Operation::Split => {
            let parts = transformer.split(primary)?;
            let parts_total = parts.len();
            let first = parts
                .into_iter()
                .next()
                .ok_or_else(|| DocwerkError::PdfError("split produced no parts".into()))?;
            debug!(parts_total, "keeping the first part");
            return Ok(Output {
                bytes: first,
                parts_total,
            });
        }
        Operation::ImagesToDocument => transformer.images_to_document(&all())?,
        Operation::TextToDocument => transformer.text_to_document(primary)?,
        Operation::Watermark => transformer.watermark(primary, params.watermark_text.as_deref())?,
        Operation::RemovePages => transformer.remove_pages(primary, params.pages.as_deref())?,
        Operation::ReorderPages => transformer.reorder_pages(primary, params.order.as_deref())?,
        Operation::Compress => transformer.compress(primary)?,
        Operation::Rotate => transformer.rotate(primary, params.rotation_degrees)?,
        Operation::NumberPages => transformer.number_pages(primary)?,
        Operation::Convert => transformer.convert(
            descriptor.id,
            primary,
            request.primary().document_type(),
            descriptor.output,
        )?,
    };

    Ok(Output::single(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docwerk_core::{DocumentType, InputKind};
    use std::sync::Mutex;

    /// Records which method was called and returns canned bytes.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<&'static str>>,
    }

    impl Recorder {
        fn record(&self, name: &'static str) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push(name);
            Ok(name.as_bytes().to_vec())
        }
    }

    impl Transformer for Recorder {
        fn merge(&self, documents: &[&[u8]]) -> Result<Vec<u8>> {
            Ok(documents.concat())
        }
        fn split(&self, _: &[u8]) -> Result<Vec<Vec<u8>>> {
            self.record("split")?;
            Ok(vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()])
        }
        fn images_to_document(&self, _: &[&[u8]]) -> Result<Vec<u8>> {
            self.record("images_to_document")
        }
        fn text_to_document(&self, _: &[u8]) -> Result<Vec<u8>> {
            self.record("text_to_document")
        }
        fn watermark(&self, _: &[u8], text: Option<&str>) -> Result<Vec<u8>> {
            Ok(text.unwrap_or("<default>").as_bytes().to_vec())
        }
        fn remove_pages(&self, _: &[u8], _: Option<&[u32]>) -> Result<Vec<u8>> {
            self.record("remove_pages")
        }
        fn reorder_pages(&self, _: &[u8], _: Option<&[u32]>) -> Result<Vec<u8>> {
            self.record("reorder_pages")
        }
        fn compress(&self, _: &[u8]) -> Result<Vec<u8>> {
            Err(DocwerkError::PdfError("corrupt xref".into()))
        }
        fn rotate(&self, _: &[u8], degrees: Option<i32>) -> Result<Vec<u8>> {
            Ok(format!("{degrees:?}").into_bytes())
        }
        fn number_pages(&self, _: &[u8]) -> Result<Vec<u8>> {
            self.record("number_pages")
        }
        fn convert(
            &self,
            tool: ToolId,
            _: &[u8],
            from: DocumentType,
            to: DocumentType,
        ) -> Result<Vec<u8>> {
            Ok(format!("{tool}:{}->{}", from.extension(), to.extension()).into_bytes())
        }
    }

    fn dispatcher() -> Dispatcher<Recorder> {
        Dispatcher::with_transformer(Recorder::default(), Duration::ZERO)
    }

    fn file(name: &str, data: &[u8]) -> FileInput {
        FileInput::new(name, data.to_vec())
    }

    #[tokio::test]
    async fn merge_passes_files_in_order() {
        let artifact = dispatcher()
            .process(
                ToolId::Merge,
                vec![file("a.pdf", b"A"), file("b.pdf", b"B"), file("c.pdf", b"C")],
                OperationParams::default(),
            )
            .await
            .unwrap();
        assert_eq!(&artifact.bytes[..], b"ABC");
        assert_eq!(artifact.filename, "merged.pdf");
    }

    #[tokio::test]
    async fn split_keeps_first_part_and_counts_all() {
        let artifact = dispatcher()
            .process(ToolId::Split, vec![file("deck.pdf", b"")], OperationParams::default())
            .await
            .unwrap();
        assert_eq!(&artifact.bytes[..], b"one");
        assert_eq!(artifact.parts_total, 3);
        assert_eq!(artifact.filename, "deck-part-1.pdf");
    }

    #[tokio::test]
    async fn params_reach_the_transformer() {
        let d = dispatcher();
        let stamped = d
            .process(
                ToolId::Watermark,
                vec![file("a.pdf", b"")],
                OperationParams::watermark("DRAFT"),
            )
            .await
            .unwrap();
        assert_eq!(&stamped.bytes[..], b"DRAFT");

        let rotated = d
            .process(ToolId::Rotate, vec![file("a.pdf", b"")], OperationParams::default())
            .await
            .unwrap();
        assert_eq!(&rotated.bytes[..], b"None");
    }

    #[tokio::test]
    async fn conversion_tools_use_the_generic_fallback() {
        let artifact = dispatcher()
            .process(ToolId::WordToPdf, vec![file("cv.docx", b"")], OperationParams::default())
            .await
            .unwrap();
        assert_eq!(&artifact.bytes[..], b"word-to-pdf:docx->pdf");
        assert_eq!(artifact.mime_type, "application/pdf");
        assert_eq!(artifact.filename, "cv-converted.pdf");
    }

    #[tokio::test]
    async fn library_failure_is_wrapped_with_cause() {
        let d = dispatcher();
        let err = d
            .process(ToolId::Compress, vec![file("a.pdf", b"")], OperationParams::default())
            .await
            .unwrap_err();
        match err {
            DocwerkError::ProcessingFailed { tool, source } => {
                assert_eq!(tool, ToolId::Compress);
                assert!(matches!(*source, DocwerkError::PdfError(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(d.store().is_empty());
    }

    #[tokio::test]
    async fn every_catalog_tool_dispatches() {
        let d = dispatcher();
        for tool in ToolId::all().filter(|t| *t != ToolId::Compress) {
            let descriptor = tool.descriptor();
            let kind = descriptor.accepts[0];
            let name = match kind {
                InputKind::Document => "in.pdf",
                InputKind::Image => "in.png",
                InputKind::Text => "in.txt",
                InputKind::Markup => "in.html",
                InputKind::Office => "in.docx",
            };
            let artifact = d
                .process(tool, vec![file(name, b"x")], OperationParams::default())
                .await
                .unwrap();
            assert_eq!(artifact.mime_type, descriptor.output.mime_type(), "{tool}");
        }

        let calls = d.transformer().calls.lock().unwrap();
        for expected in ["split", "remove_pages", "reorder_pages", "number_pages"] {
            assert!(calls.contains(&expected), "{expected} never called");
        }
    }
}
