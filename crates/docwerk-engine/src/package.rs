// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Result packaging: turns transformation output into a downloadable artifact
// and keeps it alive until the holder releases it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use docwerk_core::{ToolDescriptor, ToolId};
use tracing::{debug, info};
use uuid::Uuid;

use crate::integrity::hash_bytes;

/// Handle to a packaged artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactId(Uuid);

impl ArtifactId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A finished output ready for download.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub id: ArtifactId,
    pub tool: ToolId,
    /// Suggested download name.
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Arc<[u8]>,
    /// SHA-256 of `bytes`, lowercase hex.
    pub checksum: String,
    pub created_at: DateTime<Utc>,
    /// Parts the operation produced; only split yields more than one.
    pub parts_total: usize,
}

impl Artifact {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// What a transformation hands to the packager.
#[derive(Debug)]
pub struct Output {
    pub bytes: Vec<u8>,
    pub parts_total: usize,
}

impl Output {
    pub fn single(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            parts_total: 1,
        }
    }
}

/// Live artifacts, shared by every clone.
///
/// Nothing expires on its own: an artifact stays until [`release`] is called.
///
/// [`release`]: ArtifactStore::release
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    artifacts: Arc<Mutex<HashMap<ArtifactId, Artifact>>>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ArtifactId, Artifact>> {
        self.artifacts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, artifact: Artifact) {
        self.lock().insert(artifact.id, artifact);
    }

    pub fn get(&self, id: ArtifactId) -> Option<Artifact> {
        self.lock().get(&id).cloned()
    }

    /// Drop the artifact. Returns `false` if it was already released.
    pub fn release(&self, id: ArtifactId) -> bool {
        let released = self.lock().remove(&id).is_some();
        if released {
            debug!(%id, "artifact released");
        }
        released
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Wraps output bytes into artifacts and registers them with a store.
#[derive(Debug, Clone, Default)]
pub struct ResultPackager {
    store: ArtifactStore,
}

impl ResultPackager {
    pub fn new(store: ArtifactStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Package `output` produced by `descriptor` from a batch whose first
    /// file is named `stem`.
    pub fn package(&self, descriptor: &ToolDescriptor, stem: &str, output: Output) -> Artifact {
        let artifact = Artifact {
            id: ArtifactId::new(),
            tool: descriptor.id,
            filename: artifact_filename(descriptor, stem),
            mime_type: descriptor.output.mime_type(),
            checksum: hash_bytes(&output.bytes),
            bytes: output.bytes.into(),
            created_at: Utc::now(),
            parts_total: output.parts_total,
        };

        info!(
            id = %artifact.id,
            tool = %artifact.tool,
            filename = %artifact.filename,
            size = artifact.size(),
            "artifact packaged"
        );
        self.store.insert(artifact.clone());
        artifact
    }
}

/// `<stem>-<suffix>.<ext>` for single-file tools, `<suffix>.<ext>` for
/// multi-file tools.
pub fn artifact_filename(descriptor: &ToolDescriptor, stem: &str) -> String {
    let ext = descriptor.output.extension();
    if descriptor.is_multi_file() {
        format!("{}.{}", descriptor.output_suffix, ext)
    } else {
        format!("{}-{}.{}", stem, descriptor.output_suffix, ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrity;

    #[test]
    fn single_file_names_keep_the_stem() {
        assert_eq!(
            artifact_filename(ToolId::Compress.descriptor(), "report"),
            "report-compressed.pdf"
        );
        assert_eq!(
            artifact_filename(ToolId::Split.descriptor(), "report"),
            "report-part-1.pdf"
        );
        assert_eq!(
            artifact_filename(ToolId::PdfToWord.descriptor(), "cv"),
            "cv-converted.docx"
        );
    }

    #[test]
    fn multi_file_names_ignore_the_stem() {
        assert_eq!(artifact_filename(ToolId::Merge.descriptor(), "a"), "merged.pdf");
        assert_eq!(artifact_filename(ToolId::JpgToPdf.descriptor(), "a"), "images.pdf");
    }

    #[test]
    fn package_registers_and_fingerprints() {
        let packager = ResultPackager::default();
        let artifact = packager.package(
            ToolId::Watermark.descriptor(),
            "memo",
            Output::single(b"%PDF-stamped".to_vec()),
        );

        assert_eq!(artifact.mime_type, "application/pdf");
        assert_eq!(artifact.filename, "memo-watermarked.pdf");
        assert!(integrity::matches(&artifact.bytes, &artifact.checksum));
        assert_eq!(packager.store().get(artifact.id).unwrap().checksum, artifact.checksum);
    }

    #[test]
    fn release_is_explicit_and_once() {
        let store = ArtifactStore::new();
        let packager = ResultPackager::new(store.clone());
        let first = packager.package(ToolId::Merge.descriptor(), "x", Output::single(vec![1]));
        let second = packager.package(ToolId::Merge.descriptor(), "x", Output::single(vec![2]));
        assert_ne!(first.id, second.id);
        assert_eq!(store.len(), 2);

        assert!(store.release(first.id));
        assert!(!store.release(first.id));
        assert!(store.get(first.id).is_none());
        assert_eq!(store.len(), 1);
    }
}
