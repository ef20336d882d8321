// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: open, inspect, merge, burst, trim, reorder, rotate, and compress
// existing PDF documents using the `lopdf` crate.

use std::collections::{BTreeSet, HashMap};

use docwerk_core::error::{DocwerkError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, instrument, warn};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against malformed page trees whose /Parent chain loops.
const MAX_TREE_DEPTH: usize = 64;

/// Reads and manipulates existing PDF files.
///
/// Every operation leaves the loaded document untouched and returns the
/// serialised bytes of a new document.
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            DocwerkError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    pub(crate) fn document(&self) -> &Document {
        &self.document
    }

    // -- Extraction -----------------------------------------------------------

    /// Extract a single page (1-indexed) into a new standalone PDF document.
    #[instrument(skip(self))]
    pub fn extract_page(&self, page_number: u32) -> Result<Vec<u8>> {
        self.extract_page_range(page_number, page_number)
    }

    /// Burst the document into single-page documents, in page order.
    #[instrument(skip(self))]
    pub fn burst(&self) -> Result<Vec<Vec<u8>>> {
        let total = self.page_count() as u32;
        if total == 0 {
            return Err(DocwerkError::PdfError("document has no pages".into()));
        }

        info!(total, "Bursting PDF into single pages");
        (1..=total).map(|page| self.extract_page(page)).collect()
    }

    /// Extract a contiguous range of pages [start..=end] (1-indexed) into a new
    /// PDF returned as bytes.
    pub fn extract_page_range(&self, start: u32, end: u32) -> Result<Vec<u8>> {
        let pages = self.document.get_pages();
        if start == 0 || start > end || end as usize > pages.len() {
            return Err(DocwerkError::PdfError(format!(
                "page range {}..={} out of range (document has {} pages)",
                start,
                end,
                pages.len()
            )));
        }

        let mut new_doc = empty_document();
        let mut cloner = PageCloner::default();
        for page_num in start..=end {
            let page_id = *pages.get(&page_num).ok_or_else(|| {
                DocwerkError::PdfError(format!("page {} not found in page tree", page_num))
            })?;
            cloner.clone_page_into(&self.document, &mut new_doc, page_id)?;
        }

        let output = serialise(&mut new_doc, "page range")?;
        debug!(start, end, output_bytes = output.len(), "Page range extracted");
        Ok(output)
    }

    // -- Combination ----------------------------------------------------------

    /// Merge this document with one or more other PDF byte-slices, producing a
    /// combined PDF. Pages appear in the order: self, then each supplied
    /// document in order.
    #[instrument(skip_all, fields(additional_count = others.len()))]
    pub fn merge(&self, others: &[&[u8]]) -> Result<Vec<u8>> {
        info!(
            base_pages = self.page_count(),
            additional_documents = others.len(),
            "Merging PDFs"
        );

        let mut merged = self.document.clone();

        for (index, other_bytes) in others.iter().enumerate() {
            let other_doc = Document::load_mem(other_bytes).map_err(|err| {
                DocwerkError::PdfError(format!(
                    "failed to load additional PDF #{}: {}",
                    index + 1,
                    err
                ))
            })?;

            // Objects shared between pages of one source stay shared.
            let mut cloner = PageCloner::default();
            for page_id in other_doc.get_pages().into_values() {
                cloner.clone_page_into(&other_doc, &mut merged, page_id)?;
            }
        }

        let output = serialise(&mut merged, "merged PDF")?;
        debug!(output_bytes = output.len(), "Merge complete");
        Ok(output)
    }

    // -- Page-set edits -------------------------------------------------------

    /// Drop the given pages (1-indexed). Duplicates are ignored; removing every
    /// page is rejected.
    #[instrument(skip(self))]
    pub fn remove_pages(&self, page_numbers: &[u32]) -> Result<Vec<u8>> {
        let total = self.page_count();
        let doomed: BTreeSet<u32> = page_numbers.iter().copied().collect();

        if let Some(bad) = doomed.iter().find(|&&p| p == 0 || p as usize > total) {
            return Err(DocwerkError::InvalidParameter(format!(
                "page {} out of range (document has {} pages)",
                bad, total
            )));
        }
        if doomed.len() >= total {
            return Err(DocwerkError::InvalidParameter(
                "cannot remove every page of a document".into(),
            ));
        }

        let mut doc = self.document.clone();
        let kept: Vec<ObjectId> = doc
            .get_pages()
            .into_iter()
            .filter(|(number, _)| !doomed.contains(number))
            .map(|(_, id)| id)
            .collect();

        rebuild_page_tree(&mut doc, &kept)?;
        doc.prune_objects();

        info!(removed = doomed.len(), remaining = kept.len(), "Pages removed");
        serialise(&mut doc, "trimmed PDF")
    }

    /// Rearrange pages so that output page `i` is input page `order[i]`
    /// (1-indexed). `order` must be a permutation of every page.
    #[instrument(skip(self))]
    pub fn reorder_pages(&self, order: &[u32]) -> Result<Vec<u8>> {
        let pages = self.document.get_pages();
        let is_permutation = order.len() == pages.len()
            && order.iter().copied().collect::<BTreeSet<u32>>()
                == pages.keys().copied().collect::<BTreeSet<u32>>();
        if !is_permutation {
            return Err(DocwerkError::InvalidParameter(format!(
                "page order {:?} is not a permutation of 1..={}",
                order,
                pages.len()
            )));
        }

        let ordered: Vec<ObjectId> = order.iter().map(|number| pages[number]).collect();
        let mut doc = self.document.clone();
        rebuild_page_tree(&mut doc, &ordered)?;

        info!(pages = ordered.len(), "Pages reordered");
        serialise(&mut doc, "reordered PDF")
    }

    /// Rotate every page by `degrees` (must be a multiple of 90), on top of any
    /// rotation the page already carries.
    #[instrument(skip(self))]
    pub fn rotate_all(&self, degrees: i32) -> Result<Vec<u8>> {
        if degrees % 90 != 0 {
            return Err(DocwerkError::InvalidParameter(format!(
                "rotation must be a multiple of 90, got {}",
                degrees
            )));
        }

        let mut doc = self.document.clone();
        for page_id in doc.get_pages().into_values() {
            let existing_rotation = inherited_attribute(&doc, page_id, b"Rotate")
                .and_then(|rotate| rotate.as_i64().ok())
                .unwrap_or(0);
            let new_rotation = (existing_rotation + degrees as i64).rem_euclid(360);

            page_dictionary_mut(&mut doc, page_id)?.set("Rotate", Object::Integer(new_rotation));
        }

        info!(degrees, "Pages rotated");
        serialise(&mut doc, "rotated PDF")
    }

    // -- Size reduction -------------------------------------------------------

    /// Drop unreachable objects and empty streams, renumber, and
    /// Flate-compress every stream.
    #[instrument(skip(self))]
    pub fn compress(&self) -> Result<Vec<u8>> {
        let mut doc = self.document.clone();

        let pruned = doc.prune_objects().len();
        let emptied = doc.delete_zero_length_streams().len();
        doc.renumber_objects();
        doc.compress();

        let output = serialise(&mut doc, "compressed PDF")?;
        info!(pruned, emptied, output_bytes = output.len(), "PDF compressed");
        Ok(output)
    }
}

// -- Page tree helpers --------------------------------------------------------

/// A fresh document with an empty page tree wired to the catalog.
pub(crate) fn empty_document() -> Document {
    let mut doc = Document::with_version("1.5");

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Kids", Object::Array(Vec::new()));
    pages.set("Count", Object::Integer(0));
    let pages_id = doc.add_object(pages);

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);

    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}

pub(crate) fn serialise(doc: &mut Document, what: &str) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    doc.save_to(&mut output).map_err(|err| {
        DocwerkError::PdfError(format!("failed to serialise {}: {}", what, err))
    })?;
    Ok(output)
}

/// Follow a reference to its target; direct objects are returned as-is.
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).map_err(|err| {
            DocwerkError::PdfError(format!("cannot resolve reference {:?}: {}", id, err))
        }),
        direct => Ok(direct),
    }
}

/// Look up `key` on a page, walking up the /Parent chain for inherited values.
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_dictionary(current).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

pub(crate) fn page_dictionary_mut(
    doc: &mut Document,
    page_id: ObjectId,
) -> Result<&mut Dictionary> {
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|err| DocwerkError::PdfError(format!("page {:?} unreadable: {}", page_id, err)))
}

/// The /Pages root referenced by the document catalog.
fn page_tree_root(doc: &Document) -> Result<ObjectId> {
    doc.catalog()
        .map_err(|err| DocwerkError::PdfError(format!("no catalog: {}", err)))?
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|err| DocwerkError::PdfError(format!("no /Pages reference: {}", err)))
}

/// Replace the page tree with a flat one listing `page_ids` in order.
///
/// Inherited attributes are copied onto each page first, since intermediate
/// nodes are dropped from the tree.
fn rebuild_page_tree(doc: &mut Document, page_ids: &[ObjectId]) -> Result<()> {
    let root = page_tree_root(doc)?;

    for &page_id in page_ids {
        let own = doc.get_dictionary(page_id).map_err(|err| {
            DocwerkError::PdfError(format!("page {:?} unreadable: {}", page_id, err))
        })?;
        let missing: Vec<(&[u8], Object)> = INHERITABLE
            .iter()
            .filter(|key| !own.has(key))
            .filter_map(|key| inherited_attribute(doc, page_id, key).map(|v| (*key, v.clone())))
            .collect();

        let page = page_dictionary_mut(doc, page_id)?;
        for (key, value) in missing {
            page.set(key.to_vec(), value);
        }
        page.set("Parent", Object::Reference(root));
    }

    let root_dict = page_dictionary_mut(doc, root)?;
    root_dict.set(
        "Kids",
        Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
    );
    root_dict.set("Count", Object::Integer(page_ids.len() as i64));
    Ok(())
}

// -- Cross-document page cloning ----------------------------------------------

/// Copies pages between documents, remembering which source objects were
/// already copied so shared resources are cloned once and reference cycles
/// terminate.
#[derive(Default)]
struct PageCloner {
    copied: HashMap<ObjectId, ObjectId>,
}

impl PageCloner {
    /// Clone a single page (and everything it references) from `source` into
    /// `target`, appending it as the last page of the target's root page tree.
    fn clone_page_into(
        &mut self,
        source: &Document,
        target: &mut Document,
        page_id: ObjectId,
    ) -> Result<()> {
        let page = source.get_dictionary(page_id).map_err(|err| {
            DocwerkError::PdfError(format!("cannot read page object {:?}: {}", page_id, err))
        })?;

        let cloned_id = target.new_object_id();
        self.copied.insert(page_id, cloned_id);

        let mut cloned = self.clone_dictionary(source, target, page)?;

        for key in INHERITABLE {
            if cloned.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(source, page_id, key) {
                let value = self.deep_clone(source, target, value)?;
                cloned.set(key.to_vec(), value);
            }
        }

        let pages_id = page_tree_root(target)?;
        cloned.set("Parent", Object::Reference(pages_id));
        target.objects.insert(cloned_id, Object::Dictionary(cloned));

        let pages_dict = page_dictionary_mut(target, pages_id)?;
        if let Ok(Object::Array(kids)) = pages_dict.get_mut(b"Kids") {
            kids.push(Object::Reference(cloned_id));
        }
        let count = pages_dict.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        pages_dict.set("Count", Object::Integer(count + 1));

        Ok(())
    }

    /// Deep-clone an object, copying referenced objects into `target`. /Parent
    /// entries are skipped; the caller re-parents the page.
    fn deep_clone(
        &mut self,
        source: &Document,
        target: &mut Document,
        object: &Object,
    ) -> Result<Object> {
        match object {
            Object::Dictionary(dict) => Ok(Object::Dictionary(self.clone_dictionary(
                source, target, dict,
            )?)),
            Object::Array(items) => {
                let mut cloned = Vec::with_capacity(items.len());
                for item in items {
                    cloned.push(self.deep_clone(source, target, item)?);
                }
                Ok(Object::Array(cloned))
            }
            Object::Reference(ref_id) => {
                if let Some(existing) = self.copied.get(ref_id) {
                    return Ok(Object::Reference(*existing));
                }
                match source.get_object(*ref_id) {
                    Ok(referenced) => {
                        let new_id = target.new_object_id();
                        self.copied.insert(*ref_id, new_id);
                        let cloned = self.deep_clone(source, target, referenced)?;
                        target.objects.insert(new_id, cloned);
                        Ok(Object::Reference(new_id))
                    }
                    Err(err) => {
                        warn!(?ref_id, %err, "Cannot resolve reference, using Null");
                        Ok(Object::Null)
                    }
                }
            }
            Object::Stream(stream) => {
                let dict = self.clone_dictionary(source, target, &stream.dict)?;
                Ok(Object::Stream(lopdf::Stream::new(dict, stream.content.clone())))
            }
            other => Ok(other.clone()),
        }
    }

    fn clone_dictionary(
        &mut self,
        source: &Document,
        target: &mut Document,
        dict: &Dictionary,
    ) -> Result<Dictionary> {
        let mut cloned = Dictionary::new();
        for (key, value) in dict.iter() {
            if key == b"Parent" {
                continue;
            }
            cloned.set(key.clone(), self.deep_clone(source, target, value)?);
        }
        Ok(cloned)
    }
}
