//! Primary merge backend: splice page trees.

use lopdf::{Document, Object, ObjectId};
use std::path::{Path, PathBuf};

use super::MergeBackend;
use crate::error::{Error, Result};

/// Merges by keeping the first document as the base and splicing the
/// remaining documents' pages into its page tree.
///
/// Source objects are carried over untouched after renumbering, which
/// makes this the fast path; documents whose structure it cannot walk
/// (e.g. pages hidden inside compressed object streams) fail over to
/// [`super::RebuildMerger`].
pub struct PageTreeMerger;

impl MergeBackend for PageTreeMerger {
    fn name(&self) -> &'static str {
        "page-tree"
    }

    fn merge(&self, inputs: &[PathBuf]) -> Result<Vec<u8>> {
        let Some((first, rest)) = inputs.split_first() else {
            return Err(Error::Merge("no staged files to merge".to_string()));
        };

        let mut merged = load(first)?;
        let mut max_id = merged.max_id;

        for path in rest {
            let mut doc = load(path)?;

            // Renumber to avoid object ID collisions with the base.
            doc.renumber_objects_with(max_id + 1);
            max_id = doc.max_id;

            let doc_pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
            if doc_pages.is_empty() {
                return Err(Error::Merge(format!("no pages found in {}", path.display())));
            }

            merged.objects.extend(doc.objects);
            append_pages(&mut merged, &doc_pages)?;
        }

        merged.renumber_objects();
        merged.compress();

        let mut output = Vec::new();
        merged
            .save_to(&mut output)
            .map_err(|e| Error::Merge(format!("failed to serialize merged PDF: {e}")))?;
        Ok(output)
    }
}

fn load(path: &Path) -> Result<Document> {
    Document::load(path)
        .map_err(|e| Error::Merge(format!("failed to load {}: {e}", path.display())))
}

/// Append page references to the base document's page tree, in order.
fn append_pages(merged: &mut Document, page_ids: &[ObjectId]) -> Result<()> {
    let catalog = merged
        .catalog_mut()
        .map_err(|e| Error::Merge(format!("base document catalog is unreadable: {e}")))?;

    let pages_id = catalog
        .get(b"Pages")
        .and_then(|p| p.as_reference())
        .map_err(|e| Error::Merge(format!("catalog carries no page tree reference: {e}")))?;

    let pages_dict = merged
        .get_object_mut(pages_id)
        .map_err(|e| Error::Merge(format!("page tree object is unreadable: {e}")))?;

    let Object::Dictionary(dict) = pages_dict else {
        return Err(Error::Merge("page tree is not a dictionary".to_string()));
    };

    let kids = dict
        .get_mut(b"Kids")
        .map_err(|_| Error::Merge("page tree has no kid entries".to_string()))?;

    let Object::Array(kids_array) = kids else {
        return Err(Error::Merge("page tree kids are not an array".to_string()));
    };
    for &page_id in page_ids {
        kids_array.push(Object::Reference(page_id));
    }

    let current_count = dict.get(b"Count").and_then(|c| c.as_i64()).unwrap_or(0);
    dict.set("Count", Object::Integer(current_count + page_ids.len() as i64));

    // The appended pages must point back at the base page tree.
    for &page_id in page_ids {
        if let Ok(Object::Dictionary(page_dict)) = merged.get_object_mut(page_id) {
            page_dict.set("Parent", Object::Reference(pages_id));
        }
    }

    Ok(())
}
