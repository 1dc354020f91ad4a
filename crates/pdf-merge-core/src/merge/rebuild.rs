//! Fallback merge backend: rebuild the document from collected pages.

use lopdf::{Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::MergeBackend;
use crate::error::{Error, Result};

/// Merges by decompressing every input and reconstructing a fresh
/// document around the collected page objects.
///
/// Slower than [`super::PageTreeMerger`] but tolerant of compressed
/// object streams and oddly shaped page trees from PDF 1.5+ producers,
/// which is why it runs second.
pub struct RebuildMerger;

impl MergeBackend for RebuildMerger {
    fn name(&self) -> &'static str {
        "rebuild"
    }

    fn merge(&self, inputs: &[PathBuf]) -> Result<Vec<u8>> {
        if inputs.is_empty() {
            return Err(Error::Merge("no staged files to merge".to_string()));
        }

        let mut max_id: u32 = 1;
        let mut collected_pages: BTreeMap<ObjectId, Object> = BTreeMap::new();
        let mut collected_objects: BTreeMap<ObjectId, Object> = BTreeMap::new();
        let mut document = Document::with_version("1.5");

        for path in inputs {
            let mut doc = Document::load(path)
                .map_err(|e| Error::Merge(format!("failed to load {}: {e}", path.display())))?;

            // Expand object streams so every page is addressable directly.
            doc.decompress();
            doc.renumber_objects_with(max_id);
            max_id = doc.max_id + 1;

            let source_pages = doc.get_pages();
            if source_pages.is_empty() {
                return Err(Error::Merge(format!("no pages found in {}", path.display())));
            }
            for &page_id in source_pages.values() {
                let page_obj = doc.get_object(page_id).map_err(|e| {
                    Error::Merge(format!("unreadable page in {}: {e}", path.display()))
                })?;
                collected_pages.insert(page_id, page_obj.clone());
            }

            for (object_id, object) in doc.objects {
                match object.type_name().unwrap_or(b"") {
                    b"Catalog" | b"Pages" | b"Page" | b"Outlines" | b"Outline" => {}
                    _ => {
                        collected_objects.insert(object_id, object);
                    }
                }
            }
        }

        for (object_id, object) in collected_objects {
            document.objects.insert(object_id, object);
        }

        let pages_id = document.new_object_id();

        for (object_id, object) in &collected_pages {
            if let Object::Dictionary(dict) = object {
                let mut new_dict = dict.clone();
                new_dict.set("Parent", Object::Reference(pages_id));
                document.objects.insert(*object_id, Object::Dictionary(new_dict));
            }
        }

        // Ordered by object ID; inputs were renumbered incrementally, so
        // this is also download order.
        let kids: Vec<Object> = collected_pages
            .keys()
            .map(|&id| Object::Reference(id))
            .collect();

        #[allow(clippy::cast_possible_truncation)]
        let total_pages = collected_pages.len() as u32;

        let pages_dict = lopdf::Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(i64::from(total_pages))),
        ]);
        document.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = document.new_object_id();
        let catalog_dict = lopdf::Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        document.objects.insert(catalog_id, Object::Dictionary(catalog_dict));

        document.trailer.set("Root", Object::Reference(catalog_id));

        #[allow(clippy::cast_possible_truncation)]
        let new_max_id = document.objects.len() as u32;
        document.max_id = new_max_id;

        document.renumber_objects();
        document.compress();

        let mut output = Vec::new();
        document
            .save_to(&mut output)
            .map_err(|e| Error::Merge(format!("failed to serialize merged PDF: {e}")))?;

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::fixtures::{page_widths, single_page_pdf};
    use tempfile::TempDir;

    fn stage(dir: &TempDir, name: &str, width: i64) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, single_page_pdf(width)).unwrap();
        path
    }

    #[test]
    fn test_rebuild_preserves_input_order() {
        let dir = TempDir::new().unwrap();
        let inputs = vec![
            stage(&dir, "part-1.pdf", 500),
            stage(&dir, "part-2.pdf", 612),
        ];

        let merged = RebuildMerger.merge(&inputs).unwrap();
        assert!(merged.starts_with(b"%PDF"));
        assert_eq!(page_widths(&merged), vec![500, 612]);
    }

    #[test]
    fn test_rebuild_handles_compressed_input() {
        let dir = TempDir::new().unwrap();

        // Re-save a fixture with compression applied to exercise the
        // decompress step.
        let mut doc = Document::load_mem(&single_page_pdf(612)).unwrap();
        doc.compress();
        let mut compressed = Vec::new();
        doc.save_to(&mut compressed).unwrap();

        let path = dir.path().join("compressed.pdf");
        std::fs::write(&path, compressed).unwrap();

        let merged = RebuildMerger.merge(&[path]).unwrap();
        assert_eq!(page_widths(&merged), vec![612]);
    }

    #[test]
    fn test_rebuild_rejects_garbage_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        let err = RebuildMerger.merge(&[path]).unwrap_err();
        assert!(matches!(err, Error::Merge(_)));
    }
}
