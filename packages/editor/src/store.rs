//! # Document Store
//!
//! The dispatcher does not own the document's lifecycle. The host hands it
//! a store it can read the current document from and write the next one to.

use crate::errors::EditorError;
use std::path::Path;
use vectra_model::Document;

/// Read/write access to the host's current document
pub trait DocumentStore {
    /// Current document, or `None` when nothing is loaded
    fn document(&self) -> Option<&Document>;

    /// Replace the current document
    fn set_document(&mut self, document: Document);
}

/// In-memory store (tests, tooling, wasm host)
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    document: Option<Document>,

    /// Increments on every write
    version: u64,
}

impl MemoryStore {
    pub fn new(document: Document) -> Self {
        Self {
            document: Some(document),
            version: 0,
        }
    }

    /// Store with no document loaded
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store holding the document serialized in a JSON file
    pub fn from_file(path: &Path) -> Result<Self, EditorError> {
        let document: Document = vectra_common::read_json(path)?;
        Ok(Self::new(document))
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn take(&mut self) -> Option<Document> {
        self.document.take()
    }
}

impl DocumentStore for MemoryStore {
    fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    fn set_document(&mut self, document: Document) {
        self.version += 1;
        self.document = Some(document);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_versioning() {
        let mut store = MemoryStore::empty();
        assert!(store.document().is_none());

        store.set_document(Document::new("p1", "One"));
        store.set_document(Document::new("p1", "Two"));

        assert_eq!(store.version(), 2);
        assert_eq!(store.document().unwrap().project.name, "Two");
        assert!(store.take().is_some());
        assert!(store.document().is_none());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, r#"{ "project": { "id": "p1", "name": "Saved" } }"#).unwrap();

        let store = MemoryStore::from_file(&path).unwrap();
        assert_eq!(store.document().unwrap().project.name, "Saved");
        assert_eq!(store.version(), 0);

        let missing = MemoryStore::from_file(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(EditorError::Common(_))));
    }
}
