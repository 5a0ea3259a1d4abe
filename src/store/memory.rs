//! In-memory document store.

use super::{Document, DocumentStore, StoreError};

/// Insertion-ordered store kept entirely in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    documents: Vec<Document>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store, e.g. with records exported elsewhere
    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents,
            fail_writes: false,
        }
    }

    /// Make every subsequent `save` and `remove` fail
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|document| document.id == id)
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("memory store is read-only".to_string()));
        }
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    fn find_all(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.documents.clone())
    }

    fn save(&mut self, document: &Document) -> Result<(), StoreError> {
        self.check_writable()?;
        match self.documents.iter_mut().find(|existing| existing.id == document.id) {
            Some(existing) => *existing = document.clone(),
            None => self.documents.push(document.clone()),
        }
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.documents.retain(|document| document.id != id);
        Ok(())
    }
}
