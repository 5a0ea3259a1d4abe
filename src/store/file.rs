//! Append-only JSON-lines document store.
//!
//! Every `save` appends the whole document as one line and every `remove`
//! appends a tombstone. Opening the file replays the log so the last line
//! for an id wins. Documents keep the position of their first appearance.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::{Document, DocumentStore, StoreError, DELETED_FIELD, ID_FIELD};

/// A document collection backed by a single file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    documents: Vec<Document>,
}

impl JsonFileStore {
    /// Open (or lazily create) the collection stored at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let documents = if path.exists() {
            replay(&path)?
        } else {
            Vec::new()
        };

        log::debug!("Opened {} with {} live documents", path.display(), documents.len());

        Ok(Self { path, documents })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Rewrite the file so it holds exactly one line per live document
    pub fn compact(&mut self) -> Result<(), StoreError> {
        let tmp_path = self.path.with_extension("compact");
        {
            let mut file = File::create(&tmp_path).map_err(|source| io_error(&tmp_path, source))?;
            for document in &self.documents {
                let line = serde_json::to_string(&document.to_json())?;
                writeln!(file, "{}", line).map_err(|source| io_error(&tmp_path, source))?;
            }
            file.sync_all().map_err(|source| io_error(&tmp_path, source))?;
        }
        fs::rename(&tmp_path, &self.path).map_err(|source| io_error(&self.path, source))?;

        log::info!("Compacted {} to {} documents", self.path.display(), self.documents.len());
        Ok(())
    }

    fn append(&self, value: &Value) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
            }
        }

        let line = serde_json::to_string(value)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| io_error(&self.path, source))?;
        writeln!(file, "{}", line).map_err(|source| io_error(&self.path, source))
    }
}

impl DocumentStore for JsonFileStore {
    fn find_all(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.documents.clone())
    }

    fn save(&mut self, document: &Document) -> Result<(), StoreError> {
        self.append(&document.to_json())?;
        upsert(&mut self.documents, document.clone());
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        let mut tombstone = Map::new();
        tombstone.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        tombstone.insert(DELETED_FIELD.to_string(), Value::Bool(true));
        self.append(&Value::Object(tombstone))?;
        self.documents.retain(|document| document.id != id);
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn upsert(documents: &mut Vec<Document>, document: Document) {
    match documents.iter_mut().find(|existing| existing.id == document.id) {
        Some(existing) => *existing = document,
        None => documents.push(document),
    }
}

/// Rebuild the live document set from the log
fn replay(path: &Path) -> Result<Vec<Document>, StoreError> {
    let file = File::open(path).map_err(|source| io_error(path, source))?;
    let reader = BufReader::new(file);
    let mut documents = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| io_error(path, source))?;
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let malformed = |reason: String| StoreError::Malformed {
            path: path.display().to_string(),
            line: line_number,
            reason,
        };

        let mut object = match serde_json::from_str::<Value>(&line) {
            Ok(Value::Object(object)) => object,
            Ok(_) => return Err(malformed("expected a JSON object".to_string())),
            Err(e) => return Err(malformed(e.to_string())),
        };

        let id = match object.remove(ID_FIELD) {
            Some(Value::String(id)) => id,
            _ => return Err(malformed(format!("missing string field '{}'", ID_FIELD))),
        };

        if object.get(DELETED_FIELD) == Some(&Value::Bool(true)) {
            documents.retain(|document: &Document| document.id != id);
        } else {
            upsert(&mut documents, Document::new(id, object));
        }
    }

    Ok(documents)
}
