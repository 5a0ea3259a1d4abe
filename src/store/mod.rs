//! Document store collaborator.
//!
//! The registry and the settings table never touch the disk directly. They
//! go through [`DocumentStore`], a small record-oriented interface: list
//! every document, create a document handle with a storage-assigned id,
//! upsert it, and remove it by id.
//!
//! Two implementations are provided:
//!
//! - [`MemoryStore`]: insertion-ordered, used by tests and dry runs. It can
//!   be told to fail every write to exercise persistence error paths.
//! - [`JsonFileStore`]: one append-only JSON-lines file per collection.
//!   Saves append the full document, removals append a tombstone, and
//!   opening the file replays the log. [`JsonFileStore::compact`] rewrites
//!   the file with only the live documents.
//!
//! ## File format
//!
//! ```text
//! {"_id":"k3Jd9QpLm2XzA0bc","name":"Anna","letter":"A","female":true,...}
//! {"_id":"k3Jd9QpLm2XzA0bc","name":"Anna","letter":"A","female":true,"monikers":["001-kyra"],...}
//! {"_id":"k3Jd9QpLm2XzA0bc","$$deleted":true}
//! ```

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Field holding the storage-assigned identifier in serialized documents
pub const ID_FIELD: &str = "_id";

/// Field marking a removal in the append-only log
pub const DELETED_FIELD: &str = "$$deleted";

/// Length of generated document ids
const ID_LENGTH: usize = 16;

/// Errors raised by document stores
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed document on line {line} of {path}: {reason}")]
    Malformed {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Document {id} could not be decoded: {source}")]
    Decode {
        id: String,
        source: serde_json::Error,
    },

    #[error("Value could not be encoded as a document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Encoded value is not a JSON object")]
    NotAnObject,

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A stored record: a storage-assigned id plus its JSON fields
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Build a document from a serializable value, which must encode to an object
    pub fn from_value<T: Serialize>(id: impl Into<String>, value: &T) -> Result<Self, StoreError> {
        Ok(Self::new(id, encode_fields(value)?))
    }

    /// Decode the fields into a typed record
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|source| {
            StoreError::Decode {
                id: self.id.clone(),
                source,
            }
        })
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Serialized form with the id folded in, as written to disk
    pub fn to_json(&self) -> Value {
        let mut object = self.fields.clone();
        object.insert(ID_FIELD.to_string(), Value::String(self.id.clone()));
        Value::Object(object)
    }
}

/// Encode a serializable value into document fields
pub fn encode_fields<T: Serialize>(value: &T) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(mut fields) => {
            fields.remove(ID_FIELD);
            Ok(fields)
        }
        _ => Err(StoreError::NotAnObject),
    }
}

/// Generate a random alphanumeric document id
pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Record-oriented persistence used by the registry and settings
pub trait DocumentStore {
    /// Every live document, in storage order
    fn find_all(&self) -> Result<Vec<Document>, StoreError>;

    /// Create a document handle with a fresh id. Nothing is written until `save`.
    fn create(&mut self, fields: Map<String, Value>) -> Document {
        Document::new(generate_id(), fields)
    }

    /// Insert or replace the document with the same id
    fn save(&mut self, document: &Document) -> Result<(), StoreError>;

    /// Remove the document with the given id; unknown ids are ignored
    fn remove(&mut self, id: &str) -> Result<(), StoreError>;
}
