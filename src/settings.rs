//! Persisted application settings.
//!
//! Each setting is one `{ name, value }` document. Reading a setting that
//! has never been stored creates its document from the registered default
//! and saves it, so the settings collection fills in as the program runs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{encode_fields, Document, DocumentStore, StoreError};

/// One-time flag guarding the seed-name import
pub const IMPORTED_NAMES: &str = "imported_names";

/// Automatically name unnamed creatures that are in the world
pub const NAME_CREATURES: &str = "name_creatures";

/// Periodically re-apply every creature's name
pub const REMEMBER_NAMES: &str = "make_creatures_remember_their_name";

#[derive(Debug, Serialize, Deserialize)]
struct SettingRecord {
    name: String,
    #[serde(default)]
    value: Value,
}

/// Settings table backed by a document store
#[derive(Debug)]
pub struct Settings<S> {
    store: S,
    documents: HashMap<String, Document>,
    defaults: HashMap<String, Value>,
}

impl<S: DocumentStore> Settings<S> {
    /// Load every stored setting
    pub fn load(store: S, defaults: HashMap<String, Value>) -> Result<Self, StoreError> {
        let mut documents = HashMap::new();
        for document in store.find_all()? {
            let record: SettingRecord = document.decode()?;
            documents.insert(record.name, document);
        }

        log::debug!("Loaded {} stored settings", documents.len());

        Ok(Self {
            store,
            documents,
            defaults,
        })
    }

    /// Current value, creating the setting from its default on first access
    pub fn get(&mut self, name: &str) -> Result<Value, StoreError> {
        Ok(self
            .document(name)?
            .get("value")
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Boolean view of a setting; anything other than `true` reads as false
    pub fn get_bool(&mut self, name: &str) -> Result<bool, StoreError> {
        Ok(self.get(name)?.as_bool().unwrap_or(false))
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), StoreError> {
        let value = value.into();
        self.document(name)?;
        if let Some(document) = self.documents.get_mut(name) {
            document.set("value", value);
            self.store.save(document)?;
        }
        Ok(())
    }

    /// Whether the setting has a stored document
    pub fn is_stored(&self, name: &str) -> bool {
        self.documents.contains_key(name)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn document(&mut self, name: &str) -> Result<&Document, StoreError> {
        if !self.documents.contains_key(name) {
            let record = SettingRecord {
                name: name.to_string(),
                value: self.defaults.get(name).cloned().unwrap_or(Value::Null),
            };
            let document = self.store.create(encode_fields(&record)?);
            self.store.save(&document)?;
            self.documents.insert(name.to_string(), document);
        }

        self.documents
            .get(name)
            .ok_or_else(|| StoreError::Unavailable(format!("setting '{}' vanished", name)))
    }
}
