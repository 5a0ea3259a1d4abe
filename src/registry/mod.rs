//! # Name Registry
//!
//! Owns every known creature name, partitioned into letter buckets `A`-`Z`,
//! and hands names out to newborn creatures.
//!
//! ## Invariants
//!
//! - Every entry in `by_letter[c]` has `letter() == c`.
//! - `known_lower_keys` holds exactly the lowercase keys of all entries,
//!   so no two entries share a key.
//! - Both structures change together: removal prunes the bucket and the
//!   key set in one step.
//!
//! ## Assignment
//!
//! A creature of generation `g` is offered letter `'A' + g % 26`. The bucket
//! is scanned in stored order and the first entry that is eligible for the
//! creature's gender and borne by no creature wins. There is no fallback to
//! other letters; an exhausted bucket yields `None`.
//!
//! ## Persistence
//!
//! Mutations are write-through. The in-memory change is applied first, then
//! the affected record is written to the [`DocumentStore`]. A failed write
//! is returned as [`RegistryError::Persistence`] and the in-memory change is
//! kept, so the registry may be ahead of storage until the next write.

pub mod entry;
pub mod seed;

pub use entry::{letter_for_generation, letter_of, lowercase_key, Gender, NameEntry, NameRecord};
pub use seed::SeedNames;

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::settings::{Settings, IMPORTED_NAMES};
use crate::store::{Document, DocumentStore, StoreError};

/// Errors surfaced by registry mutations
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid name '{0}': names must start with a letter A-Z")]
    InvalidName(String),

    #[error("Name storage failed: {0}")]
    Persistence(#[from] StoreError),
}

/// Full export of the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub exported_at: DateTime<Utc>,
    pub names: Vec<SnapshotName>,
}

/// One exported name, with the storage id it had at export time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotName {
    pub id: String,
    #[serde(flatten)]
    pub record: NameRecord,
}

/// The name registry
#[derive(Debug)]
pub struct NameRegistry<S> {
    store: S,
    by_letter: BTreeMap<char, Vec<NameEntry>>,
    known_lower_keys: HashSet<String>,
}

impl<S: DocumentStore> NameRegistry<S> {
    /// An empty registry with all 26 buckets
    pub fn new(store: S) -> Self {
        Self {
            store,
            by_letter: ('A'..='Z').map(|letter| (letter, Vec::new())).collect(),
            known_lower_keys: HashSet::new(),
        }
    }

    /// Load every stored name into its bucket.
    ///
    /// Records without a letter are skipped. A record whose stored letter
    /// disagrees with its text is filed under the text's letter, and a
    /// record repeating an already loaded name is ignored.
    pub fn load(store: S) -> Result<Self, RegistryError> {
        let documents = store.find_all()?;
        let mut registry = Self::new(store);

        for document in documents {
            let record: NameRecord = document.decode()?;
            let Some(stored_letter) = record.stored_letter() else {
                debug!("Skipping name record {} without a letter", document.id);
                continue;
            };

            let Some(entry) = NameEntry::from_record(document.id.as_str(), &record) else {
                warn!("Skipping name record {}: '{}' has no letter bucket", document.id, record.name);
                continue;
            };

            if stored_letter != entry.letter() {
                warn!(
                    "Name '{}' was stored under letter {}, filing it under {}",
                    entry.text(),
                    stored_letter,
                    entry.letter()
                );
            }

            if !registry.known_lower_keys.insert(entry.lowercase_key().to_string()) {
                warn!("Skipping duplicate name record {} for '{}'", document.id, entry.text());
                continue;
            }

            registry.by_letter.entry(entry.letter()).or_default().push(entry);
        }

        info!("Loaded {} names", registry.len());
        Ok(registry)
    }

    /// Load, then import `seed` once. The one-time flag is stored before
    /// the import so a partial import is never repeated.
    pub fn initialize<T: DocumentStore>(
        store: S,
        settings: &mut Settings<T>,
        seed: &SeedNames,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::load(store)?;

        if !settings.get_bool(IMPORTED_NAMES)? {
            settings.set(IMPORTED_NAMES, true)?;
            let added = registry.seed(seed)?;
            info!("Imported {} of {} seed names", added, seed.len());
        }

        Ok(registry)
    }

    /// Insert every seed name that is not yet known and mark it eligible for
    /// its list's gender. Names that already exist are left untouched.
    pub fn seed(&mut self, seed: &SeedNames) -> Result<usize, RegistryError> {
        let mut added = 0;

        for (gender, name) in seed.iter() {
            match self.insert_unsaved(name) {
                Ok(Some((letter, index))) => {
                    if let Some(entry) = self.entry_mut(letter, index) {
                        entry.set_eligible(gender, true);
                    }
                    self.persist(letter, index)?;
                    added += 1;
                }
                Ok(None) => debug!("Seed name '{}' already known", name),
                Err(RegistryError::InvalidName(name)) => warn!("Skipping invalid seed name '{}'", name),
                Err(e) => return Err(e),
            }
        }

        Ok(added)
    }

    /// Case-insensitive exact lookup
    pub fn lookup(&self, name: &str) -> Option<&NameEntry> {
        let (letter, index) = self.locate(name)?;
        self.entry(letter, index)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locate(name).is_some()
    }

    /// Add a new name. `Ok(None)` when the name already exists in any casing.
    pub fn add(&mut self, name: &str) -> Result<Option<&NameEntry>, RegistryError> {
        match self.insert(name)? {
            Some((letter, index)) => Ok(self.entry(letter, index)),
            None => Ok(None),
        }
    }

    /// Remove a name. `Ok(false)` when it is not known.
    ///
    /// Creatures still bearing the name keep it in the game; the registry
    /// simply forgets them.
    pub fn remove(&mut self, name: &str) -> Result<bool, RegistryError> {
        let Some((letter, index)) = self.locate(name) else {
            return Ok(false);
        };
        let Some(bucket) = self.by_letter.get_mut(&letter) else {
            return Ok(false);
        };

        let entry = bucket.remove(index);
        self.known_lower_keys.remove(entry.lowercase_key());

        if entry.use_count() > 0 {
            info!(
                "Removed name '{}' is still borne by {} creature(s)",
                entry.text(),
                entry.use_count()
            );
        }

        self.store.remove(entry.id())?;
        Ok(true)
    }

    /// Pick the first unused name eligible for `gender` in the letter for
    /// `generation`, and attach `moniker` to it
    pub fn assign_name(
        &mut self,
        generation: u32,
        gender: Gender,
        moniker: &str,
    ) -> Result<Option<&NameEntry>, RegistryError> {
        let letter = letter_for_generation(generation);
        let found = self
            .by_letter
            .get(&letter)
            .and_then(|bucket| bucket.iter().position(|entry| entry.is_available(gender)));

        let Some(index) = found else {
            debug!("No {} name left under letter {} for {}", gender, letter, moniker);
            return Ok(None);
        };

        if let Some(entry) = self.entry_mut(letter, index) {
            entry.attach(moniker);
            debug!("Assigned '{}' to {}", entry.text(), moniker);
        }
        self.persist(letter, index)?;

        Ok(self.entry(letter, index))
    }

    /// Set or clear a gender flag. `Ok(false)` when the name is unknown.
    pub fn set_gender(&mut self, name: &str, gender: Gender, eligible: bool) -> Result<bool, RegistryError> {
        let Some((letter, index)) = self.locate(name) else {
            return Ok(false);
        };

        let changed = self
            .entry_mut(letter, index)
            .map(|entry| entry.set_eligible(gender, eligible))
            .unwrap_or(false);
        if changed {
            self.persist(letter, index)?;
        }
        Ok(true)
    }

    /// Record that `moniker` bears `name`. Returns whether anything changed;
    /// unknown names and existing attachments are left alone.
    pub fn attach_moniker(&mut self, name: &str, moniker: &str) -> Result<bool, RegistryError> {
        let Some((letter, index)) = self.locate(name) else {
            return Ok(false);
        };

        let attached = self
            .entry_mut(letter, index)
            .map(|entry| entry.attach(moniker))
            .unwrap_or(false);
        if attached {
            self.persist(letter, index)?;
        }
        Ok(attached)
    }

    /// Detach `moniker` from every name bearing it; returns how many changed
    pub fn release_moniker(&mut self, moniker: &str) -> Result<usize, RegistryError> {
        let mut changed = Vec::new();
        for (letter, bucket) in self.by_letter.iter_mut() {
            for (index, entry) in bucket.iter_mut().enumerate() {
                if entry.detach(moniker) {
                    changed.push((*letter, index));
                }
            }
        }

        for (letter, index) in &changed {
            self.persist(*letter, *index)?;
        }
        Ok(changed.len())
    }

    /// Move `moniker` to `new_name`, adding the name (eligible for `gender`)
    /// when it is not known yet
    pub fn rename(&mut self, moniker: &str, new_name: &str, gender: Gender) -> Result<&NameEntry, RegistryError> {
        if letter_of(new_name).is_none() {
            return Err(RegistryError::InvalidName(new_name.trim().to_string()));
        }
        self.release_moniker(moniker)?;

        let (letter, index) = match self.locate(new_name) {
            Some(position) => position,
            None => {
                let position = self
                    .insert_unsaved(new_name)?
                    .ok_or_else(|| RegistryError::InvalidName(new_name.to_string()))?;
                if let Some(entry) = self.entry_mut(position.0, position.1) {
                    entry.set_eligible(gender, true);
                }
                position
            }
        };

        if let Some(entry) = self.entry_mut(letter, index) {
            entry.attach(moniker);
        }
        self.persist(letter, index)?;

        self.entry(letter, index)
            .ok_or_else(|| RegistryError::InvalidName(new_name.to_string()))
    }

    /// The name `moniker` currently bears, if any
    pub fn name_held_by(&self, moniker: &str) -> Option<&NameEntry> {
        self.entries().find(|entry| entry.has_moniker(moniker))
    }

    /// A bucket sorted by text, descending, for display
    pub fn letter_view(&self, letter: char) -> Vec<&NameEntry> {
        let mut entries: Vec<&NameEntry> = self
            .by_letter
            .get(&letter.to_ascii_uppercase())
            .map(|bucket| bucket.iter().collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| b.text().cmp(a.text()));
        entries
    }

    /// A bucket in stored order
    pub fn bucket(&self, letter: char) -> &[NameEntry] {
        self.by_letter
            .get(&letter.to_ascii_uppercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of names per letter, A to Z
    pub fn letter_counts(&self) -> Vec<(char, usize)> {
        self.by_letter
            .iter()
            .map(|(letter, bucket)| (*letter, bucket.len()))
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &NameEntry> {
        self.by_letter.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.known_lower_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known_lower_keys.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Export every name
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            exported_at: Utc::now(),
            names: self
                .entries()
                .map(|entry| SnapshotName {
                    id: entry.id().to_string(),
                    record: entry.to_record(),
                })
                .collect(),
        }
    }

    /// Add every exported name not already known, keeping its flags and
    /// monikers. Returns the number of names added.
    pub fn merge(&mut self, snapshot: &RegistrySnapshot) -> Result<usize, RegistryError> {
        let mut added = 0;

        for name in &snapshot.names {
            let (letter, index) = match self.insert_unsaved(&name.record.name) {
                Ok(Some(position)) => position,
                Ok(None) => {
                    debug!("Skipping known name '{}' from snapshot", name.record.name);
                    continue;
                }
                Err(RegistryError::InvalidName(text)) => {
                    warn!("Skipping invalid exported name '{}'", text);
                    continue;
                }
                Err(e) => return Err(e),
            };

            if let Some(entry) = self.entry_mut(letter, index) {
                entry.set_eligible(Gender::Male, name.record.male);
                entry.set_eligible(Gender::Female, name.record.female);
                for moniker in name.record.monikers.iter().filter(|m| !m.is_empty()) {
                    entry.attach(moniker);
                }
            }
            self.persist(letter, index)?;
            added += 1;
        }

        info!("Merged {} of {} exported names", added, snapshot.names.len());
        Ok(added)
    }

    fn entry(&self, letter: char, index: usize) -> Option<&NameEntry> {
        self.by_letter.get(&letter)?.get(index)
    }

    fn entry_mut(&mut self, letter: char, index: usize) -> Option<&mut NameEntry> {
        self.by_letter.get_mut(&letter)?.get_mut(index)
    }

    /// Bucket position of a name, failing closed on the key set
    fn locate(&self, name: &str) -> Option<(char, usize)> {
        let key = lowercase_key(name);
        if !self.known_lower_keys.contains(&key) {
            return None;
        }

        let letter = letter_of(name)?;
        let index = self
            .by_letter
            .get(&letter)?
            .iter()
            .position(|entry| entry.lowercase_key() == key)?;
        Some((letter, index))
    }

    /// Insert a new entry and write it; `None` for an existing name
    fn insert(&mut self, name: &str) -> Result<Option<(char, usize)>, RegistryError> {
        let position = self.insert_unsaved(name)?;
        if let Some((letter, index)) = position {
            self.persist(letter, index)?;
        }
        Ok(position)
    }

    fn insert_unsaved(&mut self, name: &str) -> Result<Option<(char, usize)>, RegistryError> {
        if self.locate(name).is_some() {
            return Ok(None);
        }

        let document = self.store.create(Default::default());
        let entry = NameEntry::new(document.id, name)
            .ok_or_else(|| RegistryError::InvalidName(name.trim().to_string()))?;

        let letter = entry.letter();
        self.known_lower_keys.insert(entry.lowercase_key().to_string());
        let bucket = self.by_letter.entry(letter).or_default();
        bucket.push(entry);

        Ok(Some((letter, bucket.len() - 1)))
    }

    fn persist(&mut self, letter: char, index: usize) -> Result<(), RegistryError> {
        let Some(entry) = self.by_letter.get(&letter).and_then(|bucket| bucket.get(index)) else {
            return Ok(());
        };
        let document = Document::from_value(entry.id(), &entry.to_record())?;
        self.store.save(&document)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::collections::HashMap;

    fn registry() -> NameRegistry<MemoryStore> {
        NameRegistry::new(MemoryStore::new())
    }

    fn female(registry: &mut NameRegistry<MemoryStore>, name: &str) {
        registry.add(name).unwrap();
        registry.set_gender(name, Gender::Female, true).unwrap();
    }

    #[test]
    fn test_add_then_lookup_any_casing() {
        let mut registry = registry();
        let entry = registry.add("  McKenna ").unwrap().unwrap();
        assert_eq!(entry.text(), "McKenna");
        assert_eq!(entry.letter(), 'M');

        for query in ["mckenna", "MCKENNA", " McKenna"] {
            assert_eq!(registry.lookup(query).map(NameEntry::text), Some("McKenna"));
        }
        assert!(registry.lookup("McKen").is_none());
        assert_eq!(registry.store().len(), 1);
    }

    #[test]
    fn test_add_is_idempotent_case_insensitively() {
        let mut registry = registry();
        assert!(registry.add("Alice").unwrap().is_some());
        assert!(registry.add("alice").unwrap().is_none());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.bucket('A').len(), 1);
        assert_eq!(registry.store().len(), 1);
    }

    #[test]
    fn test_add_rejects_names_without_bucket() {
        let mut registry = registry();
        assert!(matches!(registry.add("   "), Err(RegistryError::InvalidName(_))));
        assert!(matches!(registry.add("7of9"), Err(RegistryError::InvalidName(_))));
        assert!(registry.is_empty());
        assert!(registry.store().is_empty());
    }

    #[test]
    fn test_entries_live_in_their_letter_only() {
        let mut registry = registry();
        for name in ["anna", "Bob", "cleo", "Zed", "amy"] {
            registry.add(name).unwrap();
        }
        for (letter, bucket) in &registry.by_letter {
            for entry in bucket {
                assert_eq!(entry.letter(), *letter);
                assert_eq!(Some(entry.letter()), letter_of(entry.text()));
            }
        }
        assert_eq!(registry.bucket('A').len(), 2);
        assert_eq!(registry.letter_counts().len(), 26);
    }

    #[test]
    fn test_remove_prunes_bucket_and_keys() {
        let mut registry = registry();
        registry.add("Bob").unwrap();
        assert!(registry.remove("BOB").unwrap());
        assert!(registry.lookup("bob").is_none());
        assert!(!registry.known_lower_keys.contains("bob"));
        assert!(registry.bucket('B').is_empty());
        assert!(registry.store().is_empty());

        // The name can be added again afterwards
        assert!(registry.add("bob").unwrap().is_some());
    }

    #[test]
    fn test_remove_unknown_name() {
        let mut registry = registry();
        assert!(!registry.remove("Bob").unwrap());
        assert!(!registry.remove("").unwrap());
    }

    #[test]
    fn test_assign_picks_first_unused_eligible() {
        let mut registry = registry();
        female(&mut registry, "Amy");
        female(&mut registry, "Anna");
        registry.attach_moniker("Amy", "m1").unwrap();

        let entry = registry.assign_name(0, Gender::Female, "m2").unwrap().unwrap();
        assert_eq!(entry.text(), "Anna");
        assert!(entry.has_moniker("m2"));

        assert!(registry.assign_name(0, Gender::Female, "m3").unwrap().is_none());
        assert!(registry.lookup("Anna").unwrap().use_count() == 1);
    }

    #[test]
    fn test_assign_respects_gender_and_letter() {
        let mut registry = registry();
        registry.add("Basil").unwrap();
        registry.set_gender("Basil", Gender::Male, true).unwrap();
        female(&mut registry, "Bryony");
        female(&mut registry, "Anna");

        let entry = registry.assign_name(53, Gender::Female, "m1").unwrap().unwrap();
        assert_eq!(entry.text(), "Bryony");
        let entry = registry.assign_name(1, Gender::Male, "m2").unwrap().unwrap();
        assert_eq!(entry.text(), "Basil");

        // No fallback to other letters
        assert!(registry.assign_name(2, Gender::Female, "m3").unwrap().is_none());
    }

    #[test]
    fn test_assign_persists_moniker() {
        let mut registry = registry();
        female(&mut registry, "Anna");
        registry.assign_name(26, Gender::Female, "m1").unwrap();

        let reloaded = NameRegistry::load(registry.store().clone()).unwrap();
        assert!(reloaded.lookup("anna").unwrap().has_moniker("m1"));
    }

    #[test]
    fn test_persistence_failure_keeps_memory_state() {
        let mut registry = registry();
        female(&mut registry, "Anna");
        registry.store_mut().set_fail_writes(true);

        let result = registry.assign_name(0, Gender::Female, "m1");
        assert!(matches!(result, Err(RegistryError::Persistence(_))));
        assert!(registry.lookup("Anna").unwrap().has_moniker("m1"));

        assert!(matches!(registry.add("Bob"), Err(RegistryError::Persistence(_))));
        assert!(registry.contains("bob"));
    }

    #[test]
    fn test_release_and_rename() {
        let mut registry = registry();
        female(&mut registry, "Anna");
        registry.attach_moniker("Anna", "m1").unwrap();

        let entry = registry.rename("m1", "Cleo", Gender::Female).unwrap();
        assert_eq!(entry.text(), "Cleo");
        assert!(entry.is_female());
        assert!(entry.has_moniker("m1"));
        assert_eq!(registry.lookup("Anna").unwrap().use_count(), 0);

        assert_eq!(registry.release_moniker("m1").unwrap(), 1);
        assert_eq!(registry.release_moniker("m1").unwrap(), 0);
    }

    #[test]
    fn test_rejected_rename_keeps_old_name() {
        let mut registry = registry();
        female(&mut registry, "Anna");
        registry.attach_moniker("Anna", "m1").unwrap();

        for bad in ["42", "   ", ""] {
            assert!(matches!(
                registry.rename("m1", bad, Gender::Female),
                Err(RegistryError::InvalidName(_))
            ));
            assert!(registry.lookup("Anna").unwrap().has_moniker("m1"));
        }
        assert_eq!(registry.name_held_by("m1").map(NameEntry::text), Some("Anna"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_name_held_by() {
        let mut registry = registry();
        female(&mut registry, "Anna");
        assert!(registry.name_held_by("m1").is_none());

        registry.assign_name(0, Gender::Female, "m1").unwrap();
        assert_eq!(registry.name_held_by("m1").map(NameEntry::text), Some("Anna"));
    }

    #[test]
    fn test_attach_moniker_once() {
        let mut registry = registry();
        registry.add("Anna").unwrap();
        assert!(registry.attach_moniker("anna", "m1").unwrap());
        assert!(!registry.attach_moniker("Anna", "m1").unwrap());
        assert!(!registry.attach_moniker("Nobody", "m1").unwrap());
    }

    #[test]
    fn test_letter_view_sorted_descending() {
        let mut registry = registry();
        for name in ["Amy", "Anna", "Abel"] {
            registry.add(name).unwrap();
        }
        let texts: Vec<_> = registry.letter_view('a').iter().map(|e| e.text()).collect();
        assert_eq!(texts, vec!["Anna", "Amy", "Abel"]);
        let stored: Vec<_> = registry.bucket('A').iter().map(|e| e.text()).collect();
        assert_eq!(stored, vec!["Amy", "Anna", "Abel"]);
    }

    #[test]
    fn test_load_skips_bad_records() {
        let documents = vec![
            Document::from_value("1", &NameRecord { name: "Anna".into(), letter: Some("A".into()), ..Default::default() }).unwrap(),
            Document::from_value("2", &NameRecord { name: "anna".into(), letter: Some("A".into()), ..Default::default() }).unwrap(),
            Document::from_value("3", &NameRecord { name: "Bob".into(), letter: None, ..Default::default() }).unwrap(),
            Document::from_value("4", &NameRecord { name: "cleo".into(), letter: Some("X".into()), ..Default::default() }).unwrap(),
        ];
        let registry = NameRegistry::load(MemoryStore::with_documents(documents)).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("ANNA").unwrap().id(), "1");
        assert!(registry.lookup("bob").is_none());
        assert_eq!(registry.lookup("Cleo").unwrap().letter(), 'C');
    }

    #[test]
    fn test_seed_only_flags_new_names() {
        let mut registry = registry();
        let seed = SeedNames {
            male: vec![vec!["Alex".into(), "Bram".into()]],
            female: vec![vec!["alex".into(), "Anna".into(), "".into()]],
        };
        assert_eq!(registry.seed(&seed).unwrap(), 3);

        let alex = registry.lookup("Alex").unwrap();
        assert!(alex.is_male());
        assert!(!alex.is_female());
        assert!(registry.lookup("Anna").unwrap().is_female());
    }

    #[test]
    fn test_initialize_seeds_once() {
        let seed = SeedNames::builtin();
        let mut settings = Settings::load(MemoryStore::new(), HashMap::new()).unwrap();

        let registry = NameRegistry::initialize(MemoryStore::new(), &mut settings, &seed).unwrap();
        assert_eq!(registry.len(), seed.len());
        assert!(settings.get_bool(IMPORTED_NAMES).unwrap());

        let mut store = registry.store().clone();
        let first = store.find_all().unwrap()[0].id.clone();
        store.remove(&first).unwrap();

        let again = NameRegistry::initialize(store, &mut settings, &seed).unwrap();
        assert_eq!(again.len(), seed.len() - 1);
    }

    #[test]
    fn test_snapshot_merge_round_trip() {
        let mut registry = registry();
        registry.seed(&SeedNames::builtin()).unwrap();
        registry.assign_name(0, Gender::Female, "m1").unwrap();
        registry.assign_name(3, Gender::Male, "m2").unwrap();

        let snapshot = registry.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: RegistrySnapshot = serde_json::from_str(&json).unwrap();

        let mut restored = NameRegistry::new(MemoryStore::new());
        assert_eq!(restored.merge(&parsed).unwrap(), registry.len());
        assert_eq!(restored.merge(&parsed).unwrap(), 0);

        for letter in 'A'..='Z' {
            let original: Vec<_> = registry.bucket(letter).iter().map(NameEntry::to_record).collect();
            let copy: Vec<_> = restored.bucket(letter).iter().map(NameEntry::to_record).collect();
            assert_eq!(original, copy);
        }
    }

    #[test]
    fn test_merge_skips_invalid_names() {
        let names = ["Anna", "7of9", "Bob"]
            .iter()
            .enumerate()
            .map(|(id, name)| SnapshotName {
                id: id.to_string(),
                record: NameRecord { name: name.to_string(), female: true, ..Default::default() },
            })
            .collect();
        let snapshot = RegistrySnapshot { exported_at: Utc::now(), names };

        let mut registry = registry();
        assert_eq!(registry.merge(&snapshot).unwrap(), 2);
        assert!(registry.contains("Anna"));
        assert!(registry.contains("Bob"));
        assert!(!registry.contains("7of9"));
        assert_eq!(registry.store().len(), 2);
    }
}
