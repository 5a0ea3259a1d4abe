//! Name entries and their persisted shape.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Creature gender, used for name eligibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(format!("Unknown gender '{}', expected 'male' or 'female'", other)),
        }
    }
}

/// Partition letter for a name: its first character, uppercased.
///
/// Only ASCII letters have a bucket; anything else yields `None`.
pub fn letter_of(text: &str) -> Option<char> {
    let first = text.trim().chars().next()?;
    if first.is_ascii_alphabetic() {
        Some(first.to_ascii_uppercase())
    } else {
        None
    }
}

/// Case-insensitive deduplication key
pub fn lowercase_key(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Target letter for a creature of the given generation
pub fn letter_for_generation(generation: u32) -> char {
    char::from(b'A' + (generation % 26) as u8)
}

/// A known name together with its eligibility flags and current bearers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    id: String,
    text: String,
    letter: char,
    lowercase_key: String,
    male: bool,
    female: bool,
    monikers: BTreeSet<String>,
}

impl NameEntry {
    /// Build a fresh entry; `None` if the text has no letter bucket
    pub(crate) fn new(id: impl Into<String>, text: &str) -> Option<Self> {
        let text = text.trim();
        let letter = letter_of(text)?;
        Some(Self {
            id: id.into(),
            text: text.to_string(),
            letter,
            lowercase_key: lowercase_key(text),
            male: false,
            female: false,
            monikers: BTreeSet::new(),
        })
    }

    /// Storage id of the backing record
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display text, in its original casing
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn letter(&self) -> char {
        self.letter
    }

    pub fn lowercase_key(&self) -> &str {
        &self.lowercase_key
    }

    pub fn is_male(&self) -> bool {
        self.male
    }

    pub fn is_female(&self) -> bool {
        self.female
    }

    /// Whether the name may be given to a creature of `gender`
    pub fn is_eligible(&self, gender: Gender) -> bool {
        match gender {
            Gender::Male => self.male,
            Gender::Female => self.female,
        }
    }

    /// Eligible for `gender` and not borne by any creature
    pub fn is_available(&self, gender: Gender) -> bool {
        self.use_count() == 0 && self.is_eligible(gender)
    }

    pub fn monikers(&self) -> &BTreeSet<String> {
        &self.monikers
    }

    pub fn use_count(&self) -> usize {
        self.monikers.len()
    }

    pub fn has_moniker(&self, moniker: &str) -> bool {
        self.monikers.contains(moniker)
    }

    /// Returns whether the flag changed
    pub(crate) fn set_eligible(&mut self, gender: Gender, eligible: bool) -> bool {
        let flag = match gender {
            Gender::Male => &mut self.male,
            Gender::Female => &mut self.female,
        };
        let changed = *flag != eligible;
        *flag = eligible;
        changed
    }

    pub(crate) fn attach(&mut self, moniker: &str) -> bool {
        self.monikers.insert(moniker.to_string())
    }

    pub(crate) fn detach(&mut self, moniker: &str) -> bool {
        self.monikers.remove(moniker)
    }

    pub(crate) fn to_record(&self) -> NameRecord {
        NameRecord {
            name: self.text.clone(),
            letter: Some(self.letter.to_string()),
            lowercase_key: Some(self.lowercase_key.clone()),
            male: self.male,
            female: self.female,
            monikers: self.monikers.iter().cloned().collect(),
        }
    }

    /// Rebuild an entry from a stored record, re-deriving the letter and key
    /// from the text. Flags and monikers are taken as stored.
    pub(crate) fn from_record(id: impl Into<String>, record: &NameRecord) -> Option<Self> {
        let mut entry = Self::new(id, &record.name)?;
        entry.male = record.male;
        entry.female = record.female;
        entry.monikers = record
            .monikers
            .iter()
            .filter(|moniker| !moniker.is_empty())
            .cloned()
            .collect();
        Some(entry)
    }
}

/// Persisted shape of a name (the storage id lives outside the fields)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowercase_key: Option<String>,
    #[serde(default)]
    pub male: bool,
    #[serde(default)]
    pub female: bool,
    #[serde(default)]
    pub monikers: Vec<String>,
}

impl NameRecord {
    /// Stored letter, if the record carries a non-empty one
    pub fn stored_letter(&self) -> Option<char> {
        self.letter
            .as_deref()
            .and_then(|letter| letter.trim().chars().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_of() {
        assert_eq!(letter_of("anna"), Some('A'));
        assert_eq!(letter_of("  Zed "), Some('Z'));
        assert_eq!(letter_of(""), None);
        assert_eq!(letter_of("   "), None);
        assert_eq!(letter_of("42nd"), None);
        assert_eq!(letter_of("Émile"), None);
    }

    #[test]
    fn test_letter_for_generation() {
        assert_eq!(letter_for_generation(0), 'A');
        assert_eq!(letter_for_generation(25), 'Z');
        assert_eq!(letter_for_generation(52), 'A');
        assert_eq!(letter_for_generation(53), 'B');
    }

    #[test]
    fn test_gender_parsing() {
        assert_eq!("Female".parse::<Gender>(), Ok(Gender::Female));
        assert_eq!("m".parse::<Gender>(), Ok(Gender::Male));
        assert!("norn".parse::<Gender>().is_err());
        assert_eq!(Gender::Male.to_string(), "male");
    }

    #[test]
    fn test_entry_availability() {
        let mut entry = NameEntry::new("id", " Anna ").unwrap();
        assert_eq!(entry.text(), "Anna");
        assert_eq!(entry.lowercase_key(), "anna");
        assert!(!entry.is_available(Gender::Female));

        assert!(entry.set_eligible(Gender::Female, true));
        assert!(!entry.set_eligible(Gender::Female, true));
        assert!(entry.is_available(Gender::Female));
        assert!(!entry.is_available(Gender::Male));

        assert!(entry.attach("m1"));
        assert!(!entry.attach("m1"));
        assert_eq!(entry.use_count(), 1);
        assert!(!entry.is_available(Gender::Female));
    }

    #[test]
    fn test_record_rebuilds_letter_from_text() {
        let record = NameRecord {
            name: "bob".to_string(),
            letter: Some("Q".to_string()),
            male: true,
            monikers: vec!["m1".to_string(), String::new()],
            ..Default::default()
        };
        let entry = NameEntry::from_record("id", &record).unwrap();
        assert_eq!(entry.letter(), 'B');
        assert!(entry.is_male());
        assert_eq!(entry.use_count(), 1);
        assert_eq!(record.stored_letter(), Some('Q'));
    }
}
