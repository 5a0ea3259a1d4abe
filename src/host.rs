//! Host automation collaborator.
//!
//! The game itself is reached through [`Host`]: it enumerates the creatures
//! currently known and applies names to them. The registry never renames a
//! creature on its own; the naming protocol asks the host to do it.
//!
//! [`SnapshotHost`] stands in for a live game. It reads the creature list
//! from a YAML (or JSON) file, applies names in memory and writes the list
//! back on [`SnapshotHost::save`].
//!
//! ```yaml
//! creatures:
//!   - moniker: "001-kyra-3fgh2"
//!     generation: 0
//!     gender: female
//!   - moniker: "002-bram-9kd0s"
//!     name: "Bram"
//!     generation: 1
//!     gender: male
//!     in_world: false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::registry::Gender;

/// Errors reported by the host
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Unknown creature {0}")]
    UnknownCreature(String),

    #[error("Host I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed creature snapshot {path}: {source}")]
    Malformed {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("Host rejected the request: {0}")]
    Rejected(String),
}

/// A creature as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub moniker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub generation: u32,
    pub gender: Gender,
    #[serde(default = "default_in_world")]
    pub in_world: bool,
}

impl Creature {
    /// Non-blank display name, if any
    pub fn name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn has_name(&self) -> bool {
        self.name().is_some()
    }
}

fn default_in_world() -> bool {
    true
}

/// Operations the naming protocol needs from the game
pub trait Host {
    /// Every creature the host currently knows about
    fn creatures(&mut self) -> Result<Vec<Creature>, HostError>;

    /// Give the creature `moniker` the display name `name`
    fn set_name(&mut self, moniker: &str, name: &str) -> Result<(), HostError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CreatureSnapshot {
    #[serde(default)]
    creatures: Vec<Creature>,
}

/// Host backed by a creature snapshot file
#[derive(Debug)]
pub struct SnapshotHost {
    path: PathBuf,
    creatures: Vec<Creature>,
    names_applied: usize,
}

impl SnapshotHost {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HostError> {
        let path = path.into();
        let content = fs::read_to_string(&path).map_err(|source| HostError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let snapshot: CreatureSnapshot =
            serde_yaml::from_str(&content).map_err(|source| HostError::Malformed {
                path: path.display().to_string(),
                source,
            })?;

        log::info!("Loaded {} creatures from {}", snapshot.creatures.len(), path.display());

        Ok(Self {
            path,
            creatures: snapshot.creatures,
            names_applied: 0,
        })
    }

    /// A host over an in-memory creature list, written to `path` on save
    pub fn with_creatures(path: impl Into<PathBuf>, creatures: Vec<Creature>) -> Self {
        Self {
            path: path.into(),
            creatures,
            names_applied: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn creature(&self, moniker: &str) -> Option<&Creature> {
        self.creatures.iter().find(|creature| creature.moniker == moniker)
    }

    /// Number of `set_name` calls served
    pub fn names_applied(&self) -> usize {
        self.names_applied
    }

    /// Write the creature list back to the snapshot file
    pub fn save(&self) -> Result<(), HostError> {
        let snapshot = CreatureSnapshot {
            creatures: self.creatures.clone(),
        };
        let content = serde_yaml::to_string(&snapshot).map_err(|source| HostError::Malformed {
            path: self.path.display().to_string(),
            source,
        })?;
        fs::write(&self.path, content).map_err(|source| HostError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }
}

impl Host for SnapshotHost {
    fn creatures(&mut self) -> Result<Vec<Creature>, HostError> {
        Ok(self.creatures.clone())
    }

    fn set_name(&mut self, moniker: &str, name: &str) -> Result<(), HostError> {
        let creature = self
            .creatures
            .iter_mut()
            .find(|creature| creature.moniker == moniker)
            .ok_or_else(|| HostError::UnknownCreature(moniker.to_string()))?;
        creature.name = Some(name.to_string());
        self.names_applied += 1;
        Ok(())
    }
}
