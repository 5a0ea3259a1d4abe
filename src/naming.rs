//! Creature naming protocol.
//!
//! On every update the host's creature list is reconciled with the
//! registry:
//!
//! 1. A named creature has its name looked up (and added, eligible for the
//!    creature's gender, when unknown) and its moniker attached to it. A
//!    creature renamed in the game has its moniker moved to the new name.
//!    Names without a letter bucket are ignored.
//! 2. An unnamed creature that is in the world gets a name from the
//!    registry when the `name_creatures` setting is on. The registry picks
//!    the name and attaches the moniker; the host is then asked to apply it.
//!    A creature whose moniker already holds a name gets that name again
//!    instead of a second one.
//! 3. When `make_creatures_remember_their_name` is on, every
//!    `remember_every` updates each named creature has its own name
//!    re-applied.
//!
//! Failures to apply a name in the game are logged and do not stop the
//! update. Registry write failures are logged per creature and counted,
//! since the registry already holds the change that could not be stored.

use log::{debug, error, info, warn};

use crate::host::{Creature, Host, HostError};
use crate::registry::{letter_of, lowercase_key, NameRegistry, RegistryError};
use crate::settings::{Settings, NAME_CREATURES, REMEMBER_NAMES};
use crate::store::{DocumentStore, StoreError};

/// Errors that abort a whole update
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Failed to enumerate creatures: {0}")]
    Host(#[from] HostError),

    #[error("Failed to read naming settings: {0}")]
    Settings(#[from] StoreError),
}

/// What happened when a creature was offered a name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingOutcome {
    AlreadyNamed,
    Named(String),
    NoEligibleName,
}

/// Counts from one update
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub creatures: usize,
    pub named: usize,
    pub no_eligible_name: usize,
    pub names_added: usize,
    pub monikers_attached: usize,
    pub names_reapplied: usize,
    pub failures: usize,
}

/// Give an unnamed creature the next available registry name
pub fn name_creature<S, H>(
    host: &mut H,
    registry: &mut NameRegistry<S>,
    creature: &Creature,
) -> Result<NamingOutcome, RegistryError>
where
    S: DocumentStore,
    H: Host,
{
    if creature.has_name() {
        return Ok(NamingOutcome::AlreadyNamed);
    }

    // Assigned earlier but never applied in the game
    if let Some(held) = registry.name_held_by(&creature.moniker) {
        let name = held.text().to_string();
        debug!("{} already holds '{}'", creature.moniker, name);
        apply_name(host, &creature.moniker, &name);
        return Ok(NamingOutcome::Named(name));
    }

    let assigned = registry
        .assign_name(creature.generation, creature.gender, &creature.moniker)
        .map(|found| found.map(|entry| entry.text().to_string()));
    let name = match assigned {
        Ok(Some(name)) => name,
        Ok(None) => {
            warn!("Found no name for {}", creature.moniker);
            return Ok(NamingOutcome::NoEligibleName);
        }
        Err(e) => {
            // The registry kept the assignment, so the game has to match it
            if let Some(held) = registry.name_held_by(&creature.moniker) {
                let name = held.text().to_string();
                apply_name(host, &creature.moniker, &name);
            }
            return Err(e);
        }
    };

    apply_name(host, &creature.moniker, &name);
    Ok(NamingOutcome::Named(name))
}

fn apply_name<H: Host>(host: &mut H, moniker: &str, name: &str) {
    if let Err(e) = host.set_name(moniker, name) {
        error!("Error setting name {} on {}: {}", name, moniker, e);
    }
}

/// Periodic reconciliation between the host and the registry
#[derive(Debug, Clone)]
pub struct CreatureSync {
    update_count: u64,
    remember_every: u64,
}

impl CreatureSync {
    /// `remember_every` is the number of updates between name refreshes
    pub fn new(remember_every: u64) -> Self {
        Self {
            update_count: 0,
            remember_every: remember_every.max(1),
        }
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Run one update against the host
    pub fn update<H, S, T>(
        &mut self,
        host: &mut H,
        registry: &mut NameRegistry<S>,
        settings: &mut Settings<T>,
    ) -> Result<SyncReport, SyncError>
    where
        H: Host,
        S: DocumentStore,
        T: DocumentStore,
    {
        self.update_count += 1;

        let remember = settings.get_bool(REMEMBER_NAMES)?
            && self.update_count % self.remember_every == 0;
        let name_creatures = settings.get_bool(NAME_CREATURES)?;

        let creatures = host.creatures()?;
        let mut report = SyncReport {
            creatures: creatures.len(),
            ..Default::default()
        };

        for creature in &creatures {
            if remember {
                if let Some(name) = creature.name() {
                    match host.set_name(&creature.moniker, name) {
                        Ok(()) => report.names_reapplied += 1,
                        Err(e) => error!("Error re-applying name {} on {}: {}", name, creature.moniker, e),
                    }
                }
            }

            let result = match creature.name() {
                Some(name) => reconcile_named(registry, creature, name, &mut report),
                None if creature.in_world && name_creatures => {
                    name_creature(host, registry, creature).map(|outcome| match outcome {
                        NamingOutcome::Named(_) => report.named += 1,
                        NamingOutcome::NoEligibleName => report.no_eligible_name += 1,
                        NamingOutcome::AlreadyNamed => {}
                    })
                }
                None => Ok(()),
            };

            if let Err(e) = result {
                error!("Registry update for {} failed, registry and storage may disagree: {}", creature.moniker, e);
                report.failures += 1;
            }
        }

        info!(
            "Update {}: {} creatures, {} named, {} without a name available, {} failures",
            self.update_count, report.creatures, report.named, report.no_eligible_name, report.failures
        );
        Ok(report)
    }
}

/// Make the registry reflect a name the creature already bears
fn reconcile_named<S: DocumentStore>(
    registry: &mut NameRegistry<S>,
    creature: &Creature,
    name: &str,
    report: &mut SyncReport,
) -> Result<(), RegistryError> {
    if letter_of(name).is_none() {
        debug!("Name '{}' borne by {} has no letter bucket", name, creature.moniker);
        return Ok(());
    }

    // Renamed in the game since the registry last saw it
    let held = registry
        .name_held_by(&creature.moniker)
        .map(|entry| entry.lowercase_key().to_string());
    if held.is_some_and(|key| key != lowercase_key(name)) {
        let added = !registry.contains(name);
        registry.rename(&creature.moniker, name, creature.gender)?;
        debug!("{} was renamed to '{}'", creature.moniker, name);
        if added {
            report.names_added += 1;
        }
        report.monikers_attached += 1;
        return Ok(());
    }

    if !registry.contains(name) {
        registry.add(name)?;
        registry.set_gender(name, creature.gender, true)?;
        debug!("Added name '{}' borne by {}", name, creature.moniker);
        report.names_added += 1;
    }

    if registry.attach_moniker(name, &creature.moniker)? {
        report.monikers_attached += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Gender;
    use crate::store::MemoryStore;
    use std::collections::HashMap;

    struct FailingHost;

    impl Host for FailingHost {
        fn creatures(&mut self) -> Result<Vec<Creature>, HostError> {
            Err(HostError::Rejected("world not loaded".to_string()))
        }

        fn set_name(&mut self, _moniker: &str, _name: &str) -> Result<(), HostError> {
            Err(HostError::Rejected("world not loaded".to_string()))
        }
    }

    fn creature(moniker: &str, generation: u32, gender: Gender) -> Creature {
        Creature {
            moniker: moniker.to_string(),
            name: None,
            generation,
            gender,
            in_world: true,
        }
    }

    #[test]
    fn test_name_creature_survives_host_failure() {
        let mut registry = NameRegistry::new(MemoryStore::new());
        registry.add("Anna").unwrap();
        registry.set_gender("Anna", Gender::Female, true).unwrap();

        let outcome = name_creature(&mut FailingHost, &mut registry, &creature("m1", 0, Gender::Female)).unwrap();
        assert_eq!(outcome, NamingOutcome::Named("Anna".to_string()));
        assert!(registry.lookup("anna").unwrap().has_moniker("m1"));

        let outcome = name_creature(&mut FailingHost, &mut registry, &creature("m2", 0, Gender::Female)).unwrap();
        assert_eq!(outcome, NamingOutcome::NoEligibleName);
    }

    #[test]
    fn test_held_name_is_not_assigned_twice() {
        let mut registry = NameRegistry::new(MemoryStore::new());
        for name in ["Anna", "Amy"] {
            registry.add(name).unwrap();
            registry.set_gender(name, Gender::Female, true).unwrap();
        }
        registry.store_mut().set_fail_writes(true);

        let newborn = creature("m1", 0, Gender::Female);
        assert!(matches!(
            name_creature(&mut FailingHost, &mut registry, &newborn),
            Err(RegistryError::Persistence(_))
        ));

        let outcome = name_creature(&mut FailingHost, &mut registry, &newborn).unwrap();
        assert_eq!(outcome, NamingOutcome::Named("Anna".to_string()));
        assert_eq!(registry.lookup("Amy").unwrap().use_count(), 0);
    }

    #[test]
    fn test_named_creature_is_left_alone() {
        let mut registry = NameRegistry::new(MemoryStore::new());
        let mut named = creature("m1", 0, Gender::Male);
        named.name = Some("Abel".to_string());

        let outcome = name_creature(&mut FailingHost, &mut registry, &named).unwrap();
        assert_eq!(outcome, NamingOutcome::AlreadyNamed);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_update_propagates_enumeration_failure() {
        let mut registry = NameRegistry::new(MemoryStore::new());
        let mut settings = Settings::load(MemoryStore::new(), HashMap::new()).unwrap();
        let mut sync = CreatureSync::new(6);

        let result = sync.update(&mut FailingHost, &mut registry, &mut settings);
        assert!(matches!(result, Err(SyncError::Host(_))));
        assert_eq!(sync.update_count(), 1);
    }
}
