//! Application session: the explicitly owned registry and settings.
//!
//! A session is opened once at startup from the configuration and handed to
//! whatever needs the registry. Dropping it (or calling [`Session::close`])
//! ends the lifecycle; `close` also compacts both collections.

use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;

use crate::config::Config;
use crate::config_loader::load_seed_names;
use crate::host::Host;
use crate::naming::{CreatureSync, SyncReport};
use crate::registry::NameRegistry;
use crate::settings::Settings;
use crate::store::JsonFileStore;

/// File holding the name collection inside the data directory
pub const NAMES_FILE: &str = "names.db";

/// File holding the settings collection inside the data directory
pub const SETTINGS_FILE: &str = "settings.db";

/// Registry, settings and naming cadence backed by the data directory
pub struct Session {
    data_dir: PathBuf,
    pub registry: NameRegistry<JsonFileStore>,
    pub settings: Settings<JsonFileStore>,
    pub sync: CreatureSync,
}

impl Session {
    /// Open the data directory, load settings and names, and import the
    /// seed names on first run
    pub fn open(config: &Config) -> Result<Self> {
        let data_dir = config.general.data_dir.clone();
        fs::create_dir_all(&data_dir)
            .wrap_err_with(|| format!("Failed to create data directory '{}'", data_dir.display()))?;

        let settings_store = JsonFileStore::open(data_dir.join(SETTINGS_FILE))
            .wrap_err("Failed to open settings collection")?;
        let mut settings = Settings::load(settings_store, config.naming.setting_defaults())
            .wrap_err("Failed to load settings")?;

        let seed = load_seed_names(config.seed.path.as_deref())?;
        let names_store = JsonFileStore::open(data_dir.join(NAMES_FILE))
            .wrap_err("Failed to open name collection")?;
        let registry = NameRegistry::initialize(names_store, &mut settings, &seed)
            .wrap_err("Failed to initialize name registry")?;

        info!("Session ready with {} names in {:?}", registry.len(), data_dir);

        Ok(Self {
            data_dir,
            registry,
            settings,
            sync: CreatureSync::new(config.naming.remember_every()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Run one naming update against `host`
    pub fn update<H: Host>(&mut self, host: &mut H) -> Result<SyncReport> {
        let report = self
            .sync
            .update(host, &mut self.registry, &mut self.settings)
            .wrap_err("Creature update failed")?;
        Ok(report)
    }

    /// Rewrite both collections without superseded lines
    pub fn compact(&mut self) -> Result<()> {
        self.registry
            .store_mut()
            .compact()
            .wrap_err("Failed to compact name collection")?;
        self.settings
            .store_mut()
            .compact()
            .wrap_err("Failed to compact settings collection")?;
        Ok(())
    }

    /// End the session, compacting storage
    pub fn close(mut self) -> Result<()> {
        self.compact()?;
        info!("Session closed");
        Ok(())
    }
}
