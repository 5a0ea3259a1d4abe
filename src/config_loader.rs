use crate::config::Config;
use crate::registry::SeedNames;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// Load the configuration file if one was given, defaults otherwise
pub fn load_or_default(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => load_config(path),
        None => {
            info!("No configuration file given, using defaults");
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Load seed names from a YAML file, or the built-in lists when no path is set
pub fn load_seed_names(seed_path: Option<&Path>) -> Result<SeedNames> {
    let Some(path) = seed_path else {
        return Ok(SeedNames::builtin());
    };

    info!("Loading seed names from: {:?}", path);
    let file = File::open(path)
        .wrap_err_with(|| format!("Failed to open seed names '{}'", path.display()))?;
    let seed: SeedNames = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse seed names '{}'", path.display()))?;

    info!("Loaded {} seed names", seed.len());
    Ok(seed)
}
