use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::fs;
use std::path::PathBuf;

use albian_names::config_loader;
use albian_names::host::SnapshotHost;
use albian_names::registry::{Gender, NameEntry, RegistrySnapshot};
use albian_names::session::Session;

/// Creature name registry for the companion panel
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory, overriding the configuration
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add one or more names
    Add { names: Vec<String> },

    /// Remove one or more names
    Remove { names: Vec<String> },

    /// Show a single name
    Lookup { name: String },

    /// List names per letter
    List {
        /// Only this letter
        letter: Option<char>,
    },

    /// Assign the next available name to a creature
    Assign {
        #[arg(long)]
        generation: u32,

        #[arg(long)]
        gender: Gender,

        #[arg(long)]
        moniker: String,
    },

    /// Set or clear a name's gender eligibility
    Gender {
        name: String,

        #[arg(long)]
        gender: Gender,

        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        eligible: bool,
    },

    /// Detach a creature from every name it bears
    Release { moniker: String },

    /// Move a creature to another name, adding the name when unknown
    Rename {
        moniker: String,

        name: String,

        /// Gender the name becomes eligible for when it is added
        #[arg(long)]
        gender: Gender,
    },

    /// Reconcile a creature snapshot file with the registry
    Sync {
        /// YAML or JSON creature snapshot
        creatures: PathBuf,

        /// Number of updates to run
        #[arg(long, default_value_t = 1)]
        updates: u64,
    },

    /// Export every name to a JSON file
    Export { output: PathBuf },

    /// Import names from an exported JSON file
    Import { input: PathBuf },

    /// Rewrite the data files without superseded records
    Compact,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    let mut config = config_loader::load_or_default(args.config.as_deref())?;
    if let Some(data_dir) = args.data_dir {
        config.general.data_dir = data_dir;
    }

    let default_filter = config.general.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Data directory: {:?}", config.general.data_dir);

    let mut session = Session::open(&config)?;

    match args.command {
        Command::Add { names } => {
            for name in &names {
                match session.registry.add(name)? {
                    Some(entry) => println!("Added {}", entry.text()),
                    None => warn!("Name '{}' already exists", name.trim()),
                }
            }
        }
        Command::Remove { names } => {
            for name in &names {
                if session.registry.remove(name)? {
                    println!("Removed {}", name.trim());
                } else {
                    warn!("Name '{}' not found", name.trim());
                }
            }
        }
        Command::Lookup { name } => match session.registry.lookup(&name) {
            Some(entry) => println!("{}", describe(entry)),
            None => return Err(eyre!("Name '{}' not found", name.trim())),
        },
        Command::List { letter } => {
            let letters: Vec<char> = match letter {
                Some(letter) => vec![letter.to_ascii_uppercase()],
                None => ('A'..='Z').collect(),
            };
            for letter in letters {
                let entries = session.registry.letter_view(letter);
                println!("{} ({})", letter, entries.len());
                for entry in entries {
                    println!("  {}", describe(entry));
                }
            }
        }
        Command::Assign {
            generation,
            gender,
            moniker,
        } => match session.registry.assign_name(generation, gender, &moniker)? {
            Some(entry) => println!("{} -> {}", moniker, entry.text()),
            None => warn!("Found no name for {}", moniker),
        },
        Command::Gender {
            name,
            gender,
            eligible,
        } => {
            if !session.registry.set_gender(&name, gender, eligible)? {
                return Err(eyre!("Name '{}' not found", name.trim()));
            }
            println!("{}: {} = {}", name.trim(), gender, eligible);
        }
        Command::Release { moniker } => {
            let released = session.registry.release_moniker(&moniker)?;
            if released == 0 {
                warn!("{} bears no registered name", moniker);
            } else {
                println!("Released {} from {} name(s)", moniker, released);
            }
        }
        Command::Rename { moniker, name, gender } => {
            let entry = session.registry.rename(&moniker, &name, gender)?;
            println!("{} -> {}", moniker, entry.text());
        }
        Command::Sync { creatures, updates } => {
            let mut host = SnapshotHost::open(&creatures)?;
            for _ in 0..updates {
                let report = session.update(&mut host)?;
                println!("{:?}", report);
            }
            host.save()?;
            info!("Applied {} names to {:?}", host.names_applied(), creatures);
        }
        Command::Export { output } => {
            let snapshot = session.registry.snapshot();
            let json = serde_json::to_string_pretty(&snapshot)?;
            fs::write(&output, json)
                .wrap_err_with(|| format!("Failed to write export '{}'", output.display()))?;
            println!("Exported {} names to {}", snapshot.names.len(), output.display());
        }
        Command::Import { input } => {
            let content = fs::read_to_string(&input)
                .wrap_err_with(|| format!("Failed to read export '{}'", input.display()))?;
            let snapshot: RegistrySnapshot = serde_json::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse export '{}'", input.display()))?;
            let added = session.registry.merge(&snapshot)?;
            println!("Imported {} of {} names", added, snapshot.names.len());
        }
        Command::Compact => {
            session.compact()?;
        }
    }

    session.close()?;
    Ok(())
}

fn describe(entry: &NameEntry) -> String {
    let genders = match (entry.is_male(), entry.is_female()) {
        (true, true) => "male/female",
        (true, false) => "male",
        (false, true) => "female",
        (false, false) => "-",
    };
    let monikers: Vec<&str> = entry.monikers().iter().map(String::as_str).collect();
    format!(
        "{:<16} {:<12} uses: {} {}",
        entry.text(),
        genders,
        entry.use_count(),
        monikers.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(&[
            "albian-names",
            "--config", "names.yaml",
            "assign",
            "--generation", "53",
            "--gender", "female",
            "--moniker", "001-kyra",
        ]);

        assert_eq!(args.config, Some(PathBuf::from("names.yaml")));
        match args.command {
            Command::Assign { generation, gender, moniker } => {
                assert_eq!(generation, 53);
                assert_eq!(gender, Gender::Female);
                assert_eq!(moniker, "001-kyra");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_gender_args() {
        let args = Args::parse_from(&[
            "albian-names",
            "gender", "Anna",
            "--gender", "male",
            "--eligible", "false",
        ]);

        match args.command {
            Command::Gender { name, gender, eligible } => {
                assert_eq!(name, "Anna");
                assert_eq!(gender, Gender::Male);
                assert!(!eligible);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rename_args() {
        let args = Args::parse_from(&["albian-names", "rename", "001-kyra", "Ottoline", "--gender", "f"]);
        match args.command {
            Command::Rename { moniker, name, gender } => {
                assert_eq!(moniker, "001-kyra");
                assert_eq!(name, "Ottoline");
                assert_eq!(gender, Gender::Female);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let args = Args::parse_from(&["albian-names", "release", "001-kyra"]);
        assert!(matches!(args.command, Command::Release { moniker } if moniker == "001-kyra"));
    }

    #[test]
    fn test_list_letter() {
        let args = Args::parse_from(&["albian-names", "-d", "/tmp/names", "list", "b"]);
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/names")));
        assert!(matches!(args.command, Command::List { letter: Some('b') }));
    }
}
