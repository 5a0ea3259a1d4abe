//! # Albian Names - creature name registry
//!
//! This library keeps the registry of creature names used by the companion
//! panel of a creature life-simulation game, and the protocol that hands
//! those names out to newborn creatures.
//!
//! ## Overview
//!
//! Names are partitioned into letter buckets `A`-`Z` and deduplicated
//! case-insensitively. Each name carries male/female eligibility flags and
//! the monikers of the creatures currently bearing it. A creature of
//! generation `g` is offered the first unused, gender-eligible name under
//! letter `'A' + g % 26`.
//!
//! All game-state changes go through the [`host::Host`] trait; the registry
//! only decides which name to use. Names and settings are persisted through
//! the [`store::DocumentStore`] trait.
//!
//! ## Architecture
//!
//! - `registry`: the name registry, its entries and the seed name lists
//! - `store`: document store interface, in-memory and JSON-lines backends
//! - `settings`: persisted settings with defaults
//! - `host`: host automation interface and a snapshot-file host
//! - `naming`: naming protocol and the per-update reconciliation loop
//! - `config` / `config_loader`: YAML configuration
//! - `session`: the owned registry and settings for one program run
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use albian_names::{config_loader, host::SnapshotHost, session::Session};
//! use std::path::Path;
//!
//! let config = config_loader::load_config(Path::new("albian.yaml"))?;
//! let mut session = Session::open(&config)?;
//!
//! let mut host = SnapshotHost::open("creatures.yaml")?;
//! let report = session.update(&mut host)?;
//! println!("named {} creatures", report.named);
//!
//! host.save()?;
//! session.close()?;
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Configuration Format
//!
//! ```yaml
//! general:
//!   data_dir: "~/.local/share/albian"
//!   log_level: info
//!
//! naming:
//!   name_creatures: true
//!   make_creatures_remember_their_name: false
//!   update_interval: "15s"
//!   remember_interval: "90s"
//!
//! seed:
//!   path: "names.yaml"   # optional, built-in lists otherwise
//! ```
//!
//! ## Error Handling
//!
//! Library modules return typed `thiserror` errors. Expected conditions
//! (duplicate names, unknown names, exhausted letter buckets) are plain
//! `Option`/`bool` results; only storage and host failures are errors.
//! The configuration loader, session and binary use `color_eyre`.

pub mod config;
pub mod config_loader;
pub mod host;
pub mod naming;
pub mod registry;
pub mod session;
pub mod settings;
pub mod store;
