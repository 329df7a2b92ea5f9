//! Registry crate for loading clic apps and binding them to a CLI.
//!
//! This crate reads spec files and directories into validated apps, locates
//! the engine configuration, and renders an app as a clap command tree whose
//! matches resolve into provider invocations.

pub mod clap_builder;
pub mod config;
pub mod loader;

pub use clap_builder::{ArgMatchesSource, DispatchError, PreparedCommand, build_clap, prepare_from_matches};
pub use config::{CONFIG_PATH_ENV, ConfigError, EngineConfig, default_config_path};
pub use loader::{LoadError, load_app, load_app_from_bytes, spec_files_in};
