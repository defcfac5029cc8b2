//! Helpers shared by the dlookup crates: flag-name derivation, targets-file
//! parsing, configuration persistence, and path expansion.

pub mod config;
pub mod flag_name;
pub mod path_processing;
pub mod targets;

pub use config::{AppConfig, ConfigError, Keybindings, ReportSettings, WatchSettings};
pub use flag_name::derive_flag_name;
pub use path_processing::expand_tilde;
pub use targets::{TargetsError, parse_targets, read_targets_file};
