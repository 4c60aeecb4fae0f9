//! Configuration merge system
//!
//! Settings come from three layers, later layers winning:
//! 1. Built-in defaults
//! 2. Project config file (`distcheck.toml`, or `--config PATH`)
//! 3. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::BuiltinDefaults;
pub use effective::{CheckSettings, ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig};
pub use merge::{deep_merge, merge_layers};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "distcheck.toml";
