//! Engine limits and seeding.
//!
//! Loaded with the `config` crate: an optional TOML file, then `PUZZLANG_*`
//! environment variables on top. Missing keys fall back to the defaults.

use std::path::Path;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "PUZZLANG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Iterations one rule group may take before it counts as
    /// non-terminating.
    pub max_rule_iterations: usize,
    /// Tick turns a single `again` chain may run.
    pub max_again_turns: usize,
    /// Snapshots kept for `undo`.
    pub undo_depth: usize,
    /// Seed for `random` rules, `randomdir` and random spawns.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rule_iterations: 200,
            max_again_turns: 50,
            undo_depth: 100,
            seed: 0,
        }
    }
}

impl EngineConfig {
    /// Read `path` if it exists, then apply `PUZZLANG_*` overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }
        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        let engine: Self = config.try_deserialize()?;
        log::debug!("engine config: {engine:?}");
        Ok(engine)
    }

    /// Parse a TOML document. Environment variables are not consulted.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
