use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::backend::{BackendRegistry, CommandBackend, CommandConfig};
use crate::models::BackendId;
use crate::orchestrator::DEFAULT_STRATEGY;

/// Root configuration structure, deserialized from `.docroute/config.toml`.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Chunking strategy used when `--strategy` is not given.
    #[serde(default = "default_strategy")]
    pub default_strategy: String,
    /// Per-backend executable overrides, keyed by identity (`xml`, `data`, ...).
    #[serde(default)]
    pub backends: HashMap<BackendId, CommandConfig>,
}

fn default_strategy() -> String {
    DEFAULT_STRATEGY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_strategy: default_strategy(),
            backends: HashMap::new(),
        }
    }
}

impl Config {
    /// Registry with a command provider for every identity.
    ///
    /// Identities without an override resolve their activation target on `PATH`.
    pub fn build_registry(&self) -> BackendRegistry {
        let registry = BackendRegistry::new();
        for backend in BackendId::ALL {
            let command = self.backends.get(&backend).cloned().unwrap_or_default();
            let factory = CommandBackend::provider(backend, command);
            registry.register(backend, move || factory());
        }
        registry
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<base>/.docroute/config.toml`
/// 3. `~/.config/docroute/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(base: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = base.join(".docroute").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("docroute").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
}
