mod basic;
mod engine;

pub use basic::BasicConfig;
pub use engine::{DEFAULT_BASE, EngineConfig};

use crate::error::EngineError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener and logging settings for the bundled binary (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Comment engine settings (see `comments` table in config.toml).
    #[serde(default)]
    pub comments: EngineConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "COMMENTENGINE_";

impl Config {
    /// Builds a Figment that merges defaults, `config.toml` if present, then
    /// `COMMENTENGINE_*` environment variables (`__` separates nested keys).
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extracts and validates the layered configuration.
    pub fn load() -> Result<Self, EngineError> {
        Self::from_figment(&Self::figment())
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, EngineError> {
        let mut cfg: Self = figment
            .extract()
            .map_err(|e| EngineError::Config(format!("failed to extract configuration: {e}")))?;
        cfg.comments.validate()?;
        Ok(cfg)
    }
}
