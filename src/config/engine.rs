use crate::error::EngineError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE: &str = "/comments";

/// Options recognized by the comment engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// URL prefix claimed by the engine.
    /// TOML: `comments.base`. Default: `/comments`.
    #[serde(default = "default_base")]
    pub base: String,

    /// SQLite target: a `sqlite:` URL or a plain file path (required).
    /// TOML: `comments.database`.
    #[serde(default)]
    pub database: String,

    /// TOML: `comments.name_required`. Default: `true`.
    #[serde(default = "default_true")]
    pub name_required: bool,

    /// TOML: `comments.email_required`. Default: `true`.
    #[serde(default = "default_true")]
    pub email_required: bool,

    /// New comments are visible immediately when set; otherwise stored hidden.
    /// TOML: `comments.auto_approve`. Default: `true`.
    #[serde(default = "default_true")]
    pub auto_approve: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base: default_base(),
            // No usable default. `validate()` enforces non-empty.
            database: String::new(),
            name_required: true,
            email_required: true,
            auto_approve: true,
        }
    }
}

impl EngineConfig {
    pub fn with_database(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Default::default()
        }
    }

    /// Checks required fields and normalizes `base` (leading `/`, no trailing `/`).
    pub fn validate(&mut self) -> Result<(), EngineError> {
        if self.database.trim().is_empty() {
            return Err(EngineError::Config(
                "comments.database must be set and non-empty".to_string(),
            ));
        }

        let base = self.base.trim();
        if !base.starts_with('/') {
            return Err(EngineError::Config(format!(
                "comments.base must start with '/': {base:?}"
            )));
        }
        let trimmed = base.trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(EngineError::Config(
                "comments.base cannot be the site root".to_string(),
            ));
        }
        self.base = trimmed.to_string();
        Ok(())
    }
}

fn default_base() -> String {
    DEFAULT_BASE.to_string()
}

fn default_true() -> bool {
    true
}
