mod basic;
mod identity;
mod search;

pub use basic::BasicConfig;
pub use identity::IdentityConfig;
pub use search::SearchConfig;

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Which linked providers feed handles and commit-author lookups (see `identity` table).
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Candidate search tuning (see `search` table).
    #[serde(default)]
    pub search: SearchConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Builds a Figment that merges defaults and a config TOML file.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        }
    }

    /// Loads configuration by merging defaults and `config.toml` if present.
    ///
    /// Note: this does **not** validate values. Binaries should call `Config::from_toml()`.
    pub fn from_optional_toml() -> Self {
        Self::figment().extract().unwrap_or_else(|err| {
            panic!("failed to extract configuration (defaults + optional config.toml): {err}")
        })
    }

    /// Loads configuration (defaults + optional `config.toml`) and validates it.
    pub fn from_toml() -> Self {
        let cfg = Self::from_optional_toml();
        if let Err(msg) = cfg.validate() {
            panic!("invalid configuration: {msg}");
        }
        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.basic.database_url.trim().is_empty() {
            return Err("basic.database_url must be set and non-empty".to_string());
        }
        self.identity.validate()?;
        self.search.validate()
    }
}
