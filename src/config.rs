//! CLI configuration.
//!
//! ```toml
//! # thingsql.toml
//! schemas = ["schema/things.json"]
//! default_count = 20
//! ```
//!
//! Looked up in order: an explicit path, `./thingsql.toml`, then
//! `<config dir>/thingsql/config.toml`. No file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ThingError, ThingResult};
use crate::registry::SchemaStore;

pub const LOCAL_CONFIG_FILE: &str = "thingsql.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Schema documents registered at startup.
    pub schemas: Vec<PathBuf>,
    /// Page size for `select` when none is given; 0 disables pagination.
    pub default_count: u32,
}

impl Config {
    pub fn from_toml(content: &str) -> ThingResult<Self> {
        toml::from_str(content).map_err(|e| ThingError::Config(e.to_string()))
    }

    /// Load configuration from `explicit`, or the first default location
    /// that exists.
    pub fn load(explicit: Option<&Path>) -> ThingResult<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        for path in Self::default_paths() {
            if path.is_file() {
                return Self::load_file(&path);
            }
        }

        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("thingsql").join("config.toml"));
        }
        paths
    }

    fn load_file(path: &Path) -> ThingResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ThingError::Config(format!("{}: {}", path.display(), e)))?;
        let mut config = Self::from_toml(&content)?;

        // Schema paths are relative to the config file.
        if let Some(base) = path.parent() {
            for schema in &mut config.schemas {
                if schema.is_relative() {
                    *schema = base.join(&*schema);
                }
            }
        }

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Build a schema store from every configured schema document.
    pub fn schema_store(&self) -> ThingResult<SchemaStore> {
        let mut store = SchemaStore::new();
        for path in &self.schemas {
            store.load_file(path)?;
        }
        Ok(store)
    }
}
