use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::category::{CategorySeed, default_categories};
use crate::core::filter::StatusFilter;
use crate::error::ConfigError;

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("cesta")
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Categories the list starts with.
    pub categories: Vec<CategorySeed>,
    /// Category for items added without one.
    pub default_category: String,
    pub default_filter: StatusFilter,
    pub debug_logging: bool,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            default_category: "Outros".into(),
            default_filter: StatusFilter::All,
            debug_logging: false,
        }
    }
}

impl ShopConfig {
    pub fn config_path() -> PathBuf {
        default_config_dir().join("config.json")
    }

    /// Read the config at `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Load from the default location, falling back to defaults on any error.
    pub fn load() -> Self {
        Self::load_or_default(&Self::config_path())
    }

    /// Like [`Self::load_from`], but a broken file is logged and replaced by defaults.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            log::warn!("Ignoring config at {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}
