// Configuration loaded from YAML

use crate::catalog::PRODUCTS_FILE;
use crate::dashboard::RECENT_ORDERS_FILE;
use crate::pagination::DEFAULT_SIBLING_COUNT;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings shared by the CLI commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the JSON documents
    pub data_dir: PathBuf,
    /// Product catalog document
    pub products_file: String,
    /// Recent orders document
    pub orders_file: String,
    /// Rows per page
    pub page_size: usize,
    /// Pages shown on each side of the current page in the pager
    pub sibling_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            products_file: PRODUCTS_FILE.to_string(),
            orders_file: RECENT_ORDERS_FILE.to_string(),
            page_size: 10,
            sibling_count: DEFAULT_SIBLING_COUNT,
        }
    }
}

impl Config {
    /// Load from an explicit file, else the user config file, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse a YAML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).wrap_err_with(|| format!("Failed to parse config file {}", path.display()))?;
        debug!(path = ?path, ?config, "Loaded config");
        Ok(config)
    }

    /// `<config dir>/catalogstore/config.yml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("catalogstore").join("config.yml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.products_file, "Products.json");
        assert_eq!(config.orders_file, "recentOrders.json");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.sibling_count, 1);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "data_dir: /srv/shop\npage_size: 25\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/shop"));
        assert_eq!(config.page_size, 25);
        assert_eq!(config.products_file, "Products.json");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = Config::load(Some(&temp.path().join("nope.yml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "page_size: [not, a, number]\n").unwrap();

        assert!(Config::from_file(&path).is_err());
    }
}
