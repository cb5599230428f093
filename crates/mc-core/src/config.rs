//! TOML configuration
//!
//! ```toml
//! [storage]
//! path = "movies.json"
//! backup_path = "movies.backup.json"
//!
//! [export]
//! columns = ["Title", "Year", "Formats", "UPC"]
//!
//! [add]
//! date_format = "%m/%d/%Y"
//! ```

use crate::error::{Error, Result};
use crate::record::Field;
use crate::store::Store;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub add: AddConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    #[serde(default = "default_backup_path")]
    pub backup_path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("movie-collection.json")
}
fn default_backup_path() -> PathBuf {
    PathBuf::from("movie-collection.backup.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            backup_path: default_backup_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExportConfig {
    /// Column headers to export; empty means every field
    #[serde(default)]
    pub columns: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AddConfig {
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for AddConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
        }
    }
}

impl Config {
    /// Load a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            source: e,
        })?;

        // Fail early on typos rather than at export time
        config.export_columns()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolve export column names to fields, defaulting to all of them
    pub fn export_columns(&self) -> Result<Vec<Field>> {
        if self.export.columns.is_empty() {
            return Ok(Field::ALL.to_vec());
        }
        self.export
            .columns
            .iter()
            .map(|name| Field::from_header(name).ok_or_else(|| Error::UnknownColumn(name.clone())))
            .collect()
    }

    pub fn store(&self) -> Store {
        Store::new(&self.storage.path, &self.storage.backup_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::load_or_default(None).unwrap();

        assert_eq!(config.storage.path, PathBuf::from("movie-collection.json"));
        assert_eq!(config.add.date_format, "%Y-%m-%d");
        assert_eq!(config.export_columns().unwrap(), Field::ALL.to_vec());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        fs::write(
            &path,
            "[storage]\npath = \"/tmp/m.json\"\n\n[export]\ncolumns = [\"title\", \"Movie Year\", \"upc\"]\n",
        )
        .unwrap();

        // "Movie Year" is not a known header
        assert!(matches!(Config::load(&path), Err(Error::UnknownColumn(c)) if c == "Movie Year"));

        fs::write(
            &path,
            "[storage]\npath = \"/tmp/m.json\"\n\n[export]\ncolumns = [\"title\", \"Release Year\", \"upc\"]\n",
        )
        .unwrap();
        let config = Config::load(&path).unwrap();

        assert_eq!(config.storage.path, PathBuf::from("/tmp/m.json"));
        assert_eq!(config.storage.backup_path, PathBuf::from("movie-collection.backup.json"));
        assert_eq!(
            config.export_columns().unwrap(),
            vec![Field::Title, Field::Year, Field::Upc]
        );
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[storage\npath = 1").unwrap();

        assert!(matches!(Config::load(&path), Err(Error::Config { .. })));
    }
}
