//! Local JSON persistence for the collection, with a single backup slot

use crate::collection::Collection;
use crate::error::{Error, Result};
use crate::record::MovieRecord;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const BACKUP_VERSION: &str = "1.0";

/// A snapshot of the collection written by [`Store::create_backup`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
    /// When the backup was taken
    pub timestamp: DateTime<Utc>,
    pub version: String,
    #[serde(default)]
    pub movies: Vec<MovieRecord>,
}

/// File-backed storage for one collection
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    backup_path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>, backup_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_path: backup_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Load the collection, or an empty one if nothing was saved yet
    pub fn load(&self) -> Result<Collection> {
        if !self.path.exists() {
            info!("no collection at {}, starting empty", self.path.display());
            return Ok(Collection::new());
        }

        let collection: Collection = read_json(&self.path)?;
        info!("loaded {} movies from {}", collection.len(), self.path.display());
        Ok(collection)
    }

    /// Save the collection
    pub fn save(&self, collection: &Collection) -> Result<()> {
        write_json(&self.path, collection)?;
        info!("saved {} movies to {}", collection.len(), self.path.display());
        Ok(())
    }

    /// Write a timestamped backup of the collection
    pub fn create_backup(&self, collection: &Collection) -> Result<Backup> {
        let backup = Backup {
            timestamp: Utc::now(),
            version: BACKUP_VERSION.to_string(),
            movies: collection.records().to_vec(),
        };
        write_json(&self.backup_path, &backup)?;
        info!("backup of {} movies written to {}", collection.len(), self.backup_path.display());
        Ok(backup)
    }

    /// Replace the stored collection with the backup
    pub fn restore_backup(&self) -> Result<Collection> {
        if !self.backup_path.exists() {
            return Err(Error::NoBackup(self.backup_path.clone()));
        }

        let backup: Backup = read_json(&self.backup_path)?;
        let collection = Collection::from_records(backup.movies);
        self.save(&collection)?;
        info!("restored backup from {}", backup.timestamp);
        Ok(collection)
    }

    /// Delete the stored collection; the backup is kept
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        info!("cleared {}", self.path.display());
        Ok(())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(Error::Json)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    Ok(())
}
