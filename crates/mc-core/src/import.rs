//! Import sources: JSON documents, format detection and directory scans

use crate::codec::parse_csv_str;
use crate::error::{Error, Result};
use crate::record::MovieRecord;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Format of an import/export document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Json,
}

impl ImportFormat {
    /// Parse a user-supplied format name ("csv" or "json")
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "csv" => Ok(ImportFormat::Csv),
            "json" => Ok(ImportFormat::Json),
            _ => Err(Error::UnknownFormat(name.to_string())),
        }
    }

    /// Detect the format from a file extension
    ///
    /// ".xls" exports are plain CSV and read as such.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_lowercase().as_str() {
            "xls" => Some(ImportFormat::Csv),
            _ => ImportFormat::from_name(ext).ok(),
        }
    }

    /// Guess the format of raw text: valid JSON is JSON, anything else CSV
    pub fn detect(content: &str) -> Self {
        if serde_json::from_str::<Value>(content).is_ok() {
            ImportFormat::Json
        } else {
            ImportFormat::Csv
        }
    }
}

/// Parse a JSON array of loosely keyed movie objects
///
/// Keys go through the same alias resolution as CSV headers, so a remote
/// sheet's `dateadded` lands in the same field as a local `dateAdded`.
/// Numbers are stringified and string arrays are comma-joined.
/// Elements without a title are dropped.
pub fn parse_json_str(content: &str) -> Result<Vec<MovieRecord>> {
    let value: Value = serde_json::from_str(content)?;
    let Value::Array(items) = value else {
        return Err(Error::NotAnArray);
    };

    let mut records = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match record_from_json(item) {
            Some(record) => records.push(record),
            None => debug!("skipping JSON element {} without a title", idx),
        }
    }

    Ok(records)
}

fn record_from_json(item: &Value) -> Option<MovieRecord> {
    let object = item.as_object()?;
    MovieRecord::from_pairs(
        object
            .iter()
            .map(|(key, value)| (key.as_str(), json_to_text(value))),
    )
}

fn json_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(json_to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Serialize records as a pretty-printed JSON array
pub fn to_json_string(records: &[MovieRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Parse text in a known format
pub fn parse_records(content: &str, format: ImportFormat) -> Result<Vec<MovieRecord>> {
    match format {
        ImportFormat::Csv => parse_csv_str(content),
        ImportFormat::Json => parse_json_str(content),
    }
}

/// Read an import file, picking the format from its extension or content
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<MovieRecord>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let format = ImportFormat::from_path(path).unwrap_or_else(|| ImportFormat::detect(&content));
    parse_records(&content, format)
}

/// Find every importable file under a directory, sorted by path
pub fn scan_import_dir<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root.as_ref()).follow_links(true) {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file() && ImportFormat::from_path(path).is_some() {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}
