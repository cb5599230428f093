//! CSV codec for movie records
//!
//! Reading goes text -> [`Table`] -> [`MovieRecord`]s; writing goes the
//! other way with canonical headers and minimal quoting.

use crate::error::{Error, Result};
use crate::record::{Field, MovieRecord};
use crate::table::{Column, Row, Table};
use log::debug;
use std::fs;
use std::path::Path;

/// Parse CSV text into a raw table
///
/// The first row is always the header. Quoted fields may contain commas,
/// newlines and doubled quotes. Short rows are padded with empty cells,
/// long rows are truncated to the header width, and blank rows are skipped.
pub fn parse_table_str(content: &str, source_name: &str) -> Result<Table> {
    let mut table = Table::new(source_name);

    if content.trim().is_empty() {
        return Ok(table);
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // ragged rows are padded/truncated below
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = csv_reader.headers().map_err(|e| Error::Csv {
        source_name: source_name.to_string(),
        source: e,
    })?;

    table.columns = headers
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.to_string(), i))
        .collect();

    let width = table.columns.len();

    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| Error::Csv {
            source_name: source_name.to_string(),
            source: e,
        })?;

        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();

        if cells.len() > width {
            debug!(
                "{}: row {} has {} cells for {} columns, truncating",
                source_name,
                row_idx + 1,
                cells.len(),
                width
            );
            cells.truncate(width);
        }
        cells.resize(width, String::new());

        let row = Row::new(cells);
        if row.is_blank() {
            continue;
        }
        table.rows.push(row);
    }

    Ok(table)
}

/// Parse CSV text into movie records
///
/// Empty input yields no records. Rows without a title are dropped.
pub fn parse_csv_str(content: &str) -> Result<Vec<MovieRecord>> {
    Ok(parse_table_str(content, "<text>")?.to_records())
}

/// Parse a CSV file into movie records
pub fn parse_csv<P: AsRef<Path>>(path: P) -> Result<Vec<MovieRecord>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let table = parse_table_str(&content, &path.display().to_string())?;
    Ok(table.to_records())
}

/// Serialize records as CSV with the given columns
///
/// Emits the canonical header row, then one line per record in order.
pub fn to_csv_string(records: &[MovieRecord], columns: &[Field]) -> String {
    let mut out = String::new();

    let header: Vec<&str> = columns.iter().map(|f| f.header()).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for record in records {
        let values: Vec<String> = columns
            .iter()
            .map(|&f| escape_csv(record.get(f)))
            .collect();
        out.push_str(&values.join(","));
        out.push('\n');
    }

    out
}

/// Write records to a CSV file
pub fn write_csv<P: AsRef<Path>>(path: P, records: &[MovieRecord], columns: &[Field]) -> Result<()> {
    fs::write(path, to_csv_string(records, columns))?;
    Ok(())
}

/// Escape a value for CSV output
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
