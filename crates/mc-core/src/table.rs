//! Raw CSV table types, before field resolution

use crate::record::{Field, MovieRecord};
use log::debug;
use serde::{Deserialize, Serialize};

/// A parsed CSV document: header columns plus positional rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Column definitions, from the header row
    pub columns: Vec<Column>,
    /// Row data, each padded or truncated to the column count
    pub rows: Vec<Row>,
    /// Where the text came from (file path or a label)
    pub source_name: String,
}

impl Table {
    /// Create a new empty table
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            source_name: source_name.into(),
        }
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Find a column by its raw header name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Map every row onto movie fields
    ///
    /// Rows without a resolvable title are left out.
    pub fn to_records(&self) -> Vec<MovieRecord> {
        let mut records = Vec::with_capacity(self.rows.len());

        for (row_idx, row) in self.rows.iter().enumerate() {
            let pairs = self
                .columns
                .iter()
                .map(|c| (c.name.as_str(), row.get(c.index).unwrap_or_default()));

            match MovieRecord::from_pairs(pairs) {
                Some(record) => records.push(record),
                None => debug!(
                    "{}: skipping row {} without a title",
                    self.source_name,
                    row_idx + 1
                ),
            }
        }

        records
    }
}

/// A column definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Header text as it appeared in the file
    pub name: String,
    /// Column index (0-based)
    pub index: usize,
    /// Movie field this header resolves to, if any
    pub field: Option<Field>,
}

impl Column {
    /// Create a new column, resolving its field from the header
    pub fn new(name: String, index: usize) -> Self {
        let field = Field::from_header(&name);
        Self { name, index, field }
    }
}

/// A row of string cells
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<String>,
}

impl Row {
    /// Create a new row
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Get a cell by column index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    /// True when every cell is empty
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }
}
