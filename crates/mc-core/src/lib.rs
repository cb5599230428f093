//! mc-core: Core library for a personal movie collection
//!
//! This library provides functionality to:
//! - Normalize loosely keyed movie data (CSV headers, remote sheet keys)
//! - Parse and write CSV and JSON movie lists
//! - Detect duplicates by UPC, title+year, or title
//! - Merge imported or synced batches into a collection
//! - Persist the collection locally with a backup slot

pub mod codec;
pub mod collection;
pub mod config;
pub mod error;
pub mod import;
pub mod normalize;
pub mod reconciler;
pub mod record;
pub mod stats;
pub mod store;
pub mod table;

pub use codec::{parse_csv, parse_csv_str, to_csv_string, write_csv};
pub use collection::{Collection, Filter, MergeSummary};
pub use config::Config;
pub use error::{Error, Result};
pub use import::{parse_json_str, read_records, scan_import_dir, to_json_string, ImportFormat};
pub use reconciler::{
    add_movie, check_duplicate, find_movie, merge_collections, remove_movie, update_movie,
    AddOptions, AddOutcome, MatchReason, MergeResult, Outcome, PossibleDuplicate,
};
pub use record::{Field, MovieRecord};
pub use stats::CollectionStats;
pub use store::{Backup, Store};
pub use table::{Column, Row, Table};
