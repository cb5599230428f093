//! Collection statistics

use crate::collection::Collection;
use crate::record::MovieRecord;
use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;

const RECENT_LIMIT: usize = 5;

/// Summary counts for a collection
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionStats {
    pub total: usize,
    pub by_genre: BTreeMap<String, usize>,
    pub by_year: BTreeMap<String, usize>,
    pub by_format: BTreeMap<String, usize>,
    /// Most recently added movies, newest first
    pub recently_added: Vec<MovieRecord>,
}

impl CollectionStats {
    pub fn compute(collection: &Collection) -> Self {
        let mut stats = CollectionStats {
            total: collection.len(),
            ..Self::default()
        };

        for movie in collection {
            if !movie.genre.is_empty() {
                *stats.by_genre.entry(movie.genre.clone()).or_default() += 1;
            }
            if !movie.year.is_empty() {
                *stats.by_year.entry(movie.year.clone()).or_default() += 1;
            }
            for format in movie.format_list() {
                *stats.by_format.entry(format.to_string()).or_default() += 1;
            }
        }

        // Stable sort: ties and undated records keep collection order
        let mut recent: Vec<&MovieRecord> = collection.iter().collect();
        recent.sort_by_key(|m| Reverse(parse_added_date(&m.date_added)));
        stats.recently_added = recent.into_iter().take(RECENT_LIMIT).cloned().collect();

        stats
    }
}

/// Parse the date formats `date_added` shows up in
///
/// ISO dates, RFC 3339 timestamps from older exports, and US locale
/// dates typed into spreadsheets.
fn parse_added_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.date_naive());
    }
    ["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}
