//! Duplicate detection and collection merging
//!
//! Matching runs in strict priority order, each rule over the whole
//! collection before the next one is tried:
//! 1. UPC (digits only) - one physical release
//! 2. title + year - separates remakes and re-releases
//! 3. title alone - a *possible* duplicate, reported but never blocking

use crate::normalize::normalize_title;
use crate::record::{Field, MovieRecord};
use chrono::{Local, NaiveDate};
use log::{info, warn};
use std::fmt::{self, Write};

/// Why a candidate matched an existing record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchReason {
    /// Same normalized UPC
    Upc { upc: String },
    /// Same title and year
    TitleYear,
    /// Same title, year unknown or different
    Title,
}

impl MatchReason {
    /// Title-only matches are a weak signal and must be labelled "possible"
    pub fn is_possible(&self) -> bool {
        matches!(self, MatchReason::Title)
    }
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchReason::Upc { upc } => write!(f, "same UPC {}", upc),
            MatchReason::TitleYear => write!(f, "same title and year"),
            MatchReason::Title => write!(f, "same title"),
        }
    }
}

/// Result of checking a candidate against a collection
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<'a> {
    NotDuplicate,
    Duplicate {
        reason: MatchReason,
        /// Position of the matched record in the collection
        index: usize,
        matched: &'a MovieRecord,
    },
}

impl Outcome<'_> {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Outcome::Duplicate { .. })
    }

    /// Duplicate by UPC or title+year
    pub fn is_strong_duplicate(&self) -> bool {
        matches!(self, Outcome::Duplicate { reason, .. } if !reason.is_possible())
    }

    pub fn reason(&self) -> Option<&MatchReason> {
        match self {
            Outcome::NotDuplicate => None,
            Outcome::Duplicate { reason, .. } => Some(reason),
        }
    }

    /// Human-readable summary for the interaction layer
    pub fn describe(&self) -> String {
        match self {
            Outcome::NotDuplicate => "no duplicate found".to_string(),
            Outcome::Duplicate {
                reason: MatchReason::Upc { upc },
                matched,
                ..
            } => format!("duplicate of \"{}\" (same UPC {})", matched, upc),
            Outcome::Duplicate {
                reason: MatchReason::TitleYear,
                matched,
                ..
            } => format!("duplicate of \"{}\" (same title and year)", matched),
            Outcome::Duplicate {
                reason: MatchReason::Title,
                matched,
                ..
            } => format!("possible duplicate of \"{}\" (same title)", matched),
        }
    }
}

/// Classify a candidate against existing records
pub fn check_duplicate<'a>(candidate: &MovieRecord, existing: &'a [MovieRecord]) -> Outcome<'a> {
    let upc = candidate.normalized_upc();
    if !upc.is_empty() {
        if let Some(index) = existing.iter().position(|m| m.normalized_upc() == upc) {
            return Outcome::Duplicate {
                reason: MatchReason::Upc { upc },
                index,
                matched: &existing[index],
            };
        }
    }

    let title = candidate.normalized_title();
    if title.is_empty() {
        return Outcome::NotDuplicate;
    }

    let year = candidate.year.trim();
    if !year.is_empty() {
        if let Some(index) = existing
            .iter()
            .position(|m| m.year.trim() == year && m.normalized_title() == title)
        {
            return Outcome::Duplicate {
                reason: MatchReason::TitleYear,
                index,
                matched: &existing[index],
            };
        }
    }

    match existing.iter().position(|m| m.normalized_title() == title) {
        Some(index) => Outcome::Duplicate {
            reason: MatchReason::Title,
            index,
            matched: &existing[index],
        },
        None => Outcome::NotDuplicate,
    }
}

/// An incoming record appended despite sharing a title with a local one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PossibleDuplicate {
    /// Position of the record in the merged collection
    pub merged_index: usize,
    /// Title of the local record it resembles
    pub matched_title: String,
}

/// Result of merging an incoming batch into a local collection
#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    pub merged: Vec<MovieRecord>,
    pub added_count: usize,
    pub duplicate_count: usize,
    /// Appended records that only matched by title
    pub possible_duplicates: Vec<PossibleDuplicate>,
}

/// Merge incoming records into a local collection
///
/// Local records are kept as-is and in order. Each incoming record is
/// checked against the original `local` set only, so duplicates within the
/// incoming batch itself are all appended. UPC and title+year matches are
/// skipped; title-only matches are appended and listed as possible
/// duplicates.
pub fn merge_collections(local: &[MovieRecord], incoming: &[MovieRecord]) -> MergeResult {
    let mut result = MergeResult {
        merged: local.to_vec(),
        added_count: 0,
        duplicate_count: 0,
        possible_duplicates: Vec::new(),
    };

    for record in incoming {
        match check_duplicate(record, local) {
            outcome if outcome.is_strong_duplicate() => {
                result.duplicate_count += 1;
            }
            outcome => {
                if let Outcome::Duplicate { matched, .. } = outcome {
                    result.possible_duplicates.push(PossibleDuplicate {
                        merged_index: result.merged.len(),
                        matched_title: matched.title.clone(),
                    });
                }
                result.merged.push(record.clone());
                result.added_count += 1;
            }
        }
    }

    info!(
        "merged {} incoming records: {} added, {} duplicates skipped, {} possible duplicates",
        incoming.len(),
        result.added_count,
        result.duplicate_count,
        result.possible_duplicates.len()
    );

    result
}

/// How [`add_movie`] treats duplicates and stamps new records
#[derive(Debug, Clone)]
pub struct AddOptions {
    /// Add even when a UPC or title+year duplicate exists (user confirmed)
    pub allow_duplicate: bool,
    /// Date used for `date_added` when the candidate has none
    pub today: NaiveDate,
    /// chrono format string for the stamped date
    pub date_format: String,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            allow_duplicate: false,
            today: Local::now().date_naive(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// Result of an add attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub accepted: bool,
    /// The match found, if any; on acceptance this is a warning
    pub reason: Option<MatchReason>,
}

/// Append a candidate unless it is a strong duplicate
///
/// Never prompts: the caller decides whether to retry with
/// `allow_duplicate` set after asking the user.
pub fn add_movie(
    collection: &mut Vec<MovieRecord>,
    mut candidate: MovieRecord,
    options: &AddOptions,
) -> AddOutcome {
    let outcome = check_duplicate(&candidate, collection);
    let reason = outcome.reason().cloned();

    if outcome.is_strong_duplicate() && !options.allow_duplicate {
        return AddOutcome {
            accepted: false,
            reason,
        };
    }

    if candidate.date_added.trim().is_empty() {
        candidate.date_added = stamp_date(options);
    }
    collection.push(candidate);

    AddOutcome {
        accepted: true,
        reason,
    }
}

/// Format `today`, falling back to ISO when the format string is invalid
pub(crate) fn stamp_date(options: &AddOptions) -> String {
    let mut stamp = String::new();
    if write!(stamp, "{}", options.today.format(&options.date_format)).is_err() {
        warn!("invalid date format '{}', using ISO dates", options.date_format);
        return options.today.format("%Y-%m-%d").to_string();
    }
    stamp
}

/// Position of the first record matching `target`
///
/// Matches on UPC when both sides have one, otherwise on exact title and
/// year.
pub fn find_movie(collection: &[MovieRecord], target: &MovieRecord) -> Option<usize> {
    let upc = target.normalized_upc();
    let title = normalize_title(&target.title);
    let year = target.year.trim();

    collection.iter().position(|m| {
        let other_upc = m.normalized_upc();
        if !upc.is_empty() && !other_upc.is_empty() {
            return upc == other_upc;
        }
        m.normalized_title() == title && m.year.trim() == year
    })
}

/// Remove the first record matching `target` (see [`find_movie`])
pub fn remove_movie(collection: &mut Vec<MovieRecord>, target: &MovieRecord) -> Option<MovieRecord> {
    let index = find_movie(collection, target)?;
    Some(collection.remove(index))
}

/// Overwrite the record matching `target` with the non-empty fields of
/// `changes`
///
/// The edited record is checked against every *other* record, so it never
/// matches itself. A strong duplicate leaves the collection unchanged
/// unless `allow_duplicate` is set. Returns `None` when nothing matches
/// `target`.
pub fn update_movie(
    collection: &mut [MovieRecord],
    target: &MovieRecord,
    changes: &MovieRecord,
    allow_duplicate: bool,
) -> Option<AddOutcome> {
    let index = find_movie(collection, target)?;

    let mut updated = collection[index].clone();
    for field in Field::ALL {
        let value = changes.get(field).trim();
        if !value.is_empty() {
            *updated.get_mut(field) = value.to_string();
        }
    }

    let others: Vec<MovieRecord> = collection
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, m)| m.clone())
        .collect();
    let outcome = check_duplicate(&updated, &others);
    let reason = outcome.reason().cloned();

    if outcome.is_strong_duplicate() && !allow_duplicate {
        return Some(AddOutcome {
            accepted: false,
            reason,
        });
    }

    info!("updated {}", updated);
    collection[index] = updated;

    Some(AddOutcome {
        accepted: true,
        reason,
    })
}
