//! The movie collection and the only ways to change it

use crate::error::{Error, Result};
use crate::reconciler::{self, AddOptions, AddOutcome, MergeResult, PossibleDuplicate};
use crate::record::{Field, MovieRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// An ordered list of movies, in insertion order
///
/// Records can only be added, merged, edited or removed through the reconciler,
/// so every change goes through the same duplicate policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    movies: Vec<MovieRecord>,
}

/// Counts reported by [`Collection::merge`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub added: usize,
    pub duplicates: usize,
    pub possible_duplicates: Vec<PossibleDuplicate>,
    /// Collection size after the merge
    pub total: usize,
}

/// Criteria for [`Collection::filter`]; empty criteria match everything
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub genre: Option<String>,
    pub year: Option<String>,
    pub format: Option<String>,
}

impl Filter {
    pub fn matches(&self, movie: &MovieRecord) -> bool {
        if let Some(genre) = &self.genre {
            if !movie.genre.eq_ignore_ascii_case(genre.trim()) {
                return false;
            }
        }
        if let Some(year) = &self.year {
            if movie.year.trim() != year.trim() {
                return false;
            }
        }
        if let Some(format) = &self.format {
            if !movie
                .format_list()
                .iter()
                .any(|f| f.eq_ignore_ascii_case(format.trim()))
            {
                return false;
            }
        }
        true
    }
}

impl Collection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap already-stored records (loaded from disk or a spreadsheet)
    pub fn from_records(movies: Vec<MovieRecord>) -> Self {
        Self { movies }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MovieRecord> {
        self.movies.iter()
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.movies
    }

    pub fn into_records(self) -> Vec<MovieRecord> {
        self.movies
    }

    /// Add a single movie, e.g. from a scan or the add form
    ///
    /// Fails only when the candidate has no title. A strong duplicate is
    /// reported as not accepted unless `options.allow_duplicate` is set.
    pub fn add_movie(&mut self, candidate: MovieRecord, options: &AddOptions) -> Result<AddOutcome> {
        if !candidate.is_valid() {
            return Err(Error::MissingTitle);
        }
        Ok(reconciler::add_movie(&mut self.movies, candidate, options))
    }

    /// Merge an imported or synced batch into this collection
    ///
    /// Untitled incoming records are ignored. Records keep whatever
    /// `date_added` they came with.
    pub fn merge(&mut self, incoming: &[MovieRecord]) -> MergeSummary {
        self.merge_inner(incoming, None)
    }

    /// Like [`Collection::merge`], but records added without a
    /// `date_added` are stamped as [`Collection::add_movie`] would.
    /// Records already in the collection are not touched.
    pub fn merge_stamped(&mut self, incoming: &[MovieRecord], options: &AddOptions) -> MergeSummary {
        self.merge_inner(incoming, Some(options))
    }

    fn merge_inner(&mut self, incoming: &[MovieRecord], stamp: Option<&AddOptions>) -> MergeSummary {
        let valid: Vec<MovieRecord> = incoming.iter().filter(|m| m.is_valid()).cloned().collect();
        let MergeResult {
            mut merged,
            added_count,
            duplicate_count,
            possible_duplicates,
        } = reconciler::merge_collections(&self.movies, &valid);

        if let Some(options) = stamp {
            let date = reconciler::stamp_date(options);
            for movie in &mut merged[self.movies.len()..] {
                if movie.date_added.trim().is_empty() {
                    movie.date_added = date.clone();
                }
            }
        }

        self.movies = merged;

        MergeSummary {
            added: added_count,
            duplicates: duplicate_count,
            possible_duplicates,
            total: self.movies.len(),
        }
    }

    /// Remove the first movie matching `target` by UPC or title+year
    pub fn remove_movie(&mut self, target: &MovieRecord) -> Option<MovieRecord> {
        reconciler::remove_movie(&mut self.movies, target)
    }

    /// Edit the movie matching `target` (by UPC or title+year)
    ///
    /// Only non-empty fields of `changes` are applied. The result is checked
    /// for duplicates against the other records; a strong duplicate is not
    /// applied unless `allow_duplicate` is set. Returns `None` when no
    /// movie matches `target`.
    pub fn update_movie(
        &mut self,
        target: &MovieRecord,
        changes: &MovieRecord,
        allow_duplicate: bool,
    ) -> Option<AddOutcome> {
        reconciler::update_movie(&mut self.movies, target, changes, allow_duplicate)
    }

    /// Movies ordered by `field`
    ///
    /// Years compare numerically, with empty or non-numeric years counted
    /// as 0; every other field compares case-insensitively. The sort is
    /// stable, so ties keep collection order.
    pub fn sorted(&self, field: Field, descending: bool) -> Vec<&MovieRecord> {
        let mut movies: Vec<&MovieRecord> = self.movies.iter().collect();
        movies.sort_by(|a, b| {
            let ord = compare_field(a, b, field);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });
        movies
    }

    /// Case-insensitive search over title, director, genre and UPC
    pub fn search(&self, query: &str) -> Vec<&MovieRecord> {
        let term = query.trim().to_lowercase();
        self.movies
            .iter()
            .filter(|m| {
                m.title.to_lowercase().contains(&term)
                    || m.director.to_lowercase().contains(&term)
                    || m.genre.to_lowercase().contains(&term)
                    || m.upc.contains(&term)
            })
            .collect()
    }

    pub fn filter(&self, filter: &Filter) -> Vec<&MovieRecord> {
        self.movies.iter().filter(|m| filter.matches(m)).collect()
    }
}

fn compare_field(a: &MovieRecord, b: &MovieRecord, field: Field) -> Ordering {
    match field {
        Field::Year => year_value(&a.year).cmp(&year_value(&b.year)),
        _ => a.get(field).to_lowercase().cmp(&b.get(field).to_lowercase()),
    }
}

fn year_value(year: &str) -> u32 {
    year.trim().parse().unwrap_or(0)
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a MovieRecord;
    type IntoIter = std::slice::Iter<'a, MovieRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.movies.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn options() -> AddOptions {
        AddOptions {
            today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            ..AddOptions::default()
        }
    }

    fn sample() -> Collection {
        let mut heat = MovieRecord::new("Heat").with_year("1995").with_upc("111");
        heat.director = "Michael Mann".to_string();
        heat.genre = "Crime".to_string();
        heat.formats = "DVD, Blu-ray".to_string();

        let mut alien = MovieRecord::new("Alien").with_year("1979");
        alien.director = "Ridley Scott".to_string();
        alien.genre = "Sci-Fi".to_string();
        alien.formats = "4K".to_string();

        Collection::from_records(vec![heat, alien])
    }

    #[test]
    fn test_add_requires_title() {
        let mut collection = Collection::new();
        let result = collection.add_movie(MovieRecord::new("  ").with_upc("1"), &options());

        assert!(matches!(result, Err(Error::MissingTitle)));
        assert!(collection.is_empty());
    }

    #[test]
    fn test_add_then_duplicate() {
        let mut collection = Collection::new();
        let first = collection
            .add_movie(MovieRecord::new("Heat").with_upc("111"), &options())
            .unwrap();
        let second = collection
            .add_movie(MovieRecord::new("Heat").with_upc("111"), &options())
            .unwrap();

        assert!(first.accepted);
        assert!(!second.accepted);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.records()[0].date_added, "2024-01-01");
    }

    #[test]
    fn test_merge_summary() {
        let mut collection = sample();
        let summary = collection.merge(&[
            MovieRecord::new("heat").with_year("1995"),
            MovieRecord::new("Ran").with_year("1985"),
            MovieRecord::new(""),
            MovieRecord::new("Alien").with_year("1986"),
        ]);

        assert_eq!(summary.added, 2);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.possible_duplicates.len(), 1);
        assert_eq!(summary.total, 4);
    }

    #[test]
    fn test_remove() {
        let mut collection = sample();
        let removed = collection.remove_movie(&MovieRecord::new("").with_upc("111"));

        assert_eq!(removed.map(|m| m.title), Some("Heat".to_string()));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_search() {
        let collection = sample();

        assert_eq!(collection.search("ridley").len(), 1);
        assert_eq!(collection.search("CRIME")[0].title, "Heat");
        assert_eq!(collection.search("111")[0].title, "Heat");
        assert!(collection.search("zzz").is_empty());
    }

    #[test]
    fn test_filter() {
        let collection = sample();

        let by_format = collection.filter(&Filter {
            format: Some("blu-ray".to_string()),
            ..Filter::default()
        });
        assert_eq!(by_format.len(), 1);
        assert_eq!(by_format[0].title, "Heat");

        let by_year = collection.filter(&Filter {
            year: Some("1979".to_string()),
            ..Filter::default()
        });
        assert_eq!(by_year[0].title, "Alien");

        assert_eq!(collection.filter(&Filter::default()).len(), 2);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let collection = Collection::from_records(vec![MovieRecord::new("Heat")]);
        let json = serde_json::to_value(&collection).unwrap();

        assert!(json.is_array());
        assert_eq!(json[0]["title"], "Heat");
    }

    #[test]
    fn test_merge_stamped_dates_only_new_records() {
        let mut collection = sample();
        collection.movies[0].date_added = "2020-02-02".to_string();

        let mut dated = MovieRecord::new("Ran").with_year("1985");
        dated.date_added = "2019-01-01".to_string();
        let summary = collection.merge_stamped(
            &[
                MovieRecord::new("Heat").with_year("1995"),
                MovieRecord::new("Seven").with_year("1995"),
                dated,
            ],
            &options(),
        );

        assert_eq!(summary.added, 2);
        let dates: Vec<&str> = collection.iter().map(|m| m.date_added.as_str()).collect();
        assert_eq!(dates, vec!["2020-02-02", "", "2024-01-01", "2019-01-01"]);
    }

    #[test]
    fn test_merge_leaves_dates_alone() {
        let mut collection = Collection::new();
        collection.merge(&[MovieRecord::new("Seven")]);
        assert!(collection.records()[0].date_added.is_empty());
    }

    #[test]
    fn test_update_movie() {
        let mut collection = sample();
        let mut changes = MovieRecord::default();
        changes.notes = "Director's cut".to_string();

        let outcome = collection
            .update_movie(&MovieRecord::new("alien").with_year("1979"), &changes, false)
            .unwrap();
        assert!(outcome.accepted);
        assert_eq!(collection.records()[1].notes, "Director's cut");

        // Renaming Alien to Heat (1995) collides with the other record
        let changes = MovieRecord::new("Heat").with_year("1995");
        let outcome = collection
            .update_movie(&MovieRecord::new("Alien").with_year("1979"), &changes, false)
            .unwrap();
        assert!(!outcome.accepted);
        assert_eq!(collection.records()[1].title, "Alien");

        assert!(collection
            .update_movie(&MovieRecord::new("Ran"), &changes, false)
            .is_none());
    }

    #[test]
    fn test_sorted_by_year_is_numeric() {
        let mut collection = sample();
        collection.movies.push(MovieRecord::new("Nosferatu").with_year("922"));
        collection.movies.push(MovieRecord::new("Untitled Bootleg"));

        let titles = |movies: Vec<&MovieRecord>| -> Vec<String> {
            movies.iter().map(|m| m.title.clone()).collect()
        };

        assert_eq!(
            titles(collection.sorted(Field::Year, false)),
            vec!["Untitled Bootleg", "Nosferatu", "Alien", "Heat"]
        );
        assert_eq!(
            titles(collection.sorted(Field::Year, true)),
            vec!["Heat", "Alien", "Nosferatu", "Untitled Bootleg"]
        );
    }

    #[test]
    fn test_sorted_by_text_ignores_case() {
        let mut collection = sample();
        collection.movies.push(MovieRecord::new("aliens"));
        collection.movies.push(MovieRecord::new("Blade Runner"));

        let titles: Vec<&str> = collection
            .sorted(Field::Title, false)
            .iter()
            .map(|m| m.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Alien", "aliens", "Blade Runner", "Heat"]);

        let by_genre: Vec<&str> = collection
            .sorted(Field::Genre, true)
            .iter()
            .map(|m| m.title.as_str())
            .collect();
        // Empty genres sort first ascending, so last when descending
        assert_eq!(by_genre, vec!["Alien", "Heat", "aliens", "Blade Runner"]);
    }
}
