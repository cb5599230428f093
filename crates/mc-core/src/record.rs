//! Movie records and the canonical field set

use crate::normalize::{header_key, normalize_title, normalize_upc, split_formats};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A canonical movie field
///
/// Serializes as its canonical CSV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    Title,
    Year,
    Director,
    Producer,
    Studio,
    Genre,
    Runtime,
    Formats,
    #[serde(rename = "UPC")]
    Upc,
    #[serde(rename = "ASIN")]
    Asin,
    Notes,
    #[serde(rename = "Date Added")]
    DateAdded,
    #[serde(rename = "Image URL")]
    ImageUrl,
}

impl Field {
    /// Every field, in export column order
    pub const ALL: [Field; 13] = [
        Field::Title,
        Field::Year,
        Field::Director,
        Field::Producer,
        Field::Studio,
        Field::Genre,
        Field::Runtime,
        Field::Formats,
        Field::Upc,
        Field::Asin,
        Field::Notes,
        Field::DateAdded,
        Field::ImageUrl,
    ];

    /// Canonical CSV header for this field
    pub fn header(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Year => "Year",
            Field::Director => "Director",
            Field::Producer => "Producer",
            Field::Studio => "Studio",
            Field::Genre => "Genre",
            Field::Runtime => "Runtime",
            Field::Formats => "Formats",
            Field::Upc => "UPC",
            Field::Asin => "ASIN",
            Field::Notes => "Notes",
            Field::DateAdded => "Date Added",
            Field::ImageUrl => "Image URL",
        }
    }

    /// Header keys accepted for this field, best first
    ///
    /// The first entry is always the key of the canonical header.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Title => &["title", "movietitle", "movie"],
            Field::Year => &["year", "releaseyear"],
            Field::Director => &["director", "directors"],
            Field::Producer => &["producer"],
            Field::Studio => &["studio"],
            Field::Genre => &["genre"],
            Field::Runtime => &["runtime"],
            Field::Formats => &["formats", "format"],
            Field::Upc => &["upc", "barcode"],
            Field::Asin => &["asin"],
            Field::Notes => &["notes"],
            Field::DateAdded => &["dateadded", "added"],
            Field::ImageUrl => &["imageurl", "image"],
        }
    }

    /// Resolve a column header or JSON key to a field
    ///
    /// Matching ignores case, whitespace and punctuation, and accepts the
    /// aliases seen in hand-made spreadsheets and the remote sheet:
    /// - "Movie Title" / "Movie" -> Title
    /// - "Release Year" -> Year
    /// - "Format" -> Formats, "Barcode" -> Upc
    /// - "Added" -> DateAdded, "Image" -> ImageUrl
    pub fn from_header(header: &str) -> Option<Field> {
        Field::resolve(header).map(|(field, _)| field)
    }

    /// Resolve a header together with its precedence rank (lower wins)
    ///
    /// The canonical header spelled exactly ranks 0, any other spelling of
    /// it ranks 1, and aliases follow in their listed order.
    /// So for titles: `Title` > `title` > `Movie Title` > `Movie`.
    pub fn resolve(header: &str) -> Option<(Field, usize)> {
        let header = header.trim();
        let key = header_key(header);

        Field::ALL.into_iter().find_map(|field| {
            let pos = field.aliases().iter().position(|alias| *alias == key)?;
            let rank = if header == field.header() { 0 } else { pos + 1 };
            Some((field, rank))
        })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One movie in the collection
///
/// Every attribute is a string; an empty string means the value is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovieRecord {
    pub title: String,
    pub year: String,
    pub director: String,
    pub producer: String,
    pub studio: String,
    pub genre: String,
    pub runtime: String,
    /// Comma-joined format tags, e.g. "DVD, Blu-ray"
    pub formats: String,
    pub upc: String,
    pub asin: String,
    pub notes: String,
    pub date_added: String,
    pub image_url: String,
}

impl MovieRecord {
    /// Create a record with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the release year
    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }

    /// Set the UPC
    pub fn with_upc(mut self, upc: impl Into<String>) -> Self {
        self.upc = upc.into();
        self
    }

    /// Get a field value
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Year => &self.year,
            Field::Director => &self.director,
            Field::Producer => &self.producer,
            Field::Studio => &self.studio,
            Field::Genre => &self.genre,
            Field::Runtime => &self.runtime,
            Field::Formats => &self.formats,
            Field::Upc => &self.upc,
            Field::Asin => &self.asin,
            Field::Notes => &self.notes,
            Field::DateAdded => &self.date_added,
            Field::ImageUrl => &self.image_url,
        }
    }

    /// Mutable access to a field value
    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Year => &mut self.year,
            Field::Director => &mut self.director,
            Field::Producer => &mut self.producer,
            Field::Studio => &mut self.studio,
            Field::Genre => &mut self.genre,
            Field::Runtime => &mut self.runtime,
            Field::Formats => &mut self.formats,
            Field::Upc => &mut self.upc,
            Field::Asin => &mut self.asin,
            Field::Notes => &mut self.notes,
            Field::DateAdded => &mut self.date_added,
            Field::ImageUrl => &mut self.image_url,
        }
    }

    /// Build a record from a loosely keyed bag of values
    ///
    /// Keys are resolved with [`Field::resolve`]; unknown keys are
    /// dropped. When several keys map to the same field, the non-empty
    /// value under the best-ranked key wins, whatever order the keys come
    /// in; equal ranks keep the first. Returns `None` when no title
    /// resolves.
    pub fn from_pairs<I, K, V>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut record = Self::default();
        let mut ranks = [usize::MAX; Field::ALL.len()];

        for (key, value) in pairs {
            let Some((field, rank)) = Field::resolve(key.as_ref()) else {
                continue;
            };
            let value = value.as_ref().trim();
            if value.is_empty() || rank >= ranks[field as usize] {
                continue;
            }
            ranks[field as usize] = rank;
            *record.get_mut(field) = value.to_string();
        }

        record.is_valid().then_some(record)
    }

    /// A record is storable only with a non-empty title
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Digit-only UPC used for matching
    pub fn normalized_upc(&self) -> String {
        normalize_upc(&self.upc)
    }

    /// Lowercased, trimmed title used for matching
    pub fn normalized_title(&self) -> String {
        normalize_title(&self.title)
    }

    /// Individual format tags
    pub fn format_list(&self) -> Vec<&str> {
        split_formats(&self.formats)
    }
}

impl fmt::Display for MovieRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if !self.year.is_empty() {
            write!(f, " ({})", self.year)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_aliases() {
        assert_eq!(Field::from_header("Title"), Some(Field::Title));
        assert_eq!(Field::from_header("title"), Some(Field::Title));
        assert_eq!(Field::from_header("Movie Title"), Some(Field::Title));
        assert_eq!(Field::from_header("Movie"), Some(Field::Title));
        assert_eq!(Field::from_header("Release Year"), Some(Field::Year));
        assert_eq!(Field::from_header("dateadded"), Some(Field::DateAdded));
        assert_eq!(Field::from_header("dateAdded"), Some(Field::DateAdded));
        assert_eq!(Field::from_header("Image URL"), Some(Field::ImageUrl));
        assert_eq!(Field::from_header("id"), None);
        assert_eq!(Field::from_header("Name"), None);
    }

    #[test]
    fn test_resolve_ranks() {
        assert_eq!(Field::resolve("Title"), Some((Field::Title, 0)));
        assert_eq!(Field::resolve("title"), Some((Field::Title, 1)));
        assert_eq!(Field::resolve("Movie Title"), Some((Field::Title, 2)));
        assert_eq!(Field::resolve("Movie"), Some((Field::Title, 3)));
        assert_eq!(Field::resolve("Year"), Some((Field::Year, 0)));
        assert_eq!(Field::resolve("year"), Some((Field::Year, 1)));
        assert_eq!(Field::resolve("Release Year"), Some((Field::Year, 2)));
        assert_eq!(Field::resolve(" Date Added "), Some((Field::DateAdded, 0)));
        assert_eq!(Field::resolve("dateAdded"), Some((Field::DateAdded, 1)));
    }

    #[test]
    fn test_field_serializes_as_canonical_header() {
        assert_eq!(serde_json::to_string(&Field::Upc).unwrap(), r#""UPC""#);
        assert_eq!(serde_json::to_string(&Field::DateAdded).unwrap(), r#""Date Added""#);

        for field in Field::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.header()));
            assert_eq!(serde_json::from_str::<Field>(&json).unwrap(), field);
        }
    }

    #[test]
    fn test_canonical_headers_resolve_to_themselves() {
        for field in Field::ALL {
            assert_eq!(Field::from_header(field.header()), Some(field));
        }
    }

    #[test]
    fn test_from_pairs_best_ranked_non_empty_wins() {
        let record = MovieRecord::from_pairs([
            ("Title", ""),
            ("Movie Title", "Alien"),
            ("Movie", "Aliens"),
            ("Year", " 1979 "),
            ("Rating", "5"),
        ])
        .unwrap();

        assert_eq!(record.title, "Alien");
        assert_eq!(record.year, "1979");
    }

    #[test]
    fn test_from_pairs_ignores_key_order() {
        let record = MovieRecord::from_pairs([
            ("Movie", "X Cut"),
            ("Release Year", "2001"),
            ("title", "Heat"),
            ("Title", "Heat (Director's Cut)"),
            ("year", "1995"),
        ])
        .unwrap();

        assert_eq!(record.title, "Heat (Director's Cut)");
        assert_eq!(record.year, "1995");
    }

    #[test]
    fn test_from_pairs_equal_rank_keeps_first() {
        let record = MovieRecord::from_pairs([
            ("Title", "Alien"),
            ("Title", "Aliens"),
            ("Format", "DVD"),
            ("format", "VHS"),
        ])
        .unwrap();

        assert_eq!(record.title, "Alien");
        assert_eq!(record.formats, "DVD");
    }

    #[test]
    fn test_from_pairs_without_title() {
        assert!(MovieRecord::from_pairs([("Year", "1999"), ("UPC", "123")]).is_none());
        assert!(MovieRecord::from_pairs([("Title", "   ")]).is_none());
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let mut record = MovieRecord::new("Heat").with_year("1995");
        record.date_added = "2024-01-02".to_string();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["dateAdded"], "2024-01-02");
        assert_eq!(json["imageUrl"], "");

        let loaded: MovieRecord = serde_json::from_str(r#"{"title":"Heat"}"#).unwrap();
        assert_eq!(loaded.title, "Heat");
        assert!(loaded.year.is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(MovieRecord::new("Heat").with_year("1995").to_string(), "Heat (1995)");
        assert_eq!(MovieRecord::new("Heat").to_string(), "Heat");
    }
}
