//! Normalization helpers shared by every ingestion boundary

/// Strip everything but ASCII digits from a UPC
///
/// Scanners and spreadsheets hand back UPCs with spaces, dashes or a
/// leading apostrophe; only the digits identify the release.
pub fn normalize_upc(upc: &str) -> String {
    upc.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Case-insensitive, trimmed form of a title used for matching
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Lookup key for a column header or JSON key
///
/// "Date Added", "date_added" and "dateAdded" all become "dateadded".
pub fn header_key(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split a comma-joined format list into its tags
pub fn split_formats(formats: &str) -> Vec<&str> {
    formats
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect()
}
