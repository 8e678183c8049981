//! Training dataset loader
//!
//! Reads the labeled track CSV: one row per historical track, a `genres` column
//! holding a bracketed list literal (`['dance pop', 'k-pop']`, `[]` when the
//! artist has no genres), and the audio-feature columns. Every other column is
//! ignored. Feature values are kept as raw strings; validating them is the
//! training table's job, and only for rows that survive filtering.

use crate::training_table::RawTrackRecord;
use crate::types::FEATURE_NAMES;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Column holding the genre list
pub const GENRES_COLUMN: &str = "genres";

/// Dataset loading errors
#[derive(Debug, Error)]
pub enum DatasetError {
    /// CSV could not be read or is malformed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Required column absent from the header
    #[error("Missing column '{0}'")]
    MissingColumn(String),

    /// Genre cell is not a bracketed list of quoted strings
    #[error("Row {row}: cannot parse genre list {value:?}: {reason}")]
    GenreList {
        row: usize,
        value: String,
        reason: String,
    },
}

/// Parse a bracketed list literal of quoted strings
///
/// Accepts single or double quotes and backslash escapes inside items.
pub fn parse_genre_list(raw: &str) -> Result<Vec<String>, String> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| "expected a list in brackets".to_string())?;

    let mut genres = Vec::new();
    let mut chars = inner.chars().peekable();

    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }

        let quote = match chars.next() {
            None => break,
            Some(q @ ('\'' | '"')) => q,
            Some(c) => return Err(format!("unexpected character '{}'", c)),
        };

        let mut item = String::new();
        loop {
            match chars.next() {
                None => return Err("unterminated string".to_string()),
                Some('\\') => match chars.next() {
                    Some(escaped) => item.push(escaped),
                    None => return Err("unterminated escape".to_string()),
                },
                Some(c) if c == quote => break,
                Some(c) => item.push(c),
            }
        }
        genres.push(item);

        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(c) => return Err(format!("expected ',' but found '{}'", c)),
        }
    }

    Ok(genres)
}

/// Read raw track records from any CSV source
pub fn read_dataset<R: std::io::Read>(reader: R) -> Result<Vec<RawTrackRecord>, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let genres_column = headers
        .iter()
        .position(|h| h == GENRES_COLUMN)
        .ok_or_else(|| DatasetError::MissingColumn(GENRES_COLUMN.to_string()))?;

    let feature_columns: Vec<(&str, usize)> = FEATURE_NAMES
        .iter()
        .filter_map(|name| headers.iter().position(|h| h == *name).map(|i| (*name, i)))
        .collect();

    if feature_columns.len() < FEATURE_NAMES.len() {
        debug!(
            present = feature_columns.len(),
            expected = FEATURE_NAMES.len(),
            "Dataset lacks some feature columns"
        );
    }

    let mut records = Vec::new();
    for (i, row) in csv_reader.records().enumerate() {
        let row = row?;
        // Line where the record starts; quoted fields may span lines
        let line = row
            .position()
            .and_then(|p| usize::try_from(p.line()).ok())
            .unwrap_or(i + 2);

        let raw_genres = row.get(genres_column).unwrap_or_default();
        let genres = parse_genre_list(raw_genres).map_err(|reason| DatasetError::GenreList {
            row: line,
            value: raw_genres.to_string(),
            reason,
        })?;

        let fields: HashMap<String, String> = feature_columns
            .iter()
            .filter_map(|&(name, col)| row.get(col).map(|v| (name.to_string(), v.to_string())))
            .collect();

        records.push(RawTrackRecord::new(genres, fields));
    }

    Ok(records)
}

/// Load raw track records from a CSV file
pub fn load_dataset(path: &Path) -> Result<Vec<RawTrackRecord>, DatasetError> {
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    let records = read_dataset(file)?;
    info!(path = %path.display(), records = records.len(), "Training dataset loaded");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_genre_list_variants() {
        assert_eq!(parse_genre_list("[]").unwrap(), Vec::<String>::new());
        assert_eq!(parse_genre_list("['show tunes']").unwrap(), vec!["show tunes"]);
        assert_eq!(
            parse_genre_list("['k-pop', 'dance pop']").unwrap(),
            vec!["k-pop", "dance pop"]
        );
        assert_eq!(
            parse_genre_list(r#"["children's music", 'pop']"#).unwrap(),
            vec!["children's music", "pop"]
        );
        assert_eq!(parse_genre_list(r"['rock \'n roll']").unwrap(), vec!["rock 'n roll"]);
        assert_eq!(parse_genre_list("  [ 'a' ,'b' ]  ").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_genre_list_rejects_garbage() {
        assert!(parse_genre_list("pop").is_err());
        assert!(parse_genre_list("['pop'").is_err());
        assert!(parse_genre_list("['pop' 'rock']").is_err());
        assert!(parse_genre_list("[pop]").is_err());
        assert!(parse_genre_list("['pop]").is_err());
    }

    #[test]
    fn test_read_dataset_projects_columns() {
        let csv = "\
genres,artists,acousticness,danceability,duration_ms,energy,instrumentalness,liveness,loudness,speechiness,tempo,valence,popularity,key,mode,count
\"['dance pop', 'pop']\",Someone,0.1,0.2,200000,0.4,0.0,0.1,-5.5,0.05,120.0,0.7,50,5,1,3
[],Nobody,0.9,0.1,100000,0.2,0.8,0.3,-20.0,0.04,80.0,0.2,10,2,0,1
";
        let records = read_dataset(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].genres, vec!["dance pop", "pop"]);
        assert_eq!(records[0].fields.get("tempo").map(String::as_str), Some("120.0"));
        assert_eq!(records[0].fields.len(), FEATURE_NAMES.len());
        assert!(!records[0].fields.contains_key("popularity"));
        assert!(records[1].genres.is_empty());
    }

    #[test]
    fn test_missing_genres_column() {
        let csv = "artists,tempo\nSomeone,120\n";
        assert!(matches!(
            read_dataset(csv.as_bytes()),
            Err(DatasetError::MissingColumn(ref c)) if c == "genres"
        ));
    }

    #[test]
    fn test_bad_genre_cell_reports_line() {
        let csv = "genres,tempo\n['pop'],120\nnot-a-list,100\n";
        assert!(matches!(
            read_dataset(csv.as_bytes()),
            Err(DatasetError::GenreList { row: 3, .. })
        ));
    }
}
