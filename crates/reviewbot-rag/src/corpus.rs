//! Corpus loader for the review CSV

use std::io::Read;
use std::path::Path;

use reviewbot_core::{Error, Record, Result};

/// Columns the corpus must provide, in the order the data provider ships them
pub const REQUIRED_COLUMNS: [&str; 5] = ["Title", "Date", "Best Character", "Rating", "Review"];

/// Load every record of the corpus at `path`, preserving row order
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| Error::Load(format!("cannot open {}: {}", path.display(), e)))?;

    let records = parse_corpus(file).map_err(|e| match e {
        Error::Load(msg) => Error::Load(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;

    tracing::info!(path = %path.display(), records = records.len(), "corpus loaded");
    Ok(records)
}

/// Parse corpus records from any CSV source
pub fn parse_corpus<R: Read>(source: R) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| Error::Load(format!("unreadable header: {}", e)))?
        .clone();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();

    if !missing.is_empty() {
        return Err(Error::Load(format!(
            "missing column(s): {}",
            missing.join(", ")
        )));
    }

    let mut records = Vec::new();
    for (row, result) in reader.deserialize::<Record>().enumerate() {
        let record = result.map_err(|e| Error::Load(format!("row {}: {}", row, e)))?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CORPUS: &str = "\
Title,Date,Best Character,Rating,Review
Best ninja ever,2023-01-04,Naruto,10,Naruto never gives up
Slow pacing,2022-11-19,Shikamaru,6,\"Too many filler episodes, honestly\"
";

    #[test]
    fn test_parse_preserves_row_order() {
        let records = parse_corpus(CORPUS.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Best ninja ever");
        assert_eq!(records[1].review, "Too many filler episodes, honestly");
        assert_eq!(records[1].best_character, "Shikamaru");
        assert_eq!(records[1].rating, "6");
    }

    #[test]
    fn test_columns_may_be_reordered() {
        let csv = "Review,Rating,Title,Best Character,Date\nGreat,9,Fine,Itachi,2020\n";
        let records = parse_corpus(csv.as_bytes()).unwrap();

        assert_eq!(records[0].title, "Fine");
        assert_eq!(records[0].best_character, "Itachi");
    }

    #[test]
    fn test_missing_column_is_a_load_error() {
        let csv = "Title,Date,Rating,Review\nA,2020,5,B\n";
        let err = parse_corpus(csv.as_bytes()).unwrap_err();

        match err {
            Error::Load(msg) => assert!(msg.contains("Best Character")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_row_is_a_load_error() {
        let csv = "Title,Date,Best Character,Rating,Review\nA,2020,Naruto\n";
        assert!(matches!(parse_corpus(csv.as_bytes()), Err(Error::Load(_))));
    }

    #[test]
    fn test_missing_file_is_a_load_error() {
        let err = load_corpus("/nonexistent/Naruto_reviews.csv").unwrap_err();
        assert!(matches!(err, Error::Load(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CORPUS.as_bytes()).unwrap();

        let records = load_corpus(file.path()).unwrap();
        assert_eq!(records.len(), 2);
    }
}
