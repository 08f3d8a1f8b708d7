//! Local and in-memory CSV ingestion via Polars.

use super::SourceError;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

/// Read a local CSV file with a header row, inferring column types.
///
/// ISO dates are parsed into `Date` columns where Polars can recognize them.
pub fn read_csv(path: &Path) -> Result<DataFrame, SourceError> {
    if !path.exists() {
        return Err(SourceError::LocalFile {
            path: path.display().to_string(),
            message: "file not found".into(),
        });
    }

    LazyCsvReader::new(path)
        .with_has_header(true)
        .with_try_parse_dates(true)
        .finish()
        .and_then(|lf| lf.collect())
        .map_err(|e| SourceError::LocalFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Parse CSV bytes (e.g. an HTTP download) with every column kept as a string.
///
/// Downloads from different endpoints can infer different types for the same
/// column; keeping strings lets them be stacked.
pub fn parse_csv_strings(bytes: Vec<u8>, origin: &str) -> Result<DataFrame, SourceError> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| SourceError::ResponseFormatChanged(format!("{origin}: {e}")))
}

/// Fail with [`SourceError::MissingColumn`] unless `df` has every column in `columns`.
pub fn require_columns(df: &DataFrame, columns: &[&str], table: &str) -> Result<(), SourceError> {
    for name in columns {
        if df.column(name).is_err() {
            return Err(SourceError::MissingColumn {
                column: name.to_string(),
                table: table.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn read_csv_missing_file_is_local_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_csv(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, SourceError::LocalFile { .. }));
    }

    #[test]
    fn read_csv_parses_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stocks.csv");
        fs::write(&path, "code,name\nAAPL,Apple Inc\nMSFT,Microsoft\n").unwrap();

        let df = read_csv(&path).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 2);
        assert!(df.column("code").is_ok());
        assert!(df.column("name").is_ok());
    }

    #[test]
    fn parse_csv_strings_keeps_numbers_as_strings() {
        let df = parse_csv_strings(b"Symbol,IPOyear\nAAPL,1980\n".to_vec(), "test").unwrap();
        assert_eq!(df.column("IPOyear").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn require_columns_reports_first_missing() {
        let df = df!("ticker" => &["A"]).unwrap();
        let err = require_columns(&df, &["ticker", "date"], "prices").unwrap_err();
        match err {
            SourceError::MissingColumn { column, table } => {
                assert_eq!(column, "date");
                assert_eq!(table, "prices");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
