//! FRED (Federal Reserve Economic Data) series provider.
//!
//! Uses the public graph CSV endpoint, which needs no API key:
//! `{base}/graph/fredgraph.csv?id={SERIES}&cosd={YYYY-MM-DD}`.
//!
//! The response is a two-column CSV (`observation_date` or `DATE`, then the
//! series id). Non-trading days appear as `.` or an empty cell.

use super::{HttpFetch, SourceError};
use chrono::NaiveDate;
use tracing::info;

/// One named economic series as returned by FRED.
#[derive(Debug, Clone, PartialEq)]
pub struct FredSeries {
    pub id: String,
    pub observations: Vec<(NaiveDate, Option<f64>)>,
}

/// FRED provider bound to a base URL.
pub struct FredProvider<'a> {
    http: &'a dyn HttpFetch,
    base_url: String,
}

impl<'a> FredProvider<'a> {
    pub fn new(http: &'a dyn HttpFetch, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn series_url(&self, id: &str, start: NaiveDate) -> String {
        format!(
            "{}/graph/fredgraph.csv?id={id}&cosd={}",
            self.base_url.trim_end_matches('/'),
            start.format("%Y-%m-%d")
        )
    }

    /// Fetch a single series from `start` onwards.
    pub fn fetch_series(&self, id: &str, start: NaiveDate) -> Result<FredSeries, SourceError> {
        let body = self.http.get_text(&self.series_url(id, start))?;
        let series = parse_series_csv(id, &body)?;
        info!(series = id, observations = series.observations.len(), "fetched FRED series");
        Ok(series)
    }

    /// Fetch several series; any single failure fails the whole batch.
    pub fn fetch_many(&self, ids: &[&str], start: NaiveDate) -> Result<Vec<FredSeries>, SourceError> {
        ids.iter().map(|id| self.fetch_series(id, start)).collect()
    }
}

/// Parse a FRED graph CSV body into a series.
///
/// Observations before the requested start are not filtered here; FRED already
/// honors `cosd`.
pub fn parse_series_csv(id: &str, body: &str) -> Result<FredSeries, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| SourceError::ResponseFormatChanged(format!("FRED {id}: {e}")))?
        .clone();
    if headers.len() < 2 {
        return Err(SourceError::ResponseFormatChanged(format!(
            "FRED {id}: expected date and value columns, got {:?}",
            headers.iter().collect::<Vec<_>>()
        )));
    }

    let mut observations = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| SourceError::ResponseFormatChanged(format!("FRED {id}: {e}")))?;
        let raw_date = record.get(0).unwrap_or_default().trim();
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
            SourceError::ResponseFormatChanged(format!(
                "FRED {id}: bad date '{raw_date}' at row {row}: {e}"
            ))
        })?;

        let raw_value = record.get(1).unwrap_or_default().trim();
        let value = match raw_value {
            "" | "." => None,
            v => Some(v.parse::<f64>().map_err(|e| {
                SourceError::ResponseFormatChanged(format!(
                    "FRED {id}: bad value '{v}' at row {row}: {e}"
                ))
            })?),
        };
        observations.push((date, value));
    }

    Ok(FredSeries {
        id: id.to_string(),
        observations,
    })
}
