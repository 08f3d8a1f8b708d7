//! Equity reference/metadata table normalization.

use super::canonicalize::Canonicalizer;
use super::market_cap;
use crate::frame::IndexedFrame;
use crate::source::SourceError;
use polars::prelude::*;
use tracing::info;

/// Identifier column of the normalized table.
pub const ID_COLUMN: &str = "ticker";
/// Listing-page link column that carries no data.
const SUMMARY_QUOTE: &str = "summary quote";
const MARKET_CAP: &str = "marketcap";

/// Normalize an equity metadata table into one indexed by `ticker`.
///
/// Steps, in order: lower-case column names, drop all-null columns, take
/// `ticker` (or `symbol`, renamed) as the index, drop `summary quote`,
/// keep the first row per ticker, normalize `marketcap` if present.
pub fn normalize_equities(df: DataFrame) -> Result<IndexedFrame, SourceError> {
    let mut df = df;
    let lowered: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|c| c.trim().to_lowercase())
        .collect();
    df.set_column_names(lowered)?;

    let mut df = Canonicalizer::drop_all_null_columns(&df)?;

    if df.column(ID_COLUMN).is_err() {
        if df.column("symbol").is_ok() {
            df.rename("symbol", ID_COLUMN.into())?;
        } else {
            return Err(SourceError::MissingColumn {
                column: ID_COLUMN.into(),
                table: "equity metadata".into(),
            });
        }
    }
    if df.column(SUMMARY_QUOTE).is_ok() {
        df = df.drop(SUMMARY_QUOTE)?;
    }

    let rows_in = df.height();
    let frame = Canonicalizer::dedupe_first(IndexedFrame::new(df, &[ID_COLUMN])?)?;
    let duplicates = rows_in - frame.height();

    let data = if frame.data.column(MARKET_CAP).is_ok() {
        market_cap::normalize_column(&frame.data, ID_COLUMN, MARKET_CAP)?
    } else {
        frame.data
    };

    info!(rows = data.height(), duplicates, "normalized equity metadata");
    Ok(IndexedFrame {
        data,
        index: frame.index,
    })
}
