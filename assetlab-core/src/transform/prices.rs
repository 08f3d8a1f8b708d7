//! Historical equity price table: (date, ticker) index, sorted ascending.

use super::canonicalize::Canonicalizer;
use crate::frame::IndexedFrame;
use crate::source::csv_file::require_columns;
use crate::source::SourceError;
use polars::prelude::*;

pub const PRICE_INDEX: [&str; 2] = ["date", "ticker"];

/// Index the price table by (date, ticker) and sort it by that key.
///
/// `date` must already be a `Date` column or be castable to one without
/// losing values.
pub fn index_prices(df: DataFrame) -> Result<IndexedFrame, SourceError> {
    require_columns(&df, &PRICE_INDEX, "price history")?;
    let df = ensure_date_column(df, "date")?;
    Canonicalizer::sort_by_index(IndexedFrame::new(df, &PRICE_INDEX)?)
}

fn ensure_date_column(mut df: DataFrame, name: &str) -> Result<DataFrame, SourceError> {
    let col = df.column(name)?;
    if col.dtype() == &DataType::Date {
        return Ok(df);
    }

    let before = col.null_count();
    let cast = col.cast(&DataType::Date).map_err(|e| {
        SourceError::Malformed(format!("column '{name}' is not a date column: {e}"))
    })?;
    if cast.null_count() > before {
        return Err(SourceError::Malformed(format!(
            "column '{name}' has {} unparseable dates",
            cast.null_count() - before
        )));
    }
    df.with_column(cast)?;
    Ok(df)
}
