use crate::frame::IndexedFrame;
use crate::source::SourceError;
use polars::prelude::*;

/// Canonicalizer for keyed tables
pub struct Canonicalizer;

impl Canonicalizer {
    /// Sort ascending by the index columns, stable for equal keys.
    pub fn sort_by_index(frame: IndexedFrame) -> Result<IndexedFrame, SourceError> {
        if frame.index.is_empty() {
            return Ok(frame);
        }
        let descending = vec![false; frame.index.len()];
        let data = frame
            .data
            .lazy()
            .sort(
                frame.index.clone(),
                SortMultipleOptions::default()
                    .with_order_descending_multi(descending)
                    .with_maintain_order(true),
            )
            .collect()?;
        Ok(IndexedFrame {
            data,
            index: frame.index,
        })
    }

    /// Drop rows with a repeated index, keeping the first occurrence in input order.
    pub fn dedupe_first(frame: IndexedFrame) -> Result<IndexedFrame, SourceError> {
        if frame.index.is_empty() {
            return Ok(frame);
        }
        let subset = frame.index.iter().map(|c| c.as_str().into()).collect();
        let data = frame
            .data
            .lazy()
            .unique_stable(Some(subset), UniqueKeepStrategy::First)
            .collect()?;
        Ok(IndexedFrame {
            data,
            index: frame.index,
        })
    }

    /// Drop columns that contain no values at all.
    pub fn drop_all_null_columns(df: &DataFrame) -> Result<DataFrame, SourceError> {
        if df.height() == 0 {
            return Ok(df.clone());
        }
        let keep: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|c| c.null_count() < c.len())
            .map(|c| c.name().to_string())
            .collect();
        Ok(df.select(keep)?)
    }
}
