//! A Polars DataFrame paired with the names of its index columns.

use crate::source::SourceError;
use polars::prelude::*;

/// Tabular payload with a (possibly compound) row index.
///
/// Index columns are ordinary columns in `data`; `index` only records which
/// ones identify a row and in what order. An empty `index` means a flat table.
#[derive(Debug, Clone)]
pub struct IndexedFrame {
    pub data: DataFrame,
    pub index: Vec<String>,
}

impl IndexedFrame {
    /// Wrap `data`, moving the index columns to the front.
    pub fn new(data: DataFrame, index: &[&str]) -> Result<Self, SourceError> {
        for name in index {
            if data.column(name).is_err() {
                return Err(SourceError::MissingColumn {
                    column: name.to_string(),
                    table: "index".into(),
                });
            }
        }

        let ordered: Vec<String> = index
            .iter()
            .map(|s| s.to_string())
            .chain(
                data.get_column_names()
                    .into_iter()
                    .map(|s| s.to_string())
                    .filter(|c| !index.contains(&c.as_str())),
            )
            .collect();
        let data = data.select(ordered)?;

        Ok(Self {
            data,
            index: index.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// A table without an index.
    pub fn flat(data: DataFrame) -> Self {
        Self {
            data,
            index: Vec::new(),
        }
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    /// Non-index column names, in order.
    pub fn value_columns(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .filter(|c| !self.index.contains(c))
            .collect()
    }
}
