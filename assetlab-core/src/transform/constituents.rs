//! S&P 500 constituent table: scraped HTML rows to a ticker-indexed frame.

use crate::frame::IndexedFrame;
use crate::source::wikipedia::HtmlTable;
use crate::source::SourceError;
use polars::prelude::*;
use tracing::debug;

/// Output columns, in order. `ticker` becomes the index.
pub const COLUMNS: [&str; 8] = [
    "ticker",
    "name",
    "gics_sector",
    "gics_sub_industry",
    "location",
    "first_added",
    "cik",
    "founded",
];

/// Map a scraped header cell to an output column, or `None` to drop it.
fn column_for(header: &str) -> Option<&'static str> {
    // Strip footnote markers like "Date added[3]".
    let base = header.split('[').next().unwrap_or_default();
    match base.trim().to_lowercase().as_str() {
        "symbol" | "ticker" | "ticker symbol" => Some("ticker"),
        "security" | "company" | "name" => Some("name"),
        "gics sector" => Some("gics_sector"),
        "gics sub-industry" | "gics sub industry" => Some("gics_sub_industry"),
        "headquarters location" | "location" => Some("location"),
        "date added" | "date first added" => Some("first_added"),
        "cik" => Some("cik"),
        "founded" => Some("founded"),
        _ => None,
    }
}

/// Build the constituent frame, dropping irrelevant columns such as
/// `SEC filings`.
pub fn from_html_table(table: &HtmlTable) -> Result<IndexedFrame, SourceError> {
    let mut positions: Vec<Option<usize>> = vec![None; COLUMNS.len()];
    for (i, header) in table.header.iter().enumerate() {
        match column_for(header) {
            Some(name) => {
                if let Some(slot) = COLUMNS.iter().position(|c| *c == name) {
                    positions[slot].get_or_insert(i);
                }
            }
            None => debug!(header = %header, "dropping scraped column"),
        }
    }

    let mut columns = Vec::with_capacity(COLUMNS.len());
    for (name, pos) in COLUMNS.iter().zip(&positions) {
        let pos = pos.ok_or_else(|| SourceError::MissingColumn {
            column: name.to_string(),
            table: "S&P 500 constituents".into(),
        })?;
        let cells = table
            .rows
            .iter()
            .map(|row| row.get(pos).map(String::as_str).unwrap_or_default());

        let column = if *name == "cik" {
            let ciks: Vec<Option<i64>> = cells.map(|c| c.trim().parse().ok()).collect();
            Column::new((*name).into(), ciks)
        } else {
            let text: Vec<Option<&str>> = cells
                .map(|c| (!c.is_empty()).then_some(c))
                .collect();
            Column::new((*name).into(), text)
        };
        columns.push(column);
    }

    IndexedFrame::new(DataFrame::new(columns)?, &["ticker"])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> HtmlTable {
        HtmlTable {
            header: vec![
                "Symbol".into(),
                "Security".into(),
                "SEC filings".into(),
                "GICS Sector".into(),
                "GICS Sub-Industry".into(),
                "Headquarters Location".into(),
                "Date added[1]".into(),
                "CIK".into(),
                "Founded".into(),
            ],
            rows: vec![vec![
                "MMM".into(),
                "3M".into(),
                "reports".into(),
                "Industrials".into(),
                "Industrial Conglomerates".into(),
                "Saint Paul, Minnesota".into(),
                "1957-03-04".into(),
                "0000066740".into(),
                "1902".into(),
            ]],
        }
    }

    #[test]
    fn maps_and_orders_columns() {
        let frame = from_html_table(&table()).unwrap();

        assert_eq!(frame.index, vec!["ticker"]);
        assert_eq!(frame.value_columns(), COLUMNS[1..].to_vec());
        assert!(frame.data.column("sec filings").is_err());

        let cik = frame.data.column("cik").unwrap().i64().unwrap();
        assert_eq!(cik.get(0), Some(66740));
        let added = frame.data.column("first_added").unwrap().str().unwrap();
        assert_eq!(added.get(0), Some("1957-03-04"));
    }

    #[test]
    fn table_without_sec_filings_column_still_maps() {
        let mut t = table();
        t.header.remove(2);
        t.rows[0].remove(2);
        let frame = from_html_table(&t).unwrap();
        assert_eq!(frame.height(), 1);
    }

    #[test]
    fn missing_required_column_fails() {
        let mut t = table();
        t.header[7] = "Central Index Key".into();
        assert!(matches!(
            from_html_table(&t),
            Err(SourceError::MissingColumn { .. })
        ));
    }
}
