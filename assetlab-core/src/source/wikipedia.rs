//! HTML table scraping for the Wikipedia index-constituent list.

use super::{HttpFetch, SourceError};
use scraper::{ElementRef, Html, Selector};
use tracing::info;

/// A raw HTML table: header cells from the first row, then body rows.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Fetch `url` and return its first well-formed table.
pub fn fetch_first_table(http: &dyn HttpFetch, url: &str) -> Result<HtmlTable, SourceError> {
    let html = http.get_text(url)?;
    let table = first_table(&html)?;
    info!(url, rows = table.rows.len(), "scraped HTML table");
    Ok(table)
}

fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|e| SourceError::Malformed(format!("selector '{css}': {e:?}")))
}

/// Find the first table with a non-empty header row and at least one body row
/// whose width matches the header.
pub fn first_table(html: &str) -> Result<HtmlTable, SourceError> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("th, td")?;

    for table in document.select(&table_sel) {
        let mut rows = table
            .select(&row_sel)
            // Rows of nested tables belong to those tables.
            .filter(|tr| closest_table(tr).map(|t| t.id()) == Some(table.id()))
            .map(|tr| {
                tr.select(&cell_sel)
                    .filter(|cell| cell.parent().map(|p| p.id()) == Some(tr.id()))
                    .map(cell_text)
                    .collect::<Vec<_>>()
            })
            .filter(|cells| !cells.is_empty());

        let Some(header) = rows.next() else {
            continue;
        };
        let body: Vec<Vec<String>> = rows.filter(|r| r.len() == header.len()).collect();
        if header.iter().all(|h| h.is_empty()) || body.is_empty() {
            continue;
        }

        return Ok(HtmlTable { header, rows: body });
    }

    Err(SourceError::ResponseFormatChanged(
        "no well-formed table found in page".into(),
    ))
}

fn closest_table<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "table")
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
