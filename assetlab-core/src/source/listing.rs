//! Legacy exchange-listing export (NASDAQ, AMEX, NYSE company screens).
//!
//! The old download endpoint is known to be disabled upstream; the URL template
//! is configurable so a mirror can be pointed at instead. When it fails the
//! run fails, same as any other provider.

use super::csv_file::parse_csv_strings;
use super::{HttpFetch, SourceError};
use polars::prelude::*;
use tracing::info;

/// Placeholder in the URL template replaced by each exchange name.
pub const EXCHANGE_PLACEHOLDER: &str = "{exchange}";

/// Download every exchange's listing and stack them into one table.
///
/// All columns are strings; downstream normalization decides what to parse.
pub fn fetch_listings(
    http: &dyn HttpFetch,
    url_template: &str,
    exchanges: &[String],
) -> Result<DataFrame, SourceError> {
    if !url_template.contains(EXCHANGE_PLACEHOLDER) {
        return Err(SourceError::Malformed(format!(
            "listing URL template has no {EXCHANGE_PLACEHOLDER} placeholder: {url_template}"
        )));
    }

    let mut combined: Option<DataFrame> = None;
    for exchange in exchanges {
        let url = url_template.replace(EXCHANGE_PLACEHOLDER, exchange);
        let df = parse_csv_strings(http.get_bytes(&url)?, &url)?;
        info!(exchange = %exchange, rows = df.height(), "fetched exchange listing");

        combined = Some(match combined {
            None => df,
            Some(mut acc) => {
                acc.vstack_mut(&df).map_err(|e| {
                    SourceError::ResponseFormatChanged(format!(
                        "listing for {exchange} does not match earlier exchanges: {e}"
                    ))
                })?;
                acc
            }
        });
    }

    combined.ok_or_else(|| SourceError::Malformed("no exchanges configured".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Canned(HashMap<String, String>);

    impl HttpFetch for Canned {
        fn get_text(&self, url: &str) -> Result<String, SourceError> {
            self.0.get(url).cloned().ok_or(SourceError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
        }

        fn get_bytes(&self, url: &str) -> Result<Vec<u8>, SourceError> {
            self.get_text(url).map(String::into_bytes)
        }
    }

    #[test]
    fn stacks_exchanges_in_order() {
        let mut pages = HashMap::new();
        pages.insert(
            "http://x/NASDAQ".to_string(),
            "Symbol,MarketCap\nAAPL,$2.1B\n".to_string(),
        );
        pages.insert(
            "http://x/NYSE".to_string(),
            "Symbol,MarketCap\nIBM,$900M\nGE,n/a\n".to_string(),
        );
        let http = Canned(pages);

        let df = fetch_listings(
            &http,
            "http://x/{exchange}",
            &["NASDAQ".to_string(), "NYSE".to_string()],
        )
        .unwrap();

        assert_eq!(df.height(), 3);
        let symbols = df.column("Symbol").unwrap().str().unwrap();
        assert_eq!(symbols.get(0), Some("AAPL"));
        assert_eq!(symbols.get(2), Some("GE"));
    }

    #[test]
    fn one_failing_exchange_fails_the_fetch() {
        let mut pages = HashMap::new();
        pages.insert("http://x/NASDAQ".to_string(), "Symbol\nAAPL\n".to_string());
        let http = Canned(pages);

        let err = fetch_listings(
            &http,
            "http://x/{exchange}",
            &["NASDAQ".to_string(), "AMEX".to_string()],
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::HttpStatus { status: 404, .. }));
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let http = Canned(HashMap::new());
        assert!(fetch_listings(&http, "http://x/all", &["NYSE".to_string()]).is_err());
    }
}
