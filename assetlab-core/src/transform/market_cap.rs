//! Market-cap string normalization.
//!
//! Raw values look like `"$1.2B"` or `"$450M"`. Only the `M` and `B` suffixes
//! are honored; anything else (a `K` suffix, a bare number, `n/a`) yields no
//! value rather than a guess.

use crate::source::SourceError;
use polars::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Multiplier for a recognized magnitude suffix.
pub fn suffix_multiplier(suffix: char) -> Option<f64> {
    match suffix {
        'M' => Some(1e6),
        'B' => Some(1e9),
        _ => None,
    }
}

/// Parse one raw market-cap string into base currency units.
///
/// The first character is taken to be the currency symbol and the last the
/// magnitude suffix; what sits between must parse as a decimal. Surrounding
/// whitespace is not stripped, so `"$1.5B "` has no recognized suffix.
pub fn parse_market_cap(raw: &str) -> Option<f64> {
    let suffix = raw.chars().last()?;
    let multiplier = suffix_multiplier(suffix)?;

    let mut chars = raw.chars();
    chars.next()?;
    chars.next_back()?;
    let number: f64 = chars.as_str().parse().ok()?;
    Some(number * multiplier)
}

/// Normalize a mapping of identifier → raw string into identifier → value.
///
/// Identifiers whose value cannot be interpreted are omitted.
pub fn normalize<'a, I>(raw: I) -> HashMap<String, f64>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    raw.into_iter()
        .filter_map(|(id, value)| parse_market_cap(value).map(|v| (id.to_string(), v)))
        .collect()
}

/// Replace the string `column` of `df` with normalized `f64` values, aligned
/// with the identifier column `id_column`.
///
/// Rows whose identifier or value is missing, or whose value is unrecognized,
/// get null. A column that is already numeric is left as-is.
pub fn normalize_column(
    df: &DataFrame,
    id_column: &str,
    column: &str,
) -> Result<DataFrame, SourceError> {
    let raw_col = df.column(column).map_err(|_| SourceError::MissingColumn {
        column: column.to_string(),
        table: "market cap".into(),
    })?;
    if raw_col.dtype() != &DataType::String {
        return Ok(df.clone());
    }

    let ids = df
        .column(id_column)
        .map_err(|_| SourceError::MissingColumn {
            column: id_column.to_string(),
            table: "market cap".into(),
        })?
        .cast(&DataType::String)?;
    let ids = ids.str()?;
    let raw = raw_col.str()?;

    // Row-wise, so a repeated identifier keeps each row's own value.
    let values: Vec<Option<f64>> = ids
        .iter()
        .zip(raw.iter())
        .map(|(id, value)| id.and(value).and_then(parse_market_cap))
        .collect();
    let present = ids
        .iter()
        .zip(raw.iter())
        .filter(|(id, value)| id.is_some() && value.is_some())
        .count();
    let normalized = values.iter().filter(|v| v.is_some()).count();

    debug!(
        column,
        present,
        normalized,
        dropped = present - normalized,
        "normalized market caps"
    );

    let mut out = df.clone();
    out.with_column(Column::new(column.into(), values))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billions_and_millions() {
        assert_eq!(parse_market_cap("$1.5B"), Some(1_500_000_000.0));
        assert_eq!(parse_market_cap("$900M"), Some(900_000_000.0));
        assert_eq!(parse_market_cap("$2.1B"), Some(2.1e9));
    }

    #[test]
    fn unrecognized_suffixes_are_excluded() {
        assert_eq!(parse_market_cap("$50K"), None);
        assert_eq!(parse_market_cap("$1234"), None);
        assert_eq!(parse_market_cap("n/a"), None);
        assert_eq!(parse_market_cap(""), None);
        assert_eq!(parse_market_cap("$1.2b"), None);
    }

    #[test]
    fn surrounding_whitespace_hides_the_suffix() {
        assert_eq!(parse_market_cap("$1.5B "), None);
        assert_eq!(parse_market_cap(" $1.5B"), None);
    }

    #[test]
    fn unparseable_number_is_excluded() {
        assert_eq!(parse_market_cap("$abcM"), None);
        assert_eq!(parse_market_cap("$B"), None);
        assert_eq!(parse_market_cap("B"), None);
    }

    #[test]
    fn normalize_omits_bad_entries() {
        let out = normalize(vec![("A", "$2.1B"), ("B", "$900M"), ("C", "$50K")]);
        assert_eq!(out.len(), 2);
        assert_eq!(out["A"], 2.1e9);
        assert_eq!(out["B"], 9e8);
        assert!(!out.contains_key("C"));
    }

    #[test]
    fn column_merge_leaves_unmatched_rows_null() {
        let df = df!(
            "ticker" => &["A", "B", "C", "D"],
            "marketcap" => &[Some("$2.1B"), Some("$900M"), Some("$50K"), None],
        )
        .unwrap();

        let out = normalize_column(&df, "ticker", "marketcap").unwrap();
        let caps = out.column("marketcap").unwrap().f64().unwrap();
        assert_eq!(caps.get(0), Some(2_100_000_000.0));
        assert_eq!(caps.get(1), Some(900_000_000.0));
        assert_eq!(caps.get(2), None);
        assert_eq!(caps.get(3), None);
    }

    #[test]
    fn repeated_identifiers_keep_their_own_values() {
        let df = df!(
            "ticker" => &[Some("A"), Some("A"), None],
            "marketcap" => &["$1B", "$2B", "$3B"],
        )
        .unwrap();

        let out = normalize_column(&df, "ticker", "marketcap").unwrap();
        let caps: Vec<Option<f64>> = out.column("marketcap").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(caps, vec![Some(1e9), Some(2e9), None]);
    }

    #[test]
    fn numeric_column_is_untouched() {
        let df = df!("ticker" => &["A"], "marketcap" => &[5.0]).unwrap();
        let out = normalize_column(&df, "ticker", "marketcap").unwrap();
        assert_eq!(out.column("marketcap").unwrap().f64().unwrap().get(0), Some(5.0));
    }

    #[test]
    fn missing_column_is_an_error() {
        let df = df!("ticker" => &["A"]).unwrap();
        assert!(matches!(
            normalize_column(&df, "ticker", "marketcap"),
            Err(SourceError::MissingColumn { .. })
        ));
    }
}
