//! Property tests for transform invariants.
//!
//! Uses proptest to verify:
//! 1. Market caps with an M/B suffix scale exactly; every other suffix is rejected
//! 2. Business-day resampling emits ascending weekday dates drawn from the input
//! 3. Resampled values stay within the range of the observations they average

use assetlab_core::source::fred::FredSeries;
use assetlab_core::transform::series::business_day_bin;
use assetlab_core::transform::{parse_market_cap, SeriesTable};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_cents() -> impl Strategy<Value = u64> {
    0u64..100_000_000
}

fn arb_currency() -> impl Strategy<Value = char> {
    prop::sample::select(vec!['$', '€', '£', 'x'])
}

fn arb_other_suffix() -> impl Strategy<Value = char> {
    prop::char::range('A', 'Z').prop_filter("not a magnitude suffix", |c| *c != 'M' && *c != 'B')
}

fn arb_series() -> impl Strategy<Value = FredSeries> {
    prop::collection::vec((0i64..120, prop::option::of(-1e4..1e4_f64)), 0..60).prop_map(|obs| {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        FredSeries {
            id: "S".into(),
            observations: obs
                .into_iter()
                .map(|(offset, v)| (start + Duration::days(offset), v))
                .collect(),
        }
    })
}

fn money(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

// ── 1. Market caps ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn magnitude_suffix_scales_value(cents in arb_cents(), currency in arb_currency(), billions in any::<bool>()) {
        let (suffix, multiplier) = if billions { ('B', 1e9) } else { ('M', 1e6) };
        let raw = format!("{currency}{}{suffix}", money(cents));
        let expected = (cents as f64 / 100.0) * multiplier;
        prop_assert_eq!(parse_market_cap(&raw), Some(expected));
    }

    #[test]
    fn other_suffix_is_rejected(cents in arb_cents(), suffix in arb_other_suffix()) {
        let raw = format!("${}{suffix}", money(cents));
        prop_assert_eq!(parse_market_cap(&raw), None);
    }

    #[test]
    fn never_panics_on_arbitrary_input(raw in ".{0,12}") {
        let _ = parse_market_cap(&raw);
    }
}

// ── 2. Resampling calendar ───────────────────────────────────────────

proptest! {
    #[test]
    fn resampled_dates_are_ascending_weekdays_from_input(series in arb_series()) {
        let table = SeriesTable::merge(std::slice::from_ref(&series));
        let resampled = table.resample_business_days();

        prop_assert!(resampled.dates.windows(2).all(|w| w[0] < w[1]));
        for date in &resampled.dates {
            prop_assert!(!matches!(date.weekday(), Weekday::Sat | Weekday::Sun));
            prop_assert!(table.dates.iter().any(|d| business_day_bin(*d) == *date));
        }
        prop_assert_eq!(resampled.values[0].len(), resampled.len());
    }
}

// ── 3. Resampled values ──────────────────────────────────────────────

proptest! {
    #[test]
    fn bin_mean_is_bounded_by_its_observations(series in arb_series()) {
        let table = SeriesTable::merge(std::slice::from_ref(&series));
        let resampled = table.resample_business_days();

        for (date, value) in resampled.dates.iter().zip(&resampled.values[0]) {
            let members: Vec<f64> = table
                .dates
                .iter()
                .zip(&table.values[0])
                .filter(|(d, _)| business_day_bin(**d) == *date)
                .filter_map(|(_, v)| *v)
                .collect();

            match value {
                Some(mean) => {
                    let lo = members.iter().cloned().fold(f64::INFINITY, f64::min);
                    let hi = members.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                    prop_assert!(*mean >= lo - 1e-9 && *mean <= hi + 1e-9);
                }
                None => prop_assert!(members.is_empty()),
            }
        }
    }
}
