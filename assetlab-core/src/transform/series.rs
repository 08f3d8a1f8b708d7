//! Economic time-series alignment and business-day resampling.
//!
//! Given several named series, align them to a common date axis. Missing
//! observations stay missing (no forward-fill).

use crate::frame::IndexedFrame;
use crate::source::fred::FredSeries;
use crate::source::SourceError;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Several series on one shared, ascending date axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    pub dates: Vec<NaiveDate>,
    pub names: Vec<String>,
    /// One vector per name, each the same length as `dates`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl SeriesTable {
    /// Align series on the union of their dates.
    ///
    /// A date repeated within one series keeps its last observation.
    pub fn merge(series: &[FredSeries]) -> Self {
        let dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|s| s.observations.iter().map(|(d, _)| *d))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let values = series
            .iter()
            .map(|s| {
                let by_date: HashMap<NaiveDate, Option<f64>> =
                    s.observations.iter().copied().collect();
                dates
                    .iter()
                    .map(|d| by_date.get(d).copied().flatten())
                    .collect()
            })
            .collect();

        Self {
            dates,
            names: series.iter().map(|s| s.id.clone()).collect(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Rename series via `labels`; names without a label are kept.
    pub fn rename(mut self, labels: &[(&str, &str)]) -> Self {
        for name in &mut self.names {
            if let Some((_, label)) = labels.iter().find(|(id, _)| *id == name.as_str()) {
                *name = label.to_string();
            }
        }
        self
    }

    /// Drop rows where every series is missing.
    pub fn drop_all_missing(self) -> Self {
        let keep: Vec<bool> = (0..self.len())
            .map(|i| self.values.iter().any(|col| col[i].is_some()))
            .collect();

        let filter = |v: Vec<Option<f64>>| -> Vec<Option<f64>> {
            v.into_iter()
                .zip(&keep)
                .filter_map(|(x, k)| k.then_some(x))
                .collect()
        };

        Self {
            dates: self
                .dates
                .iter()
                .zip(&keep)
                .filter_map(|(d, k)| k.then_some(*d))
                .collect(),
            names: self.names,
            values: self.values.into_iter().map(filter).collect(),
        }
    }

    /// Resample to business-day frequency.
    ///
    /// Each date falls in its business-day bin (weekends roll back to Friday).
    /// A bin's value per series is the mean of its non-missing observations.
    /// Bins with no observations are not emitted.
    pub fn resample_business_days(&self) -> Self {
        // bin -> per-series (sum, count)
        let mut bins: BTreeMap<NaiveDate, Vec<(f64, usize)>> = BTreeMap::new();
        for (i, date) in self.dates.iter().enumerate() {
            let acc = bins
                .entry(business_day_bin(*date))
                .or_insert_with(|| vec![(0.0, 0); self.names.len()]);
            for (slot, col) in acc.iter_mut().zip(&self.values) {
                if let Some(v) = col[i] {
                    slot.0 += v;
                    slot.1 += 1;
                }
            }
        }

        let mut values = vec![Vec::with_capacity(bins.len()); self.names.len()];
        for acc in bins.values() {
            for (out, &(sum, n)) in values.iter_mut().zip(acc) {
                out.push((n > 0).then(|| sum / n as f64));
            }
        }

        Self {
            dates: bins.into_keys().collect(),
            names: self.names.clone(),
            values,
        }
    }

    /// Convert to a table indexed by `date`.
    pub fn to_frame(&self) -> Result<IndexedFrame, SourceError> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
            .ok_or_else(|| SourceError::Frame("invalid epoch".into()))?;
        let days: Vec<i32> = self
            .dates
            .iter()
            .map(|d| (*d - epoch).num_days() as i32)
            .collect();

        let mut columns = vec![Column::new("date".into(), days).cast(&DataType::Date)?];
        for (name, col) in self.names.iter().zip(&self.values) {
            columns.push(Column::new(name.as_str().into(), col.clone()));
        }
        IndexedFrame::new(DataFrame::new(columns)?, &["date"])
    }
}

/// Business-day bin for `date`: itself on weekdays, the preceding Friday otherwise.
pub fn business_day_bin(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date - Duration::days(2),
        _ => date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(id: &str, obs: &[(NaiveDate, Option<f64>)]) -> FredSeries {
        FredSeries {
            id: id.into(),
            observations: obs.to_vec(),
        }
    }

    #[test]
    fn weekend_rolls_back_to_friday() {
        // 2024-01-05 is a Friday
        assert_eq!(business_day_bin(d(2024, 1, 5)), d(2024, 1, 5));
        assert_eq!(business_day_bin(d(2024, 1, 6)), d(2024, 1, 5));
        assert_eq!(business_day_bin(d(2024, 1, 7)), d(2024, 1, 5));
        assert_eq!(business_day_bin(d(2024, 1, 8)), d(2024, 1, 8));
    }

    #[test]
    fn merge_uses_union_of_dates() {
        let a = series("A", &[(d(2024, 1, 2), Some(1.0)), (d(2024, 1, 3), Some(2.0))]);
        let b = series("B", &[(d(2024, 1, 3), Some(10.0)), (d(2024, 1, 4), Some(20.0))]);

        let table = SeriesTable::merge(&[a, b]);
        assert_eq!(table.dates, vec![d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4)]);
        assert_eq!(table.values[0], vec![Some(1.0), Some(2.0), None]);
        assert_eq!(table.values[1], vec![None, Some(10.0), Some(20.0)]);
    }

    #[test]
    fn all_missing_rows_are_dropped() {
        let a = series("A", &[(d(2024, 1, 1), None), (d(2024, 1, 2), Some(1.0))]);
        let b = series("B", &[(d(2024, 1, 1), None), (d(2024, 1, 2), None)]);

        let table = SeriesTable::merge(&[a, b]).drop_all_missing();
        assert_eq!(table.dates, vec![d(2024, 1, 2)]);
        assert_eq!(table.values[1], vec![None]);
    }

    #[test]
    fn resample_averages_within_a_business_day() {
        // Fri, Sat, Mon
        let a = series(
            "A",
            &[
                (d(2024, 1, 5), Some(1.0)),
                (d(2024, 1, 6), Some(3.0)),
                (d(2024, 1, 8), Some(5.0)),
            ],
        );
        let b = series("B", &[(d(2024, 1, 6), Some(7.0))]);

        let table = SeriesTable::merge(&[a, b]).resample_business_days();
        assert_eq!(table.dates, vec![d(2024, 1, 5), d(2024, 1, 8)]);
        assert_eq!(table.values[0], vec![Some(2.0), Some(5.0)]);
        assert_eq!(table.values[1], vec![Some(7.0), None]);
    }

    #[test]
    fn resample_skips_empty_business_days() {
        let a = series("A", &[(d(2024, 1, 2), Some(1.0)), (d(2024, 1, 5), Some(2.0))]);
        let table = SeriesTable::merge(&[a]).resample_business_days();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn rename_applies_labels() {
        let a = series("DGS10", &[(d(2024, 1, 2), Some(4.0))]);
        let b = series("OTHER", &[(d(2024, 1, 2), Some(4.0))]);
        let table = SeriesTable::merge(&[a, b]).rename(&[("DGS10", "10-Year Treasury CMR")]);
        assert_eq!(table.names, vec!["10-Year Treasury CMR", "OTHER"]);
    }

    #[test]
    fn to_frame_indexes_by_date() {
        let a = series("close", &[(d(2024, 1, 2), Some(4.0)), (d(2024, 1, 3), None)]);
        let frame = SeriesTable::merge(&[a]).to_frame().unwrap();

        assert_eq!(frame.index, vec!["date"]);
        assert_eq!(frame.data.column("date").unwrap().dtype(), &DataType::Date);
        let close = frame.data.column("close").unwrap().f64().unwrap();
        assert_eq!(close.get(0), Some(4.0));
        assert_eq!(close.get(1), None);
    }
}
