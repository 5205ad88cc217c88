//! Return series and return matrix definitions.

use std::collections::{BTreeMap, BTreeSet};

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::{Date, Symbol};

/// Date-indexed return series for a single asset or factor.
///
/// Dates are kept sorted and unique; duplicate dates collapse to the last
/// value supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    dates: Vec<Date>,
    values: Vec<f64>,
}

impl ReturnSeries {
    /// Create a series from `(date, value)` observations in any order.
    #[must_use]
    pub fn from_observations(observations: impl IntoIterator<Item = (Date, f64)>) -> Self {
        let collapsed: BTreeMap<Date, f64> = observations.into_iter().collect();
        let (dates, values) = collapsed.into_iter().unzip();
        Self { dates, values }
    }

    /// Create a series from parallel date and value vectors.
    #[must_use]
    pub fn new(dates: Vec<Date>, values: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        Self::from_observations(dates.into_iter().zip(values))
    }

    /// Sorted observation dates.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Observation values, aligned with [`Self::dates`].
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value on a specific date.
    #[must_use]
    pub fn get(&self, date: Date) -> Option<f64> {
        self.dates.binary_search(&date).ok().map(|i| self.values[i])
    }

    /// Values as an ndarray.
    #[must_use]
    pub fn to_array(&self) -> Array1<f64> {
        Array1::from_vec(self.values.clone())
    }

    /// Shift values forward by `periods` observations, leaving NaN at the start.
    #[must_use]
    pub fn lag(&self, periods: usize) -> Self {
        let n = self.values.len();
        let values = (0..n)
            .map(|i| if i >= periods { self.values[i - periods] } else { f64::NAN })
            .collect();
        Self { dates: self.dates.clone(), values }
    }
}

/// Time-indexed return matrix: one row per date, one column per asset.
///
/// Missing observations are stored as NaN until explicitly filled.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnPanel {
    dates: Vec<Date>,
    symbols: Vec<Symbol>,
    values: Array2<f64>,
}

impl ReturnPanel {
    /// Create a panel from raw parts.
    #[must_use]
    pub fn new(dates: Vec<Date>, symbols: Vec<Symbol>, values: Array2<f64>) -> Self {
        debug_assert_eq!(values.dim(), (dates.len(), symbols.len()));
        Self { dates, symbols, values }
    }

    /// Build a panel over the union of all dates; absent cells are NaN.
    #[must_use]
    pub fn outer(series: &[(Symbol, ReturnSeries)]) -> Self {
        let dates: Vec<Date> = series
            .iter()
            .flat_map(|(_, s)| s.dates().iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self::reindexed(dates, series)
    }

    /// Build a panel over the dates shared by every series.
    #[must_use]
    pub fn aligned(series: &[(Symbol, ReturnSeries)]) -> Self {
        let dates = common_dates(series.iter().map(|(_, s)| s));
        Self::reindexed(dates, series)
    }

    fn reindexed(dates: Vec<Date>, series: &[(Symbol, ReturnSeries)]) -> Self {
        let mut values = Array2::from_elem((dates.len(), series.len()), f64::NAN);
        for (j, (_, s)) in series.iter().enumerate() {
            for (i, date) in dates.iter().enumerate() {
                if let Some(v) = s.get(*date) {
                    values[[i, j]] = v;
                }
            }
        }
        let symbols = series.iter().map(|(sym, _)| sym.clone()).collect();
        Self { dates, symbols, values }
    }

    /// Row dates.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Column symbols.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Raw values (n_dates x n_assets).
    #[must_use]
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of dates.
    #[must_use]
    pub fn n_dates(&self) -> usize {
        self.dates.len()
    }

    /// Number of assets.
    #[must_use]
    pub fn n_assets(&self) -> usize {
        self.symbols.len()
    }

    /// Column index of a symbol.
    #[must_use]
    pub fn position(&self, symbol: &Symbol) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// Column of a symbol as a series, skipping missing cells.
    #[must_use]
    pub fn series(&self, symbol: &Symbol) -> Option<ReturnSeries> {
        let j = self.position(symbol)?;
        Some(ReturnSeries::from_observations(
            self.dates
                .iter()
                .zip(self.values.column(j))
                .filter(|(_, v)| v.is_finite())
                .map(|(d, v)| (*d, *v)),
        ))
    }

    /// Keep the most recent `window` rows.
    #[must_use]
    pub fn tail(&self, window: usize) -> Self {
        let start = self.dates.len().saturating_sub(window);
        Self {
            dates: self.dates[start..].to_vec(),
            symbols: self.symbols.clone(),
            values: self.values.slice(ndarray::s![start.., ..]).to_owned(),
        }
    }

    /// Keep only the listed symbols, in the given order; unknown symbols are skipped.
    #[must_use]
    pub fn select(&self, symbols: &[Symbol]) -> Self {
        let (kept, indices): (Vec<Symbol>, Vec<usize>) = symbols
            .iter()
            .filter_map(|s| self.position(s).map(|j| (s.clone(), j)))
            .unzip();
        Self {
            dates: self.dates.clone(),
            symbols: kept,
            values: self.values.select(Axis(1), &indices),
        }
    }

    /// Keep only rows whose date is in `dates`.
    #[must_use]
    pub fn restrict_to(&self, dates: &[Date]) -> Self {
        let wanted: BTreeSet<&Date> = dates.iter().collect();
        let rows: Vec<usize> =
            self.dates.iter().enumerate().filter(|(_, d)| wanted.contains(d)).map(|(i, _)| i).collect();
        Self {
            dates: rows.iter().map(|&i| self.dates[i]).collect(),
            symbols: self.symbols.clone(),
            values: self.values.select(Axis(0), &rows),
        }
    }

    /// Drop asset columns that have no finite observation.
    #[must_use]
    pub fn drop_empty_columns(&self) -> Self {
        let keep: Vec<Symbol> = self
            .symbols
            .iter()
            .enumerate()
            .filter(|(j, _)| self.values.column(*j).iter().any(|v| v.is_finite()))
            .map(|(_, s)| s.clone())
            .collect();
        self.select(&keep)
    }

    /// Replace missing or non-finite cells with `value`.
    #[must_use]
    pub fn fill_missing(&self, value: f64) -> Self {
        Self {
            dates: self.dates.clone(),
            symbols: self.symbols.clone(),
            values: self.values.mapv(|v| if v.is_finite() { v } else { value }),
        }
    }
}

/// Dates present in every series, sorted.
#[must_use]
pub fn common_dates<'a>(series: impl IntoIterator<Item = &'a ReturnSeries>) -> Vec<Date> {
    let mut iter = series.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };
    let mut shared: BTreeSet<Date> = first.dates().iter().copied().collect();
    for s in iter {
        let other: BTreeSet<Date> = s.dates().iter().copied().collect();
        shared = shared.intersection(&other).copied().collect();
    }
    shared.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> Date {
        Date::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn series_collapses_duplicates_and_sorts() {
        let s = ReturnSeries::from_observations([(day(3), 0.3), (day(1), 0.1), (day(3), 0.5)]);
        assert_eq!(s.dates(), &[day(1), day(3)]);
        assert_eq!(s.values(), &[0.1, 0.5]);
        assert_eq!(s.get(day(3)), Some(0.5));
        assert_eq!(s.get(day(2)), None);
    }

    #[test]
    fn series_lag_shifts_values() {
        let s = ReturnSeries::new(vec![day(1), day(2), day(3)], vec![1.0, 2.0, 3.0]);
        let lagged = s.lag(1);
        assert!(lagged.values()[0].is_nan());
        assert_eq!(&lagged.values()[1..], &[1.0, 2.0]);
    }

    #[test]
    fn outer_panel_marks_missing() {
        let a = ReturnSeries::new(vec![day(1), day(2)], vec![0.01, 0.02]);
        let b = ReturnSeries::new(vec![day(2), day(3)], vec![0.03, 0.04]);
        let panel = ReturnPanel::outer(&[("A".into(), a), ("B".into(), b)]);

        assert_eq!(panel.n_dates(), 3);
        assert!(panel.values()[[0, 1]].is_nan());
        assert!(panel.values()[[2, 0]].is_nan());

        let filled = panel.fill_missing(0.0);
        assert_eq!(filled.values()[[0, 1]], 0.0);
    }

    #[test]
    fn aligned_panel_uses_intersection() {
        let a = ReturnSeries::new(vec![day(1), day(2), day(3)], vec![0.01, 0.02, 0.03]);
        let b = ReturnSeries::new(vec![day(2), day(3), day(4)], vec![0.1, 0.2, 0.3]);
        let panel = ReturnPanel::aligned(&[("A".into(), a), ("B".into(), b)]);

        assert_eq!(panel.dates(), &[day(2), day(3)]);
        assert_eq!(panel.values()[[0, 0]], 0.02);
        assert_eq!(panel.values()[[1, 1]], 0.2);
    }

    #[test]
    fn tail_and_drop_empty_columns() {
        let a = ReturnSeries::new(vec![day(1), day(2), day(3)], vec![0.01, 0.02, 0.03]);
        let b = ReturnSeries::new(vec![day(1)], vec![0.5]);
        let panel = ReturnPanel::outer(&[("A".into(), a), ("B".into(), b)]).tail(2);

        assert_eq!(panel.n_dates(), 2);
        let cleaned = panel.drop_empty_columns();
        assert_eq!(cleaned.symbols(), &[Symbol::new("A")]);
    }

    #[test]
    fn select_reorders_and_skips_unknown() {
        let a = ReturnSeries::new(vec![day(1)], vec![1.0]);
        let b = ReturnSeries::new(vec![day(1)], vec![2.0]);
        let panel = ReturnPanel::outer(&[("A".into(), a), ("B".into(), b)]);
        let picked = panel.select(&["B".into(), "Z".into(), "A".into()]);

        assert_eq!(picked.symbols(), &[Symbol::new("B"), Symbol::new("A")]);
        assert_eq!(picked.values()[[0, 0]], 2.0);
    }
}
