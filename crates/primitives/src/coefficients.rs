//! Factor coefficient ("pure return") series.

use serde::{Deserialize, Serialize};

/// Named coefficients from one cross-sectional regression.
///
/// Entries keep the order of the surviving characteristics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoefficientSeries {
    entries: Vec<(String, f64)>,
}

impl CoefficientSeries {
    /// Create a series from `(characteristic, coefficient)` pairs.
    #[must_use]
    pub const fn new(entries: Vec<(String, f64)>) -> Self {
        Self { entries }
    }

    /// An empty series, signalling insufficient data.
    #[must_use]
    pub const fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Create a series from parallel name and value slices.
    #[must_use]
    pub fn from_parts(names: &[String], values: &[f64]) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { entries: names.iter().cloned().zip(values.iter().copied()).collect() }
    }

    /// Coefficient of a characteristic.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    /// Characteristic names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Coefficient values in order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, v)| *v)
    }

    /// `(name, coefficient)` pairs in order.
    #[must_use]
    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    /// Number of characteristics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply `f` to every coefficient, keeping names.
    #[must_use]
    pub fn map(&self, mut f: impl FnMut(usize, f64) -> f64) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .enumerate()
                .map(|(i, (n, v))| (n.clone(), f(i, *v)))
                .collect(),
        }
    }
}

impl FromIterator<(String, f64)> for CoefficientSeries {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}
