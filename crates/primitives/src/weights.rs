//! Portfolio weight definitions.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::Symbol;

/// Asset-indexed portfolio weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioWeights {
    symbols: Vec<Symbol>,
    weights: Array1<f64>,
}

impl PortfolioWeights {
    /// Create weights from symbols and values.
    #[must_use]
    pub fn new(symbols: Vec<Symbol>, weights: Array1<f64>) -> Self {
        debug_assert_eq!(symbols.len(), weights.len());
        Self { symbols, weights }
    }

    /// Uniform weights summing to one.
    #[must_use]
    pub fn equal(symbols: Vec<Symbol>) -> Self {
        let n = symbols.len();
        let weights = if n == 0 { Array1::zeros(0) } else { Array1::from_elem(n, 1.0 / n as f64) };
        Self { symbols, weights }
    }

    /// Asset symbols.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Weight values.
    #[must_use]
    pub const fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    /// Weight of a symbol.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.symbols.iter().position(|s| s.as_str() == symbol).map(|i| self.weights[i])
    }

    /// Net exposure: sum of weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.weights.sum()
    }

    /// Gross exposure: sum of absolute weights.
    #[must_use]
    pub fn gross(&self) -> f64 {
        self.weights.iter().map(|w| w.abs()).sum()
    }

    /// Number of assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// `(symbol, weight)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, f64)> {
        self.symbols.iter().zip(self.weights.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn equal_weights_sum_to_one() {
        let w = PortfolioWeights::equal(vec!["A".into(), "B".into(), "C".into(), "D".into()]);
        assert_relative_eq!(w.sum(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(w.get("C").unwrap(), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn gross_exposure_counts_shorts() {
        let w = PortfolioWeights::new(vec!["A".into(), "B".into()], array![0.75, -0.25]);
        assert_relative_eq!(w.sum(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(w.gross(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_universe() {
        let w = PortfolioWeights::equal(Vec::new());
        assert!(w.is_empty());
        assert_eq!(w.sum(), 0.0);
    }
}
