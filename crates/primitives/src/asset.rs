//! Asset and horizon type definitions.

use std::fmt;

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Stock ticker symbol.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Into, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Symbol(pub String);

impl Symbol {
    /// Create a new symbol.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An asset of the analysed universe.
///
/// Characteristic values and return histories live in the asset table and
/// the return panel; this type only carries identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// Optional sector classification.
    pub sector: Option<String>,
}

impl Asset {
    /// Create a new asset.
    #[must_use]
    pub const fn new(symbol: Symbol, sector: Option<String>) -> Self {
        Self { symbol, sector }
    }

    /// Create an asset without a sector tag.
    #[must_use]
    pub const fn unclassified(symbol: Symbol) -> Self {
        Self { symbol, sector: None }
    }
}

/// Forward-return horizon used as a regression target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Horizon {
    /// One month (21 trading days).
    #[serde(rename = "1M")]
    OneMonth,
    /// Three months (63 trading days).
    #[serde(rename = "3M")]
    ThreeMonths,
    /// Six months (126 trading days).
    #[serde(rename = "6M")]
    SixMonths,
    /// Twelve months (252 trading days).
    #[default]
    #[serde(rename = "12M")]
    TwelveMonths,
}

impl Horizon {
    /// All horizons, shortest first.
    pub const ALL: [Self; 4] = [Self::OneMonth, Self::ThreeMonths, Self::SixMonths, Self::TwelveMonths];

    /// Number of trading days spanned by the horizon.
    #[must_use]
    pub const fn trading_days(self) -> usize {
        match self {
            Self::OneMonth => 21,
            Self::ThreeMonths => 63,
            Self::SixMonths => 126,
            Self::TwelveMonths => 252,
        }
    }

    /// Short label, e.g. `3M`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::SixMonths => "6M",
            Self::TwelveMonths => "12M",
        }
    }

    /// Name of the forward-return column in the asset table.
    #[must_use]
    pub fn target_column(self) -> String {
        format!("Return_{}d", self.trading_days())
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn symbol_from_str() {
        let sym: Symbol = "AAPL".into();
        assert_eq!(sym.as_str(), "AAPL");
        assert_eq!(sym.to_string(), "AAPL");
    }

    #[test]
    fn asset_creation() {
        let asset = Asset::new(Symbol::new("GOOG"), Some("Technology".to_string()));
        assert_eq!(asset.symbol.as_str(), "GOOG");
        assert_eq!(asset.sector.as_deref(), Some("Technology"));
        assert!(Asset::unclassified(Symbol::new("X")).sector.is_none());
    }

    #[rstest]
    #[case(Horizon::OneMonth, "Return_21d", "1M")]
    #[case(Horizon::ThreeMonths, "Return_63d", "3M")]
    #[case(Horizon::SixMonths, "Return_126d", "6M")]
    #[case(Horizon::TwelveMonths, "Return_252d", "12M")]
    fn horizon_columns(#[case] horizon: Horizon, #[case] column: &str, #[case] label: &str) {
        assert_eq!(horizon.target_column(), column);
        assert_eq!(horizon.label(), label);
    }
}
