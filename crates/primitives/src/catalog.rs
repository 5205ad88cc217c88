//! Read-only lookup tables: metric display names and sector ETFs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const STANDARD_METRICS: &[(&str, &str)] = &[
    ("Market_Cap", "Market-Cap"),
    ("Dividend_Yield", "Dividend Yield"),
    ("PE_Ratio", "P/E"),
    ("EPS_Diluted", "Earnings Per Share, Diluted"),
    ("Sales_Per_Share", "Sales Per Share"),
    ("FCF_Per_Share", "Free Cash Flow Per Share"),
    ("Asset_Turnover", "Asset Turnover"),
    ("CapEx_to_DepAmor", "CapEx / (Depr + Amor)"),
    ("Current_Ratio", "Current Ratio"),
    ("Debt_Ratio", "Debt Ratio"),
    ("Dividends_to_FCF", "Dividends / FCF"),
    ("Gross_Profit_Margin", "Gross Profit Margin"),
    ("Interest_Coverage", "Interest Coverage"),
    ("Inventory_Turnover", "Inventory Turnover"),
    ("Net_Profit_Margin", "Net Profit Margin"),
    ("Quick_Ratio", "Quick Ratio"),
    ("ROA", "Return on Assets"),
    ("ROE", "Return on Equity"),
    ("Share_Buyback_to_FCF", "Share Buyback / FCF"),
    ("Dividends_Plus_Buyback_to_FCF", "(Dividends + Share Buyback) / FCF"),
    ("Assets_Growth_TTM", "Assets Growth TTM"),
    ("Earnings_Growth_TTM", "Earnings Growth TTM"),
    ("FCF_Growth_TTM", "FCF Growth TTM"),
    ("Sales_Growth_TTM", "Sales Growth TTM"),
    ("Assets_Growth_QOQ", "Assets Growth QOQ"),
    ("Earnings_Growth_QOQ", "Earnings Growth QOQ"),
    ("FCF_Growth_QOQ", "FCF Growth QOQ"),
    ("Sales_Growth_QOQ", "Sales Growth QOQ"),
    ("Assets_Growth_YOY", "Assets Growth YOY"),
    ("Earnings_Growth_YOY", "Earnings Growth YOY"),
    ("FCF_Growth_YOY", "FCF Growth YOY"),
    ("Sales_Growth_YOY", "Sales Growth YOY"),
    ("FCF_Yield", "FCF Yield"),
    ("Earnings_Yield", "Earnings Yield"),
    ("PS_Ratio", "P/Sales"),
    ("Free_Cash_Flow", "Free Cash Flow"),
    ("Operating_Margin", "Operating Margin"),
    ("FCF_to_Net_Income", "Free Cash Flow to Net Income"),
    ("Liabilities_to_Equity", "Liabilities to Equity Ratio"),
    ("Dividend_Payout_Ratio", "Dividend Payout Ratio"),
    ("Operating_Leverage", "Operating Leverage"),
    ("Piotroski_F-Score", "Piotroski F-Score"),
    ("ROIC", "Return On Invested Capital"),
    ("Cash_ROIC", "Cash Return On Invested Capital"),
    ("Sharpe_Ratio", "Sharpe Ratio"),
    ("Relative_Z_Score", "Relative Z-Score"),
    ("Rolling_Market_Correlation", "Market Correlation"),
    ("Correlation_Score", "Correlation_Score"),
    ("Trend", "Trend"),
    ("Q_Score", "Q Score"),
    ("Coverage_Score", "Coverage Score"),
    ("Beta_to_SPY", "Beta_to_SPY"),
    ("GARCH_Vol", "GARCH_Vol"),
    ("Vision", "Vision"),
    ("Value_Factor", "Value Factor"),
    ("Profitability_Factor", "Profitability Factor"),
    ("Log_Log_Utility", "Log_Log_Utility"),
    ("Vol_Autocorr", "Vol_Autocorr"),
    ("Log_Log_Sharpe", "Log_Log_Sharpe"),
    ("Stop_Loss_Impact", "Stop_Loss_Impact"),
    ("AR_Coeff", "AR_Coeff"),
    ("Tangible_Book_Value", "Tangible Book Value"),
    ("Return_On_Tangible_Equity", "Return on Tangible Equity"),
    ("Insider_Ownership_Ratio", "Insider Ownership Ratio"),
    ("Earnings_Growth_Rate_5y", "5-Year Earnings Growth Rate"),
    ("Peter_Lynch_Fair_Value", "Peter Lynch Fair Value"),
    ("Peter_Lynch_Fair_Value_Upside", "Peter Lynch Fair Value Upside"),
    ("Revenue_Growth_Rate_5y", "5-Year Revenue Growth Rate"),
    ("Meets_Triple_Rule", "Meets Triple Rule"),
    ("Audit_Risk", "Audit Risk"),
    ("Board_Risk", "Board Risk"),
    ("Compensation_Risk", "Compensation Risk"),
    ("Shareholder_Rights_Risk", "Shareholder Rights Risk"),
    ("Overall_Risk", "Overall Risk"),
    ("Institutional_Ownership_Ratio", "Institutional Ownership Ratio"),
    ("Hurst_Exponent", "Hurst Exponent (Lo's R/S)"),
    ("Momentum", "Momentum"),
    ("Growth", "Growth"),
];

const STANDARD_SECTOR_ETFS: &[(&str, &str)] = &[
    ("Technology", "XLK"),
    ("Consumer Cyclical", "XLY"),
    ("Communication Services", "XLC"),
    ("Financial Services", "XLF"),
    ("Industrials", "XLI"),
    ("Basic Materials", "XLB"),
    ("Energy", "XLE"),
    ("Real Estate", "XLRE"),
    ("Healthcare", "XLV"),
    ("Consumer Defensive", "XLP"),
    ("Utilities", "XLU"),
];

/// Immutable mapping between characteristic column names and display names.
///
/// Aggregated scoring weights are keyed by display name and cover every
/// metric in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricCatalog {
    entries: Vec<(String, String)>,
}

impl MetricCatalog {
    /// Build a catalog from `(short_name, display_name)` pairs.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self { entries: entries.into_iter().collect() }
    }

    /// The standard equity metric catalog.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(STANDARD_METRICS.iter().map(|(s, d)| ((*s).to_string(), (*d).to_string())))
    }

    /// Display name for a short name; unknown names map to themselves.
    #[must_use]
    pub fn display_name<'a>(&'a self, short: &'a str) -> &'a str {
        self.entries.iter().find(|(s, _)| s == short).map_or(short, |(_, d)| d.as_str())
    }

    /// Short name for a display name.
    #[must_use]
    pub fn short_name(&self, display: &str) -> Option<&str> {
        self.entries.iter().find(|(_, d)| d == display).map(|(s, _)| s.as_str())
    }

    /// Every display name, in catalog order.
    pub fn display_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, d)| d.as_str())
    }

    /// Whether a display name belongs to the catalog.
    #[must_use]
    pub fn contains_display(&self, display: &str) -> bool {
        self.entries.iter().any(|(_, d)| d == display)
    }

    /// Number of metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Immutable sector to sector-ETF mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorEtfMap {
    map: BTreeMap<String, String>,
}

impl SectorEtfMap {
    /// Build a map from `(sector, etf)` pairs.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self { map: entries.into_iter().collect() }
    }

    /// The standard SPDR sector ETF map.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(STANDARD_SECTOR_ETFS.iter().map(|(s, e)| ((*s).to_string(), (*e).to_string())))
    }

    /// ETF ticker for a sector.
    #[must_use]
    pub fn etf(&self, sector: &str) -> Option<&str> {
        self.map.get(sector).map(String::as_str)
    }

    /// Distinct ETF tickers.
    #[must_use]
    pub fn etfs(&self) -> Vec<&str> {
        let mut etfs: Vec<&str> = self.map.values().map(String::as_str).collect();
        etfs.sort_unstable();
        etfs.dedup();
        etfs
    }
}

impl Default for SectorEtfMap {
    fn default() -> Self {
        Self::standard()
    }
}
