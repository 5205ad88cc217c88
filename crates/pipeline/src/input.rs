//! Immutable inputs of one analysis run.

use meridian_primitives::{MetricCatalog, ReturnSeries, Symbol};
use meridian_utils::numeric_column_names;
use polars::prelude::DataFrame;

use crate::PipelineConfig;

/// Data an [`crate::AnalysisPipeline`] runs on.
#[derive(Debug, Clone)]
pub struct PipelineInput {
    /// One row per asset: ticker, characteristics, forward returns.
    pub assets: DataFrame,
    /// Historical returns per asset.
    pub returns: Vec<(Symbol, ReturnSeries)>,
    /// Benchmark factor returns.
    pub benchmark: ReturnSeries,
    /// Candidate factor to build a mimicking portfolio for.
    pub new_factor: Option<ReturnSeries>,
    /// Characteristic names.
    pub catalog: MetricCatalog,
}

impl PipelineInput {
    /// Input with the standard catalog and no new factor.
    #[must_use]
    pub fn new(assets: DataFrame, returns: Vec<(Symbol, ReturnSeries)>, benchmark: ReturnSeries) -> Self {
        Self { assets, returns, benchmark, new_factor: None, catalog: MetricCatalog::standard() }
    }

    /// Attach a new factor.
    #[must_use]
    pub fn with_new_factor(mut self, factor: ReturnSeries) -> Self {
        self.new_factor = Some(factor);
        self
    }

    /// Replace the catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: MetricCatalog) -> Self {
        self.catalog = catalog;
        self
    }
}

/// Numeric columns of `assets` that are neither forward returns nor excluded.
#[must_use]
pub fn select_characteristics(assets: &DataFrame, config: &PipelineConfig) -> Vec<String> {
    numeric_column_names(assets)
        .into_iter()
        .filter(|name| !name.contains(&config.return_marker) && !config.excluded_columns.contains(name))
        .collect()
}
