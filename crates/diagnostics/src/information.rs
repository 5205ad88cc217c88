//! Information coefficient and information ratio.

use meridian_math::stats;
use meridian_primitives::{ReturnSeries, TRADING_DAYS_PER_YEAR, common_dates};
use serde::{Deserialize, Serialize};

use crate::DiagnosticsError;

/// Configuration for [`information_metrics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InformationConfig {
    /// Minimum overlapping observations.
    pub min_observations: usize,
    /// Periods per year.
    pub annualization: f64,
}

impl Default for InformationConfig {
    fn default() -> Self {
        Self { min_observations: 20, annualization: TRADING_DAYS_PER_YEAR }
    }
}

/// Forecast quality of one alpha series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InformationMetrics {
    /// Spearman correlation of forecast and realisation.
    pub ic: f64,
    /// Annualised mean over annualised volatility of the realisation.
    pub ir: f64,
}

impl InformationMetrics {
    /// Both metrics undefined.
    pub const UNDEFINED: Self = Self { ic: f64::NAN, ir: f64::NAN };
}

/// Compare a (pre-lagged) forecast with realised returns over their common
/// dates, ignoring non-finite pairs.
///
/// # Errors
/// Returns `InsufficientData` when fewer than `min_observations` pairs overlap.
pub fn try_information_metrics(
    forecast: &ReturnSeries,
    realized: &ReturnSeries,
    config: &InformationConfig,
) -> Result<InformationMetrics, DiagnosticsError> {
    let (alphas, returns): (Vec<f64>, Vec<f64>) = common_dates([forecast, realized])
        .into_iter()
        .filter_map(|d| Some((forecast.get(d)?, realized.get(d)?)))
        .filter(|(a, r)| a.is_finite() && r.is_finite())
        .unzip();

    if returns.len() < config.min_observations {
        return Err(DiagnosticsError::InsufficientData {
            required: config.min_observations,
            actual: returns.len(),
        });
    }

    let ic = stats::spearman(&alphas, &returns)?;
    let volatility = stats::std_dev(&returns, 0) * config.annualization.sqrt();
    let ir = if volatility == 0.0 {
        f64::NAN
    } else {
        stats::mean(&returns) * config.annualization / volatility
    };
    Ok(InformationMetrics { ic, ir })
}

/// Total variant of [`try_information_metrics`]: failures yield NaN for both.
#[must_use]
pub fn information_metrics(
    forecast: &ReturnSeries,
    realized: &ReturnSeries,
    config: &InformationConfig,
) -> InformationMetrics {
    try_information_metrics(forecast, realized, config).unwrap_or_else(|e| {
        if !e.is_recoverable() {
            tracing::warn!("information metrics failed: {e}");
        }
        InformationMetrics::UNDEFINED
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use meridian_primitives::Date;

    use super::*;

    fn series(values: &[f64]) -> ReturnSeries {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let dates: Vec<Date> = (0..values.len()).map(|i| start + chrono::Days::new(i as u64)).collect();
        ReturnSeries::new(dates, values.to_vec())
    }

    fn realized() -> Vec<f64> {
        (0..40).map(|i| ((i * 7 % 11) as f64 - 4.0) * 0.002).collect()
    }

    #[test]
    fn perfect_forecast() {
        let r = realized();
        let metrics = try_information_metrics(&series(&r), &series(&r), &InformationConfig::default()).unwrap();

        assert_relative_eq!(metrics.ic, 1.0, epsilon = 1e-12);
        let sharpe = stats::mean(&r) * 252.0 / (stats::std_dev(&r, 0) * 252.0_f64.sqrt());
        assert_relative_eq!(metrics.ir, sharpe, epsilon = 1e-12);
    }

    #[test]
    fn reversed_forecast_has_negative_ic() {
        let r = realized();
        let reversed: Vec<f64> = r.iter().map(|v| -v).collect();
        let metrics = information_metrics(&series(&reversed), &series(&r), &InformationConfig::default());
        assert_relative_eq!(metrics.ic, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn too_little_overlap_is_undefined() {
        let r = realized();
        let mut short = r[..25].to_vec();
        short[..10].fill(f64::NAN);
        let metrics = information_metrics(&series(&short), &series(&r), &InformationConfig::default());
        assert!(metrics.ic.is_nan() && metrics.ir.is_nan());
    }

    #[test]
    fn flat_realisation_has_undefined_ir() {
        let flat = vec![0.001; 30];
        let forecast: Vec<f64> = (0..30).map(f64::from).collect();
        let metrics = try_information_metrics(&series(&forecast), &series(&flat), &InformationConfig::default()).unwrap();
        assert!(metrics.ir.is_nan());
        assert!(metrics.ic.is_nan());
    }
}
