//! Single-series signal-quality metrics.

use meridian_math::{simple_regression, stats};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Windows and thresholds for [`SignalMetrics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Trailing window for the volatility autocorrelation.
    pub volatility_window: usize,
    /// Return below which a stop-loss is considered hit.
    pub stop_loss_level: f64,
    /// Trailing window for the AR(1) fit.
    pub ar_window: usize,
    /// Shortest window the AR(1) fit runs on.
    pub ar_min_observations: usize,
    /// Fewest finite lag pairs the AR(1) fit accepts.
    pub ar_min_pairs: usize,
    /// Two-sided p-value below which the AR(1) slope is reported.
    pub ar_significance: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            volatility_window: 252,
            stop_loss_level: -0.04,
            ar_window: 252,
            ar_min_observations: 20,
            ar_min_pairs: 10,
            ar_significance: 0.1,
        }
    }
}

impl SignalConfig {
    /// Mean of `ln(1 + ln(1 + r))` over strictly positive returns; NaN if there are none.
    #[must_use]
    pub fn log_log_utility(&self, returns: &[f64]) -> f64 {
        let utilities: Vec<f64> = returns.iter().filter(|&&r| r > 0.0).map(|r| r.ln_1p().ln_1p()).collect();
        let utility = stats::mean(&utilities);
        if utility.is_finite() { utility } else { f64::NAN }
    }

    /// Lag-1 autocorrelation of squared returns over the trailing window.
    ///
    /// NaN if the series is shorter than the window or fewer than two finite
    /// squares remain. Two squares form a single lag pair, which has no
    /// correlation either.
    #[must_use]
    pub fn volatility_autocorrelation(&self, returns: &[f64]) -> f64 {
        let window = self.volatility_window;
        if window == 0 || returns.len() < window {
            return f64::NAN;
        }
        let squared: Vec<f64> =
            returns[returns.len() - window..].iter().filter(|r| !r.is_nan()).map(|r| r * r).collect();
        if squared.len() < 2 {
            return f64::NAN;
        }
        stats::pearson(&squared[..squared.len() - 1], &squared[1..]).unwrap_or(f64::NAN)
    }

    /// Share of periods whose return falls below the stop-loss level.
    #[must_use]
    pub fn stop_loss_impact(&self, returns: &[f64]) -> f64 {
        if returns.is_empty() {
            return f64::NAN;
        }
        returns.iter().filter(|&&r| r < self.stop_loss_level).count() as f64 / returns.len() as f64
    }

    /// Significant AR(1) slope over the trailing window, zero otherwise.
    ///
    /// The slope of `r_t` on `r_{t-1}` is reported only when its two-sided
    /// Student-t p-value is below `ar_significance`. NaN when the series is
    /// empty, entirely missing, or too short.
    #[must_use]
    pub fn ar_coefficient(&self, returns: &[f64]) -> f64 {
        if returns.iter().all(|r| r.is_nan()) {
            return f64::NAN;
        }
        let window = self.ar_window.min(returns.len());
        if window < self.ar_min_observations {
            return f64::NAN;
        }

        let (previous, current): (Vec<f64>, Vec<f64>) = returns[returns.len() - window..]
            .windows(2)
            .map(|w| (w[0], w[1]))
            .filter(|(a, b)| a.is_finite() && b.is_finite())
            .unzip();
        if previous.len() < self.ar_min_pairs.max(3) {
            return f64::NAN;
        }

        let Ok((slope, _)) = simple_regression(&previous, &current) else { return 0.0 };
        let Ok(r) = stats::pearson(&previous, &current) else { return 0.0 };
        let p_value = two_sided_p_value(r, previous.len() - 2);
        if p_value < self.ar_significance && slope.is_finite() { slope } else { 0.0 }
    }
}

/// p-value of the t-test for a correlation `r` with `df` degrees of freedom.
fn two_sided_p_value(r: f64, df: usize) -> f64 {
    if !r.is_finite() {
        return 1.0;
    }
    let denominator = 1.0 - r * r;
    if denominator <= 0.0 {
        return 0.0;
    }
    let t = r * (df as f64 / denominator).sqrt();
    StudentsT::new(0.0, 1.0, df as f64).map_or(1.0, |dist| 2.0 * dist.sf(t.abs()))
}

/// Signal-quality metrics of one return series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalMetrics {
    /// See [`SignalConfig::log_log_utility`].
    pub log_log_utility: f64,
    /// See [`SignalConfig::volatility_autocorrelation`].
    pub volatility_autocorrelation: f64,
    /// See [`SignalConfig::stop_loss_impact`].
    pub stop_loss_impact: f64,
    /// See [`SignalConfig::ar_coefficient`].
    pub ar_coefficient: f64,
}

impl SignalMetrics {
    /// Compute every metric for `returns`.
    #[must_use]
    pub fn compute(returns: &[f64], config: &SignalConfig) -> Self {
        Self {
            log_log_utility: config.log_log_utility(returns),
            volatility_autocorrelation: config.volatility_autocorrelation(returns),
            stop_loss_impact: config.stop_loss_impact(returns),
            ar_coefficient: config.ar_coefficient(returns),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};

    use super::*;

    #[test]
    fn log_log_utility_uses_positive_returns() {
        let config = SignalConfig::default();
        let expected = (0.1_f64.ln_1p().ln_1p() + 0.2_f64.ln_1p().ln_1p()) / 2.0;
        assert_relative_eq!(config.log_log_utility(&[0.1, -0.5, 0.2, 0.0]), expected, epsilon = 1e-15);
        assert!(config.log_log_utility(&[-0.1, 0.0]).is_nan());
    }

    #[test]
    fn stop_loss_share() {
        let config = SignalConfig::default();
        assert_relative_eq!(config.stop_loss_impact(&[-0.05, 0.01, -0.04, -0.10]), 0.5);
        assert!(config.stop_loss_impact(&[]).is_nan());
    }

    #[test]
    fn volatility_regimes_autocorrelate() {
        let config = SignalConfig::default();
        let returns: Vec<f64> = (0..300)
            .map(|i| {
                let size = if (i / 50) % 2 == 0 { 0.03 } else { 0.01 };
                if i % 2 == 0 { size } else { -size }
            })
            .collect();
        assert!(config.volatility_autocorrelation(&returns) > 0.9);
        assert!(config.volatility_autocorrelation(&returns[..100]).is_nan());
    }

    #[test]
    fn volatility_autocorrelation_needs_two_lag_pairs() {
        let config = SignalConfig { volatility_window: 3, ..SignalConfig::default() };
        assert!(config.volatility_autocorrelation(&[0.1, 0.2, 0.3]) > 0.9);
        assert!(config.volatility_autocorrelation(&[0.1, f64::NAN, 0.3]).is_nan());
        assert!(config.volatility_autocorrelation(&[f64::NAN, f64::NAN, 0.3]).is_nan());

        let pair = SignalConfig { volatility_window: 2, ..SignalConfig::default() };
        assert!(pair.volatility_autocorrelation(&[0.1, 0.2]).is_nan());
    }

    #[test]
    fn autoregressive_series_reports_slope() {
        let mut rng = StdRng::seed_from_u64(5);
        let normal = Normal::new(0.0, 0.01).unwrap();
        let mut returns = vec![0.0];
        for _ in 0..400 {
            let prev = returns[returns.len() - 1];
            returns.push(0.6 * prev + normal.sample(&mut rng));
        }
        let slope = SignalConfig::default().ar_coefficient(&returns);
        assert!((slope - 0.6).abs() < 0.15, "slope {slope}");
    }

    #[test]
    fn alternating_series_is_perfectly_mean_reverting() {
        let returns: Vec<f64> = (0..60).map(|i| if i % 2 == 0 { 0.01 } else { -0.01 }).collect();
        assert_relative_eq!(SignalConfig::default().ar_coefficient(&returns), -1.0, epsilon = 1e-9);
    }

    #[test]
    fn uncorrelated_pattern_reports_zero() {
        let returns: Vec<f64> = (0..252).map(|i| if (i / 2) % 2 == 0 { 0.01 } else { -0.01 }).collect();
        assert_eq!(SignalConfig::default().ar_coefficient(&returns), 0.0);
    }

    #[test]
    fn short_or_missing_series_are_undefined() {
        let config = SignalConfig::default();
        assert!(config.ar_coefficient(&[0.01; 10]).is_nan());
        assert!(config.ar_coefficient(&[f64::NAN; 50]).is_nan());
        assert!(config.ar_coefficient(&[]).is_nan());

        let mut sparse = vec![f64::NAN; 30];
        sparse[0] = 0.01;
        sparse[1] = 0.02;
        assert!(config.ar_coefficient(&sparse).is_nan());
    }

    #[test]
    fn compute_collects_all_metrics() {
        let returns: Vec<f64> = (0..260).map(|i| ((i % 7) as f64 - 3.0) * 0.015).collect();
        let metrics = SignalMetrics::compute(&returns, &SignalConfig::default());
        assert!(metrics.log_log_utility > 0.0);
        assert!(metrics.volatility_autocorrelation.is_finite());
        assert_relative_eq!(metrics.stop_loss_impact, 38.0 / 260.0, epsilon = 1e-12);
    }
}
