//! Hurst exponent from (Lo-modified) rescaled-range analysis.

use meridian_math::{simple_regression, stats};
use serde::{Deserialize, Serialize};

/// Bandwidth of the autocovariance correction applied to each chunk's variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bandwidth {
    /// Lo's rule `q = ⌊1.1447 n^(1/3)⌋` for chunks longer than ten points.
    Lo,
    /// Fixed number of lags; zero gives classic R/S.
    Fixed(usize),
}

impl Bandwidth {
    fn lags(self, chunk: usize) -> usize {
        match self {
            Self::Lo if chunk > 10 => ((1.1447 * (chunk as f64).cbrt()).floor() as usize).min(chunk - 1),
            Self::Lo => 0,
            Self::Fixed(q) => q.min(chunk.saturating_sub(1)),
        }
    }
}

/// Configuration for [`hurst_exponent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HurstConfig {
    /// Shortest series analysed.
    pub min_observations: usize,
    /// Smallest chunk size.
    pub min_block: usize,
    /// Number of geometrically spaced chunk sizes tried.
    pub n_sizes: usize,
    /// Chunk sizes with a valid R/S needed for the fit.
    pub min_sizes: usize,
    /// Variance correction.
    pub bandwidth: Bandwidth,
}

impl Default for HurstConfig {
    fn default() -> Self {
        Self { min_observations: 20, min_block: 10, n_sizes: 20, min_sizes: 3, bandwidth: Bandwidth::Lo }
    }
}

/// Mean rescaled range at one chunk size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RescaledRange {
    /// Chunk length.
    pub block_size: usize,
    /// Mean R/S over the usable chunks.
    pub mean_rs: f64,
}

/// Fitted exponent with the points it was fitted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HurstEstimate {
    /// Slope of `ln(R/S)` against `ln(n)`.
    pub exponent: f64,
    /// One entry per usable chunk size.
    pub table: Vec<RescaledRange>,
}

/// Estimate the Hurst exponent of `series`, ignoring NaN observations.
///
/// The series is cut into non-overlapping chunks at each size; flat chunks
/// and chunks with a vanishing corrected variance are skipped. Returns `None`
/// when the series is too short or fewer than `min_sizes` sizes survive.
#[must_use]
pub fn hurst_exponent(series: &[f64], config: &HurstConfig) -> Option<HurstEstimate> {
    let data: Vec<f64> = series.iter().copied().filter(|v| !v.is_nan()).collect();
    let n = data.len();
    if n < config.min_observations {
        return None;
    }

    let max_block = (n / 2).min(n.saturating_sub(1));
    let min_block = config.min_block.max(2);
    if min_block >= max_block {
        return None;
    }

    let table: Vec<RescaledRange> = block_sizes(min_block, max_block, config.n_sizes)
        .into_iter()
        .filter_map(|size| {
            let ratios: Vec<f64> =
                data.chunks_exact(size).filter_map(|chunk| rescaled_range(chunk, config.bandwidth)).collect();
            (!ratios.is_empty()).then(|| RescaledRange { block_size: size, mean_rs: stats::mean(&ratios) })
        })
        .collect();

    if table.len() < config.min_sizes.max(2) {
        tracing::debug!(sizes = table.len(), "too few chunk sizes for a Hurst fit");
        return None;
    }

    let log_n: Vec<f64> = table.iter().map(|r| (r.block_size as f64).ln()).collect();
    let log_rs: Vec<f64> = table.iter().map(|r| r.mean_rs.ln()).collect();
    let (exponent, _) = simple_regression(&log_n, &log_rs).ok()?;
    exponent.is_finite().then_some(HurstEstimate { exponent, table })
}

/// Geometrically spaced sizes from `lo` to `hi` inclusive, floored and deduplicated.
fn block_sizes(lo: usize, hi: usize, count: usize) -> Vec<usize> {
    if count < 2 {
        return vec![lo, hi];
    }
    let (ln_lo, ln_hi) = ((lo as f64).ln(), (hi as f64).ln());
    let mut sizes: Vec<usize> = (0..count)
        .map(|i| match i {
            0 => lo,
            i if i == count - 1 => hi,
            i => (ln_lo + (ln_hi - ln_lo) * i as f64 / (count - 1) as f64).exp().floor() as usize,
        })
        .collect();
    sizes.dedup();
    sizes
}

fn rescaled_range(chunk: &[f64], bandwidth: Bandwidth) -> Option<f64> {
    let m = stats::mean(chunk);
    if chunk.iter().all(|x| (x - m).abs() <= 1e-10 + 1e-8 * m.abs()) {
        return None;
    }

    let mut cumulative = 0.0;
    let walk: Vec<f64> = chunk
        .iter()
        .map(|x| {
            cumulative += x - m;
            cumulative
        })
        .collect();
    let range = stats::ptp(&walk);

    let q = bandwidth.lags(chunk.len());
    let gamma = stats::autocovariances(chunk, q);
    let correction: f64 =
        (1..gamma.len()).map(|j| (1.0 - j as f64 / (q + 1) as f64) * gamma[j]).sum::<f64>() * 2.0;
    let variance = (gamma[0] + correction).max(0.0);
    if variance < 1e-12 {
        return None;
    }
    Some(range / variance.sqrt())
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, StandardNormal};
    use rstest::rstest;

    use super::*;

    fn noise(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| StandardNormal.sample(&mut rng)).collect()
    }

    #[test]
    fn white_noise_is_near_one_half() {
        let estimate = hurst_exponent(&noise(5000, 4), &HurstConfig::default()).unwrap();
        assert!((estimate.exponent - 0.5).abs() < 0.15, "H = {}", estimate.exponent);
        assert!(estimate.table.len() >= 3);
        assert_eq!(estimate.table[0].block_size, 10);
    }

    #[rstest]
    #[case::lo_default(HurstConfig::default(), 0.5)]
    #[case::classic(HurstConfig { bandwidth: Bandwidth::Fixed(0), ..HurstConfig::default() }, 0.4)]
    fn over_differenced_series_is_anti_persistent(#[case] config: HurstConfig, #[case] bound: f64) {
        let e = noise(4001, 9);
        let diffed: Vec<f64> = e.windows(2).map(|w| w[1] - w[0]).collect();
        let estimate = hurst_exponent(&diffed, &config).unwrap();
        let undifferenced = hurst_exponent(&e[1..], &config).unwrap();

        assert!(estimate.exponent < bound, "H = {}", estimate.exponent);
        assert!(estimate.exponent < undifferenced.exponent - 0.05);
    }

    #[rstest]
    #[case::too_short(vec![0.01; 15])]
    #[case::constant(vec![0.02; 500])]
    #[case::all_missing(vec![f64::NAN; 100])]
    fn undefined_estimates(#[case] series: Vec<f64>) {
        assert!(hurst_exponent(&series, &HurstConfig::default()).is_none());
    }

    #[test]
    fn nan_observations_are_dropped() {
        let mut series = noise(1000, 2);
        let clean = hurst_exponent(&series, &HurstConfig::default()).unwrap();
        series.insert(100, f64::NAN);
        series.push(f64::NAN);
        let with_gaps = hurst_exponent(&series, &HurstConfig::default()).unwrap();
        assert!((clean.exponent - with_gaps.exponent).abs() < 1e-12);
    }

    #[test]
    fn block_sizes_span_endpoints() {
        let sizes = block_sizes(10, 2500, 20);
        assert_eq!(sizes.first(), Some(&10));
        assert_eq!(sizes.last(), Some(&2500));
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(block_sizes(10, 12, 20), vec![10, 11, 12]);
    }

    #[test]
    fn lo_bandwidth() {
        assert_eq!(Bandwidth::Lo.lags(10), 0);
        assert_eq!(Bandwidth::Lo.lags(1000), 11);
        assert_eq!(Bandwidth::Fixed(50).lags(20), 19);
    }
}
