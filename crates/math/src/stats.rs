//! Descriptive, order and rank statistics over slices.

use crate::MathError;

/// Arithmetic mean; NaN for empty input.
#[must_use]
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Variance with `ddof` delta degrees of freedom; NaN when `len <= ddof`.
#[must_use]
pub fn variance(data: &[f64], ddof: usize) -> f64 {
    let n = data.len();
    if n <= ddof {
        return f64::NAN;
    }
    let m = mean(data);
    data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - ddof) as f64
}

/// Standard deviation with `ddof` delta degrees of freedom.
#[must_use]
pub fn std_dev(data: &[f64], ddof: usize) -> f64 {
    variance(data, ddof).sqrt()
}

/// Linearly interpolated quantile (`q` in `[0, 1]`) of the data.
///
/// # Errors
/// Returns error if the data is empty or `q` is outside `[0, 1]`.
pub fn quantile(data: &[f64], q: f64) -> Result<f64, MathError> {
    if !(0.0..=1.0).contains(&q) {
        return Err(MathError::InvalidQuantile(q));
    }
    if data.is_empty() {
        return Err(MathError::EmptyData);
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Median of the data.
///
/// # Errors
/// Returns error if the data is empty.
pub fn median(data: &[f64]) -> Result<f64, MathError> {
    quantile(data, 0.5)
}

/// Interquartile range `q75 - q25`.
///
/// # Errors
/// Returns error if the data is empty.
pub fn iqr(data: &[f64]) -> Result<f64, MathError> {
    Ok(quantile(data, 0.75)? - quantile(data, 0.25)?)
}

/// Peak-to-peak range `max - min`.
#[must_use]
pub fn ptp(data: &[f64]) -> f64 {
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    max - min
}

/// 1-based ranks with ties assigned their average rank.
#[must_use]
pub fn average_ranks(data: &[f64]) -> Vec<f64> {
    let n = data.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| data[a].total_cmp(&data[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && data[order[j + 1]] == data[order[i]] {
            j += 1;
        }
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }
    ranks
}

/// Pearson correlation; NaN if either side has zero variance.
///
/// # Errors
/// Returns error if lengths differ or fewer than two points are given.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64, MathError> {
    if x.len() != y.len() {
        return Err(MathError::DimensionMismatch { expected: x.len(), actual: y.len() });
    }
    if x.len() < 2 {
        return Err(MathError::InsufficientData { required: 2, actual: x.len() });
    }
    let mx = mean(x);
    let my = mean(y);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return Ok(f64::NAN);
    }
    Ok(sxy / (sxx * syy).sqrt())
}

/// Spearman rank correlation (Pearson correlation of average ranks).
///
/// # Errors
/// Returns error if lengths differ or fewer than two points are given.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<f64, MathError> {
    if x.len() != y.len() {
        return Err(MathError::DimensionMismatch { expected: x.len(), actual: y.len() });
    }
    pearson(&average_ranks(x), &average_ranks(y))
}

/// Biased (divide-by-n) autocovariances for lags `0..=max_lag`.
#[must_use]
pub fn autocovariances(data: &[f64], max_lag: usize) -> Vec<f64> {
    let n = data.len();
    if n == 0 {
        return Vec::new();
    }
    let m = mean(data);
    (0..=max_lag.min(n - 1))
        .map(|lag| {
            (0..n - lag).map(|t| (data[t] - m) * (data[t + lag] - m)).sum::<f64>() / n as f64
        })
        .collect()
}

/// Standardise to zero mean and unit sample standard deviation.
///
/// A zero (or undefined) deviation leaves the data centered but unscaled.
#[must_use]
pub fn zscore(data: &[f64]) -> Vec<f64> {
    let m = mean(data);
    let sd = std_dev(data, 1);
    let divisor = if sd.is_finite() && sd > 0.0 { sd } else { 1.0 };
    data.iter().map(|x| (x - m) / divisor).collect()
}
