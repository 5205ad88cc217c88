//! Coefficient history providers.

use std::collections::BTreeMap;

use meridian_primitives::{CoefficientSeries, Horizon};
use meridian_traits::SnapshotProvider;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Configuration for [`SimulatedSnapshots`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Number of simulated past runs.
    pub runs: usize,
    /// Standard deviation of the per-coefficient noise.
    pub noise_std: f64,
    /// Drift added to the oldest run; decays linearly to zero toward today.
    pub drift: f64,
    /// Base seed; each horizon derives its own stream from it.
    pub seed: Option<u64>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self { runs: 12, noise_std: 0.5, drift: 0.1, seed: None }
    }
}

/// Simulated coefficient history around today's regression.
///
/// Run `i` (oldest first) is `today + N(0, noise_std) + (runs - i) / runs * drift`;
/// today's coefficients are appended as the final snapshot.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSnapshots {
    config: SnapshotConfig,
}

impl SimulatedSnapshots {
    /// Create a provider with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider with custom configuration.
    #[must_use]
    pub const fn with_config(config: SnapshotConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    fn rng_for(&self, horizon: Horizon) -> StdRng {
        self.config.seed.map_or_else(StdRng::from_entropy, |seed| {
            StdRng::seed_from_u64(seed.wrapping_add(horizon.trading_days() as u64))
        })
    }
}

impl SnapshotProvider for SimulatedSnapshots {
    fn snapshots(&self, horizon: Horizon, today: &CoefficientSeries) -> Vec<CoefficientSeries> {
        if today.is_empty() {
            return Vec::new();
        }
        let noise = match Normal::new(0.0, self.config.noise_std) {
            Ok(noise) => noise,
            Err(e) => {
                tracing::warn!("invalid snapshot noise {}: {e}; using today only", self.config.noise_std);
                return vec![today.clone()];
            }
        };

        let mut rng = self.rng_for(horizon);
        let runs = self.config.runs;
        let mut history: Vec<CoefficientSeries> = (0..runs)
            .map(|i| {
                let drift = (runs - i) as f64 / runs as f64 * self.config.drift;
                today.map(|_, v| v + noise.sample(&mut rng) + drift)
            })
            .collect();
        history.push(today.clone());
        history
    }

    fn name(&self) -> &str {
        "Simulated"
    }
}

/// Genuinely recorded coefficient history, keyed by horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSnapshots {
    history: BTreeMap<Horizon, Vec<CoefficientSeries>>,
}

impl StoredSnapshots {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a past regression for `horizon`, oldest first.
    pub fn record(&mut self, horizon: Horizon, coefficients: CoefficientSeries) {
        self.history.entry(horizon).or_default().push(coefficients);
    }

    /// Stored runs for a horizon.
    #[must_use]
    pub fn history(&self, horizon: Horizon) -> &[CoefficientSeries] {
        self.history.get(&horizon).map(Vec::as_slice).unwrap_or_default()
    }
}

impl SnapshotProvider for StoredSnapshots {
    fn snapshots(&self, horizon: Horizon, today: &CoefficientSeries) -> Vec<CoefficientSeries> {
        if today.is_empty() {
            return Vec::new();
        }
        let mut snapshots = self.history(horizon).to_vec();
        snapshots.push(today.clone());
        snapshots
    }

    fn name(&self) -> &str {
        "Stored"
    }
}
