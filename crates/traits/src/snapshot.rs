//! Historical coefficient snapshot trait.

use meridian_primitives::{CoefficientSeries, Horizon};

/// Supplies the history of coefficient snapshots for one horizon.
///
/// Implementations may simulate history around today's coefficients or load
/// genuinely stored past regressions; stability analysis only consumes the
/// returned snapshots.
pub trait SnapshotProvider: Send + Sync {
    /// Snapshots for `horizon`, ending with `today`.
    ///
    /// Returns an empty vector when `today` is empty.
    fn snapshots(&self, horizon: Horizon, today: &CoefficientSeries) -> Vec<CoefficientSeries>;

    /// Returns the name of this provider.
    fn name(&self) -> &str;
}
