#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/meridian-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod pure_returns;
pub use pure_returns::{PureReturnsEstimator, RegressorConfig};

mod snapshots;
pub use snapshots::{SimulatedSnapshots, SnapshotConfig, StoredSnapshots};

mod stability;
pub use stability::{STABILITY_EPSILON, analyze_stability};

mod aggregate;
pub use aggregate::{AggregationResult, AggregatorConfig, StabilityAggregator, aggregate_stability};

mod scoring;
pub use scoring::{CompositeScorer, ScoringConfig};

mod error;
pub use error::ModelError;

/// Re-export commonly used types.
pub mod prelude {
    pub use meridian_traits::{CoefficientEstimator, SnapshotProvider};

    pub use super::{
        AggregationResult, CompositeScorer, ModelError, PureReturnsEstimator, StabilityAggregator,
    };
}
