#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/meridian-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod linalg;
pub use linalg::{
    OlsFit, WlsResult, invert, ols, ridge, simple_regression, solve_linear_system,
    weighted_least_squares,
};

mod eigen;
pub use eigen::{
    DEFAULT_EIGEN_FLOOR, SymmetricEigen, min_eigenvalue, nearest_psd, symmetrize, try_nearest_psd,
};

pub mod stats;

mod scaler;
pub use scaler::RobustScaler;

mod pca;
pub use pca::Pca;

mod vif;
pub use vif::{MIN_COLUMN_VARIANCE, prune_by_vif, variance_inflation_factors};

mod error;
pub use error::MathError;
