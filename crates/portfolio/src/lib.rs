#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/meridian-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod solver;
pub use solver::{ProjectedGradientSolver, SolverConfig};

mod fmp;
pub use fmp::{FmpBuilder, FmpConfig};

mod optimizer;
pub use optimizer::{OptimizationInput, OptimizationMode, OptimizerConfig, PortfolioOptimizer};

mod error;
pub use error::PortfolioError;
