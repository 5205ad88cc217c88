#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/meridian-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod ledoit_wolf;
pub use ledoit_wolf::{LedoitWolfConfig, LedoitWolfEstimator};

mod model;
pub use model::{RiskConfig, RiskModel, RiskView};

mod error;
pub use error::CovarianceError;
