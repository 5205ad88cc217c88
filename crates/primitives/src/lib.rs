#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/meridian-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod asset;
pub use asset::{Asset, Horizon, Symbol};

mod catalog;
pub use catalog::{MetricCatalog, SectorEtfMap};

mod coefficients;
pub use coefficients::CoefficientSeries;

mod returns;
pub use returns::{ReturnPanel, ReturnSeries, common_dates};

mod stability;
pub use stability::{RationaleRow, StabilityRecord, StabilityTable};

mod weights;
pub use weights::PortfolioWeights;

/// Re-export common date type.
pub type Date = chrono::NaiveDate;

/// Trading days per year used for annualisation.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
