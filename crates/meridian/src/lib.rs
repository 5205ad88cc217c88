//! # meridian
//!
//! Cross-sectional equity analytics: which characteristics explain forward
//! returns, how stable that explanation is across horizons, and what a
//! portfolio built on it looks like under a shrinkage risk model.
//!
//! This crate re-exports the workspace components. Individual components can
//! be enabled via feature flags.
//!
//! ## Features
//!
//! - `full` (default): Enables all components
//! - `primitives`: Shared data types
//! - `traits`: Estimator, snapshot and solver seams
//! - `math`: Dense numerics
//! - `risk`: Shrinkage covariance and PSD correlation
//! - `model`: Pure-returns regression, stability aggregation, scoring
//! - `portfolio`: Factor-mimicking portfolios and the optimizer
//! - `diagnostics`: MALV, IC/IR, Hurst, idiosyncratic variance, signals
//! - `utils`: Table helpers
//! - `pipeline`: End-to-end analysis runs
//! - `cli`: The `analyze` binary
//!
//! ## Example
//!
//! ```rust,ignore
//! use meridian::pipeline::{AnalysisPipeline, PipelineInput};
//!
//! let report = AnalysisPipeline::new().run(&PipelineInput::new(assets, returns, benchmark));
//! for row in report.weighted_characteristics() {
//!     println!("{}: {:.1}%", row.characteristic, row.final_weight);
//! }
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use meridian_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use meridian_traits as traits;
#[cfg(feature = "math")]
#[doc(inline)]
pub use meridian_math as math;
#[cfg(feature = "risk")]
#[doc(inline)]
pub use meridian_risk as risk;
#[cfg(feature = "model")]
#[doc(inline)]
pub use meridian_model as model;
#[cfg(feature = "portfolio")]
#[doc(inline)]
pub use meridian_portfolio as portfolio;
#[cfg(feature = "diagnostics")]
#[doc(inline)]
pub use meridian_diagnostics as diagnostics;
#[cfg(feature = "utils")]
#[doc(inline)]
pub use meridian_utils as utils;
#[cfg(feature = "pipeline")]
#[doc(inline)]
pub use meridian_pipeline as pipeline;
