#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/meridian-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;
pub use config::PipelineConfig;

mod input;
pub use input::{PipelineInput, select_characteristics};

mod report;
pub use report::{AssetScore, DiagnosticsReport, PipelineReport};

mod pipeline;
pub use pipeline::AnalysisPipeline;

mod error;
pub use error::PipelineError;
