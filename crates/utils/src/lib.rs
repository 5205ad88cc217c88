#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/meridian-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod columns;
pub use columns::{numeric_column, numeric_column_names, numeric_matrix, string_column};

mod rank;
pub use rank::{pct_rank, top_n};

mod error;
pub use error::UtilsError;
