#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/meridian-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod mahalanobis;
pub use mahalanobis::{MahalanobisResult, mahalanobis, try_mahalanobis};

mod information;
pub use information::{
    InformationConfig, InformationMetrics, information_metrics, try_information_metrics,
};

mod hurst;
pub use hurst::{Bandwidth, HurstConfig, HurstEstimate, RescaledRange, hurst_exponent};

mod idiosyncratic;
pub use idiosyncratic::{idiosyncratic_variance, try_idiosyncratic_variance};

mod signals;
pub use signals::{SignalConfig, SignalMetrics};

mod error;
pub use error::DiagnosticsError;
