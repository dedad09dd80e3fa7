#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tsmom/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and trait definitions for the tsmom research framework.
//!
//! This crate provides the data model shared by every stage of the
//! time-series momentum pipeline: price and volatility series, the
//! asset-class dataset, the sweep configuration, the volatility estimator
//! abstraction and the error type.

/// The version of the tsmom-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod config;
pub mod error;
pub mod estimator;
pub mod stats;
pub mod types;

// Re-exports
pub use config::{SweepConfig, VolatilityKind};
pub use error::{Result, TsmomError};
pub use estimator::VolatilityEstimator;
pub use types::{
    AssetClass, AssetClassDataset, CE_TO_UNIX_EPOCH_DAYS, Date, InstrumentId, POOLED, PriceFrame,
    PriceSeries, VolatilitySeries,
};
