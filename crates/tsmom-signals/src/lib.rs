//! Volatility estimators and scaled return construction for tsmom.
//!
//! This crate provides the per-instrument building blocks of the sweep:
//! - Volatility: rolling standard deviation and EWMA estimators
//! - Scaled returns: forward and lagged returns divided by ex-ante volatility
//! - Registry: estimator discovery and construction from a sweep config
//!
//! # Example
//!
//! ```ignore
//! use tsmom_signals::{ScaledReturnBuilder, registry::create_estimator};
//! use tsmom_traits::SweepConfig;
//!
//! let config = SweepConfig::default();
//! let estimator = create_estimator(&config, 0);
//! let vol = estimator.estimate(series.dates(), &series.simple_returns());
//!
//! let pairs = ScaledReturnBuilder::new((&config).into()).build(&series, &vol, 12)?;
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod registry;
pub mod scaled;
pub mod volatility;

// Re-export key types
pub use registry::{EstimatorInfo, create_estimator};
pub use scaled::{RawReturnPair, ScaledReturn, ScaledReturnBuilder, ScaledReturnConfig};
pub use volatility::{EwmaConfig, EwmaEstimator, RollingStdConfig, RollingStdEstimator};
