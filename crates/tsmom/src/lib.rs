#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tsmom/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # tsmom
//!
//! Time-series momentum horizon research.
//!
//! tsmom is an umbrella crate that re-exports all tsmom sub-crates for
//! convenience. It provides one import path for the data model, the
//! volatility estimators, and the panel regression sweep.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tsmom::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let dataset = PriceFrame::new(frame).into_dataset()?;
//! let runner = HorizonSweepRunner::new(SweepConfig::default())?;
//! let table = runner.run(&dataset)?;
//!
//! for r in table.group(POOLED).unwrap_or_default() {
//!     println!("h={:>2} t={:?}", r.horizon, r.t_stat);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Data model, configuration, errors and the [`VolatilityEstimator`] trait
//! - [`signals`] - Volatility estimators and scaled return construction
//! - [`eval`] - Panels, clustered regression, horizon sweeps and the illustrative portfolio
//!
//! ## Pipeline
//!
//! 1. **Volatility** is estimated per instrument from daily simple returns
//! 2. **Scaled returns** divide forward and lagged returns by ex-ante volatility
//! 3. **Panels** stack every instrument of a group at one horizon
//! 4. **Regression** fits forward on lagged scaled returns, clustering by date
//! 5. **Sweeps** repeat 1-4 for every asset class and the pooled union

/// Version information for the tsmom crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Types
// ============================================================================

/// Core types and trait definitions.
///
/// - [`VolatilityEstimator`] - Backward-looking volatility series
/// - [`SweepConfig`] - Every tunable of a sweep, loadable from TOML
/// - [`AssetClassDataset`] - Price series grouped by asset class
pub mod traits {
    pub use tsmom_traits::*;
}

pub use tsmom_traits::{
    AssetClassDataset, Date, POOLED, PriceFrame, PriceSeries, Result, SweepConfig, TsmomError,
    VolatilityEstimator, VolatilityKind, VolatilitySeries,
};

// ============================================================================
// Volatility and Scaled Returns
// ============================================================================

/// Volatility estimators and scaled return construction.
///
/// ## Estimators
///
/// - **RollingStdEstimator**: equal-weighted standard deviation over a window
/// - **EwmaEstimator**: exponentially-weighted, mean-adjusted standard deviation
///
/// Both annualize by `√periods_per_year` and shift forward by their lag.
///
/// ## Scaled returns
///
/// ```text
/// forward_scaled(t) = (p[t+F] / p[t] - 1) / σ[t - lag]
/// lagged_scaled(t)  = (p[t] / p[t-L] - 1) / σ[t - L - lag]
/// ```
pub mod signals {
    pub use tsmom_signals::*;
}

// ============================================================================
// Evaluation
// ============================================================================

/// Panel regression, horizon sweeps and portfolio evaluation.
///
/// ## Clustered standard errors
///
/// Observations that share a date share market-wide shocks. The regressor
/// sums residual scores per date before forming the sandwich covariance:
///
/// ```text
/// V = c · (X'X)⁻¹ · Σ_g s_g s_g' · (X'X)⁻¹,   c = G/(G−1) · (N−1)/(N−K)
/// ```
///
/// A horizon with fewer than `min_observations` rows or a single date is
/// recorded with undefined statistics; the sweep continues.
pub mod eval {
    pub use tsmom_eval::*;
}

pub use tsmom_eval::{HorizonProfile, HorizonSweepRunner, RegressionResult, ResultsTable};

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use tsmom::prelude::*;
/// ```
pub mod prelude {
    pub use crate::eval::{
        ClusteredRegressor, HorizonProfile, HorizonSweepRunner, Panel, PanelAssembler,
        RegressionResult, ResultsTable,
    };
    pub use crate::signals::{ScaledReturnBuilder, create_estimator};
    pub use crate::traits::{
        AssetClassDataset, Date, POOLED, PriceFrame, PriceSeries, Result, SweepConfig,
        TsmomError, VolatilityEstimator, VolatilityKind,
    };
}
