//! Panel regression and horizon sweeps for tsmom.
//!
//! This crate turns per-instrument scaled returns into inference on
//! time-series momentum:
//! - Panels: uniquely keyed long-format observations per group and horizon
//! - Regression: OLS with standard errors clustered by date
//! - Sweep: every asset class and the pooled union across horizons 1..=60
//! - Profile: momentum and reversal horizons of a finished sweep
//! - Portfolio: an illustrative equal-weighted momentum strategy
//!
//! # Example
//!
//! ```rust,ignore
//! use tsmom_eval::{HorizonProfile, HorizonSweepRunner};
//! use tsmom_traits::{POOLED, SweepConfig};
//!
//! let table = HorizonSweepRunner::new(SweepConfig::default())?.run(&dataset)?;
//! let profile = HorizonProfile::analyze(table.group(POOLED).unwrap(), 2.0);
//! println!("reversal from horizon {:?}", profile.crossover);
//! ```

pub mod panel;
pub mod portfolio;
pub mod profile;
pub mod regression;
pub mod results;
pub mod sweep;

// Re-export main types
pub use panel::{Panel, PanelAssembler, ScaledReturnObservation};
pub use portfolio::{PerformanceSummary, PortfolioConfig, PortfolioResult, Rebalance, TsmomPortfolio};
pub use profile::{DEFAULT_T_THRESHOLD, HorizonProfile};
pub use regression::{ClusteredRegressor, RegressionResult};
pub use results::ResultsTable;
pub use sweep::HorizonSweepRunner;
