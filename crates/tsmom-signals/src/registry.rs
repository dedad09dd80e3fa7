//! Estimator registry for discovering and constructing volatility estimators.
//!
//! This module provides metadata about every estimator in the
//! tsmom-signals library and builds the estimator a [`SweepConfig`] asks for.

use serde::{Deserialize, Serialize};
use tsmom_traits::{SweepConfig, VolatilityEstimator, VolatilityKind};

use crate::volatility::{EwmaConfig, EwmaEstimator, RollingStdConfig, RollingStdEstimator};

/// Metadata about a volatility estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorInfo {
    /// Unique identifier for the estimator
    pub name: &'static str,

    /// Estimator kind selected by this entry
    pub kind: VolatilityKind,

    /// Human-readable description
    pub description: &'static str,

    /// Typical window in trading days
    pub typical_window: usize,
}

/// Get information about all available estimators.
#[must_use]
pub fn available_estimators() -> Vec<EstimatorInfo> {
    vec![
        EstimatorInfo {
            name: VolatilityKind::RollingStd.as_str(),
            kind: VolatilityKind::RollingStd,
            description: "Equal-weighted standard deviation over a trailing window",
            typical_window: 60,
        },
        EstimatorInfo {
            name: VolatilityKind::Ewma.as_str(),
            kind: VolatilityKind::Ewma,
            description: "Exponentially-weighted standard deviation, 60-day centre of mass",
            typical_window: 60,
        },
    ]
}

/// Get information about a specific estimator by name.
#[must_use]
pub fn get_estimator_info(name: &str) -> Option<EstimatorInfo> {
    let kind = name.parse::<VolatilityKind>().ok()?;
    available_estimators()
        .into_iter()
        .find(|info| info.kind == kind)
}

/// Builds the estimator selected by `config`, shifted forward by `lag` dates.
#[must_use]
pub fn create_estimator(config: &SweepConfig, lag: usize) -> Box<dyn VolatilityEstimator> {
    match config.vol_estimator_kind {
        VolatilityKind::RollingStd => Box::new(RollingStdEstimator::new(RollingStdConfig {
            window: config.vol_window,
            lag,
            ddof: config.ddof,
            periods_per_year: config.periods_per_year,
        })),
        VolatilityKind::Ewma => Box::new(EwmaEstimator::new(EwmaConfig {
            window: config.vol_window,
            lag,
            decay: config.ewma_decay,
            periods_per_year: config.periods_per_year,
        })),
    }
}
