//! OLS with date-clustered standard errors.
//!
//! Fits `forward = α + β · lagged + ε` on a [`Panel`] and reports inference
//! on β using the cluster-robust sandwich estimator
//!
//! ```text
//! V = c · (X'X)⁻¹ · Σ_g (X_g' e_g)(X_g' e_g)' · (X'X)⁻¹
//! c = G / (G − 1) · (N − 1) / (N − K)
//! ```
//!
//! where every date forms one cluster `g`. With one observation per date
//! this reduces to the HC1 estimator returned by
//! [`ClusteredRegressor::fit_robust`].

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, Axis, array};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use tsmom_traits::stats::MIN_STD_THRESHOLD;
use tsmom_traits::{Date, Result, TsmomError};

use crate::panel::Panel;

/// Number of estimated coefficients (intercept and slope).
const K: usize = 2;

/// Coefficient statistics for the lagged-return slope at one horizon.
///
/// Every statistic is `None` when the horizon could not be fitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Horizon in periods
    pub horizon: usize,
    /// Intercept
    pub alpha: Option<f64>,
    /// Slope on the lagged scaled return
    pub beta: Option<f64>,
    /// Standard error of the slope
    pub std_error: Option<f64>,
    /// `beta / std_error`
    pub t_stat: Option<f64>,
    /// Two-sided p-value of `t_stat`
    pub p_value: Option<f64>,
    /// Panel rows used
    pub n_obs: usize,
    /// Distinct dates in the panel
    pub n_clusters: usize,
}

impl RegressionResult {
    /// A result with every statistic undefined.
    #[must_use]
    pub const fn undefined(horizon: usize) -> Self {
        Self {
            horizon,
            alpha: None,
            beta: None,
            std_error: None,
            t_stat: None,
            p_value: None,
            n_obs: 0,
            n_clusters: 0,
        }
    }

    /// Whether a slope was estimated.
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        self.beta.is_some()
    }

    /// Whether `|t_stat| >= threshold`.
    #[must_use]
    pub fn is_significant(&self, threshold: f64) -> bool {
        self.t_stat.is_some_and(|t| t.abs() >= threshold)
    }
}

/// How residual scores are grouped in the covariance "meat".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grouping {
    ByDate,
    PerObservation,
}

/// Date-clustered OLS regressor.
#[derive(Debug, Clone)]
pub struct ClusteredRegressor {
    min_observations: usize,
}

impl Default for ClusteredRegressor {
    fn default() -> Self {
        Self::new(24)
    }
}

impl ClusteredRegressor {
    /// Creates a regressor requiring at least `min_observations` rows.
    #[must_use]
    pub const fn new(min_observations: usize) -> Self {
        Self { min_observations }
    }

    /// Minimum rows for a fit.
    #[must_use]
    pub const fn min_observations(&self) -> usize {
        self.min_observations
    }

    /// Fits the panel with standard errors clustered by date.
    ///
    /// # Errors
    ///
    /// Returns [`TsmomError::InsufficientData`] if the panel has fewer than
    /// `min_observations` rows, fewer than 2 dates, or a constant regressor.
    pub fn fit(&self, panel: &Panel) -> Result<RegressionResult> {
        self.fit_with(panel, Grouping::ByDate)
    }

    /// Fits the panel with HC1 heteroskedasticity-robust standard errors.
    ///
    /// # Errors
    ///
    /// Same conditions as [`fit`](Self::fit).
    pub fn fit_robust(&self, panel: &Panel) -> Result<RegressionResult> {
        self.fit_with(panel, Grouping::PerObservation)
    }

    fn fit_with(&self, panel: &Panel, grouping: Grouping) -> Result<RegressionResult> {
        let horizon = panel.horizon();
        let n = panel.len();
        let n_clusters = panel.n_dates();

        if n < self.min_observations.max(K + 1) {
            return Err(TsmomError::InsufficientData(format!(
                "horizon {horizon}: {n} observations, need {}",
                self.min_observations.max(K + 1)
            )));
        }
        if n_clusters < 2 {
            return Err(TsmomError::InsufficientData(format!(
                "horizon {horizon}: {n_clusters} date cluster(s), need 2"
            )));
        }

        let x = Array1::from(panel.lagged());
        let y = Array1::from(panel.forward());

        let x_mean = x.mean().unwrap_or(0.0);
        let scale = x.iter().map(|v| v.abs()).fold(0.0, f64::max).max(1.0);
        if x.std(0.0) <= MIN_STD_THRESHOLD * scale {
            return Err(TsmomError::InsufficientData(format!(
                "horizon {horizon}: lagged returns have no variation around {x_mean}"
            )));
        }

        let mut design = Array2::<f64>::ones((n, K));
        design.column_mut(1).assign(&x);

        let bread = invert_2x2(&design.t().dot(&design)).ok_or_else(|| {
            TsmomError::InsufficientData(format!("horizon {horizon}: singular design matrix"))
        })?;

        let coef = bread.dot(&design.t().dot(&y));
        let residuals = &y - &design.dot(&coef);

        let scores: Vec<Array1<f64>> = match grouping {
            Grouping::ByDate => {
                let mut by_date: BTreeMap<Date, Array1<f64>> = BTreeMap::new();
                for ((date, row), e) in panel.dates().into_iter().zip(design.rows()).zip(&residuals)
                {
                    let score = by_date.entry(date).or_insert_with(|| Array1::zeros(K));
                    score.scaled_add(*e, &row);
                }
                by_date.into_values().collect()
            }
            Grouping::PerObservation => design
                .rows()
                .into_iter()
                .zip(&residuals)
                .map(|(row, e)| &row * *e)
                .collect(),
        };

        let g = scores.len() as f64;
        let mut meat = Array2::<f64>::zeros((K, K));
        for s in &scores {
            let s = s.view().insert_axis(Axis(1));
            meat += &s.dot(&s.t());
        }

        let nf = n as f64;
        let kf = K as f64;
        let correction = g / (g - 1.0) * (nf - 1.0) / (nf - kf);
        let cov = bread.dot(&meat).dot(&bread) * correction;

        let beta = coef[1];
        let std_error = Some(cov[[1, 1]]).filter(|v| *v > 0.0).map(f64::sqrt);
        let t_stat = std_error.map(|se| beta / se).filter(|t| t.is_finite());
        let p_value = t_stat.and_then(|t| two_sided_p_value(t, nf - kf));

        Ok(RegressionResult {
            horizon,
            alpha: Some(coef[0]),
            beta: Some(beta),
            std_error,
            t_stat,
            p_value,
            n_obs: n,
            n_clusters,
        })
    }
}

fn invert_2x2(m: &Array2<f64>) -> Option<Array2<f64>> {
    let det = m[[0, 0]] * m[[1, 1]] - m[[0, 1]] * m[[1, 0]];
    if !det.is_finite() || det.abs() < f64::EPSILON {
        return None;
    }
    Some(array![[m[[1, 1]], -m[[0, 1]]], [-m[[1, 0]], m[[0, 0]]]] / det)
}

/// Two-sided p-value of `t` under Student's t with `dof` degrees of freedom.
fn two_sided_p_value(t: f64, dof: f64) -> Option<f64> {
    let dist = StudentsT::new(0.0, 1.0, dof).ok()?;
    Some((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}
