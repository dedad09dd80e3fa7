//! Ex-ante volatility estimators.
//!
//! Two estimators are provided:
//! - Rolling: sample or population standard deviation over a trailing window
//! - EWMA: exponentially-weighted, mean-adjusted variance
//!
//! Both annualize by the square root of the periods per year and shift their
//! output forward by a configurable lag so the value attributed to a date only
//! uses returns observed strictly before it.

mod ewma;
mod rolling;

pub use ewma::{EwmaConfig, EwmaEstimator};
pub use rolling::{RollingStdConfig, RollingStdEstimator};

/// Shifts `values` forward by `lag` positions, filling the head with `None`.
fn shift(values: Vec<Option<f64>>, lag: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut shifted = vec![None; lag.min(n)];
    shifted.extend(values.into_iter().take(n.saturating_sub(lag)));
    shifted
}
