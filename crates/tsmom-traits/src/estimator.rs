//! Volatility estimator trait.
//!
//! This module defines the `VolatilityEstimator` trait, the abstraction used
//! to turn an instrument's return series into an ex-ante volatility series
//! that scales forward and lagged returns.

use crate::{Date, VolatilitySeries};

/// A backward-looking volatility estimator.
///
/// Implementations compute an annualized volatility for every date of a
/// return series using a trailing window, then shift the result forward by
/// [`lag`](VolatilityEstimator::lag) dates. The value reported for position
/// `t` may only depend on returns at positions `<= t - lag`.
///
/// Implementations should be thread-safe (`Send + Sync`) so a sweep can run
/// estimators from several workers.
///
/// # Example
///
/// ```no_run
/// use tsmom_traits::{Date, VolatilityEstimator, VolatilitySeries};
///
/// struct ConstantVol;
///
/// impl VolatilityEstimator for ConstantVol {
///     fn name(&self) -> &str {
///         "constant"
///     }
///
///     fn window(&self) -> usize {
///         1
///     }
///
///     fn lag(&self) -> usize {
///         0
///     }
///
///     fn estimate(&self, dates: &[Date], returns: &[Option<f64>]) -> VolatilitySeries {
///         let values = returns.iter().map(|r| r.map(|_| 0.15)).collect();
///         VolatilitySeries::new(dates.to_vec(), values)
///     }
/// }
/// ```
pub trait VolatilityEstimator: Send + Sync {
    /// Returns the name of this estimator.
    fn name(&self) -> &str;

    /// Number of trailing observations the estimate requires.
    fn window(&self) -> usize;

    /// Number of dates the estimate is shifted forward.
    fn lag(&self) -> usize;

    /// Number of leading positions that are always undefined.
    ///
    /// Equals `window + lag - 1`.
    fn warmup(&self) -> usize {
        (self.window() + self.lag()).saturating_sub(1)
    }

    /// Computes the volatility series for `returns`, aligned with `dates`.
    ///
    /// `returns[i]` is the simple return realised on `dates[i]`; `None` marks
    /// a missing return. The output has the same length as the input. If the
    /// window exceeds the available history every value is `None`.
    fn estimate(&self, dates: &[Date], returns: &[Option<f64>]) -> VolatilitySeries;
}
