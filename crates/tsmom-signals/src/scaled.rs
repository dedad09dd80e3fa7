//! Volatility-scaled forward and lagged returns.
//!
//! For a horizon `h` the lagged return is the cumulative return over the
//! preceding `h * period_length` trading days, and the forward return is the
//! cumulative return over the next `forward_window` days. Each is divided by
//! the ex-ante volatility observed `vol_lag` dates before the start of its
//! window.

use serde::{Deserialize, Serialize};
use tsmom_traits::stats::checked_scale;
use tsmom_traits::{Date, PriceSeries, Result, SweepConfig, TsmomError, VolatilitySeries};

/// Configuration for scaled return construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaledReturnConfig {
    /// Forward return window in trading days (default: 21)
    pub forward_window: usize,

    /// Trading days per horizon period (default: 21)
    pub period_length: usize,

    /// Dates between a volatility estimate and the return it scales (default: 1)
    pub vol_lag: usize,
}

impl Default for ScaledReturnConfig {
    fn default() -> Self {
        Self {
            forward_window: 21,
            period_length: 21,
            vol_lag: 1,
        }
    }
}

impl From<&SweepConfig> for ScaledReturnConfig {
    fn from(config: &SweepConfig) -> Self {
        Self {
            forward_window: config.forward_window,
            period_length: config.period_length,
            vol_lag: config.vol_lag,
        }
    }
}

/// Unscaled forward and lagged returns on one date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawReturnPair {
    /// Observation date `t`
    pub date: Date,
    /// `price[t + F] / price[t] - 1`
    pub forward: f64,
    /// `price[t] / price[t - L] - 1`
    pub lagged: f64,
}

/// Volatility-scaled forward and lagged returns on one date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledReturn {
    /// Observation date `t`
    pub date: Date,
    /// Forward return divided by the volatility at `t - vol_lag`
    pub forward_scaled: f64,
    /// Lagged return divided by the volatility at `t - L - vol_lag`
    pub lagged_scaled: f64,
}

/// Builds horizon-indexed scaled return pairs for one instrument.
///
/// # Example
///
/// ```ignore
/// use tsmom_signals::ScaledReturnBuilder;
///
/// let builder = ScaledReturnBuilder::default();
/// let pairs = builder.build(&prices, &vol, 12)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScaledReturnBuilder {
    config: ScaledReturnConfig,
}

impl ScaledReturnBuilder {
    /// Create a new builder with the given configuration.
    #[must_use]
    pub const fn new(config: ScaledReturnConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ScaledReturnConfig {
        &self.config
    }

    /// Lookback length of horizon `h` in trading days.
    #[must_use]
    pub const fn lookback_days(&self, horizon: usize) -> usize {
        horizon * self.config.period_length
    }

    /// Unscaled return pairs for every date where both prices exist.
    pub fn raw_pairs(&self, prices: &PriceSeries, horizon: usize) -> Vec<RawReturnPair> {
        let lookback = self.lookback_days(horizon);
        let forward = self.config.forward_window;
        let end = prices.len().saturating_sub(forward);

        (lookback..end)
            .filter_map(|t| self.raw_at(prices, t, lookback))
            .collect()
    }

    /// Scaled return pairs for every date where both scaled values exist.
    ///
    /// A date is skipped when any of the three prices is missing, or either
    /// volatility is missing, zero or non-finite.
    ///
    /// # Errors
    ///
    /// Returns [`TsmomError::InvalidData`] if `vol` is not aligned with
    /// `prices`.
    pub fn build(
        &self,
        prices: &PriceSeries,
        vol: &VolatilitySeries,
        horizon: usize,
    ) -> Result<Vec<ScaledReturn>> {
        if vol.dates() != prices.dates() {
            return Err(TsmomError::InvalidData(
                "volatility series is not aligned with the price series".to_string(),
            ));
        }

        let lookback = self.lookback_days(horizon);
        let vol_lag = self.config.vol_lag;
        let start = lookback + vol_lag;
        let end = prices.len().saturating_sub(self.config.forward_window);

        Ok((start..end)
            .filter_map(|t| {
                let raw = self.raw_at(prices, t, lookback)?;
                Some(ScaledReturn {
                    date: raw.date,
                    forward_scaled: checked_scale(raw.forward, vol.get(t - vol_lag))?,
                    lagged_scaled: checked_scale(raw.lagged, vol.get(t - lookback - vol_lag))?,
                })
            })
            .collect())
    }

    fn raw_at(&self, prices: &PriceSeries, t: usize, lookback: usize) -> Option<RawReturnPair> {
        let now = prices.price(t)?;
        let ahead = prices.price(t + self.config.forward_window)?;
        let behind = prices.price(t - lookback)?;

        Some(RawReturnPair {
            date: prices.dates()[t],
            forward: ahead / now - 1.0,
            lagged: now / behind - 1.0,
        })
    }
}
