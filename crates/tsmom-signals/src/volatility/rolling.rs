//! Rolling standard deviation volatility.

use serde::{Deserialize, Serialize};
use tsmom_traits::stats::{annualize_vol, std_dev};
use tsmom_traits::{Date, VolatilityEstimator, VolatilitySeries};

use super::shift;

/// Configuration for the rolling standard deviation estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingStdConfig {
    /// Number of trailing returns in each window (default: 21 days ≈ 1 month)
    pub window: usize,

    /// Dates the estimate is shifted forward (default: 1)
    pub lag: usize,

    /// Delta degrees of freedom, 0 for population and 1 for sample (default: 1)
    pub ddof: usize,

    /// Annualization factor (default: 252)
    pub periods_per_year: usize,
}

impl Default for RollingStdConfig {
    fn default() -> Self {
        Self {
            window: 21,
            lag: 1,
            ddof: 1,
            periods_per_year: 252,
        }
    }
}

/// Rolling standard deviation estimator.
///
/// The raw estimate at position `t` is the standard deviation of
/// `returns[t - window + 1..=t]`, defined only when every return in the window
/// is present. It is then annualized and shifted forward by `lag`.
///
/// # Example
///
/// ```ignore
/// use tsmom_signals::volatility::{RollingStdConfig, RollingStdEstimator};
///
/// let estimator = RollingStdEstimator::new(RollingStdConfig {
///     window: 60,
///     ..Default::default()
/// });
/// let vol = estimator.estimate(series.dates(), &series.simple_returns());
/// ```
#[derive(Debug, Clone)]
pub struct RollingStdEstimator {
    config: RollingStdConfig,
}

impl RollingStdEstimator {
    /// Create a new rolling estimator with the given configuration.
    #[must_use]
    pub const fn new(config: RollingStdConfig) -> Self {
        Self { config }
    }

    /// Get the delta degrees of freedom.
    #[must_use]
    pub const fn ddof(&self) -> usize {
        self.config.ddof
    }

    fn raw(&self, returns: &[Option<f64>]) -> Vec<Option<f64>> {
        let window = self.config.window;
        if window == 0 || window <= self.config.ddof || window > returns.len() {
            return vec![None; returns.len()];
        }

        let mut out = vec![None; window - 1];
        let mut buf = Vec::with_capacity(window);

        for chunk in returns.windows(window) {
            buf.clear();
            buf.extend(chunk.iter().map_while(|r| *r));
            let vol = if buf.len() == window {
                std_dev(&buf, self.config.ddof)
                    .map(|sd| annualize_vol(sd, self.config.periods_per_year))
            } else {
                None
            };
            out.push(vol);
        }

        out
    }
}

impl Default for RollingStdEstimator {
    fn default() -> Self {
        Self::new(RollingStdConfig::default())
    }
}

impl VolatilityEstimator for RollingStdEstimator {
    fn name(&self) -> &str {
        "rolling-std"
    }

    fn window(&self) -> usize {
        self.config.window
    }

    fn lag(&self) -> usize {
        self.config.lag
    }

    fn estimate(&self, dates: &[Date], returns: &[Option<f64>]) -> VolatilitySeries {
        VolatilitySeries::new(dates.to_vec(), shift(self.raw(returns), self.config.lag))
    }
}
