//! Illustrative time-series momentum portfolio.
//!
//! Every `period_length` dates the portfolio takes, in each instrument with
//! defined inputs, a position of `sign(lookback return) * target_vol / σ`,
//! where σ is the ex-ante volatility `vol_lag` dates earlier. Positions are
//! equally weighted across the active instruments and held until the next
//! rebalance.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tsmom_traits::stats::{checked_scale, mean, std_dev};
use tsmom_traits::{AssetClass, Date, InstrumentId, SweepConfig, VolatilityEstimator};

/// Portfolio configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioConfig {
    /// Lookback horizon in periods (default: 12)
    pub lookback_periods: usize,
    /// Trading days per period, also the rebalance interval (default: 21)
    pub period_length: usize,
    /// Annualized volatility target per instrument (default: 0.40)
    pub target_vol: f64,
    /// Dates between a volatility estimate and its use (default: 1)
    pub vol_lag: usize,
    /// Transaction cost per unit of turnover, in basis points (default: 0)
    pub transaction_cost_bps: f64,
    /// Trading days per year (default: 252)
    pub periods_per_year: usize,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            lookback_periods: 12,
            period_length: 21,
            target_vol: 0.40,
            vol_lag: 1,
            transaction_cost_bps: 0.0,
            periods_per_year: 252,
        }
    }
}

impl PortfolioConfig {
    /// Takes the period, lag and annualization settings of a sweep.
    #[must_use]
    pub fn from_sweep(config: &SweepConfig, lookback_periods: usize) -> Self {
        Self {
            lookback_periods,
            period_length: config.period_length,
            vol_lag: config.vol_lag,
            periods_per_year: config.periods_per_year,
            ..Default::default()
        }
    }

    /// Lookback in trading days.
    #[must_use]
    pub const fn lookback_days(&self) -> usize {
        self.lookback_periods * self.period_length
    }
}

/// Target weights set on one rebalance date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rebalance {
    /// Rebalance date
    pub date: Date,
    /// Weight per active instrument
    pub weights: BTreeMap<InstrumentId, f64>,
    /// One-way turnover against the previous weights
    pub turnover: f64,
}

/// Summary statistics of a daily return series.
///
/// Statistics that cannot be computed are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Compounded return over the whole series
    pub total_return: Option<f64>,
    /// Geometric annual return
    pub annualized_return: Option<f64>,
    /// Annualized standard deviation of daily returns
    pub annualized_volatility: Option<f64>,
    /// Annualized mean over standard deviation
    pub sharpe_ratio: Option<f64>,
    /// Largest peak-to-trough loss of the compounded series
    pub max_drawdown: Option<f64>,
    /// Mean turnover per rebalance
    pub avg_turnover: Option<f64>,
    /// Daily returns in the series
    pub n_days: usize,
    /// Rebalances performed
    pub n_rebalances: usize,
}

impl PerformanceSummary {
    /// Computes the summary of daily `returns`.
    pub fn from_returns(returns: &[f64], turnover: &[f64], periods_per_year: usize) -> Self {
        let n_days = returns.len();
        let cumulative = cumulative_returns(returns);
        let total_return = cumulative.last().copied();
        let years = n_days as f64 / periods_per_year as f64;
        let annualized_return = total_return
            .map(|total| (1.0 + total).powf(1.0 / years) - 1.0)
            .filter(|r| r.is_finite());

        let std = std_dev(returns, 1);
        let ann = (periods_per_year as f64).sqrt();
        let annualized_volatility = std.map(|s| s * ann);
        let sharpe_ratio = mean(returns)
            .and_then(|m| checked_scale(m, std))
            .map(|s| s * ann);

        Self {
            total_return,
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown: max_drawdown(&cumulative),
            avg_turnover: mean(turnover),
            n_days,
            n_rebalances: turnover.len(),
        }
    }
}

/// Output of a portfolio run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioResult {
    /// Dates of the daily returns
    pub dates: Vec<Date>,
    /// Daily portfolio returns, net of costs
    pub returns: Vec<f64>,
    /// Compounded returns
    pub cumulative_returns: Vec<f64>,
    /// Every rebalance in date order
    pub rebalances: Vec<Rebalance>,
    /// Performance statistics
    pub summary: PerformanceSummary,
}

/// Equal-weighted, volatility-targeted momentum strategy over one asset class.
#[derive(Debug, Clone, Default)]
pub struct TsmomPortfolio {
    config: PortfolioConfig,
}

impl TsmomPortfolio {
    /// Creates a portfolio with the given configuration.
    #[must_use]
    pub const fn new(config: PortfolioConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &PortfolioConfig {
        &self.config
    }

    /// Runs the strategy over every instrument of `class`.
    ///
    /// `estimator` should not shift its output; `vol_lag` is applied here.
    pub fn run(&self, class: &AssetClass, estimator: &dyn VolatilityEstimator) -> PortfolioResult {
        let dates = class.dates();
        let n = dates.len();
        let lookback = self.config.lookback_days();
        let step = self.config.period_length.max(1);
        let start = lookback.max(self.config.vol_lag);

        let inputs: Vec<(&InstrumentId, Vec<Option<f64>>, Vec<Option<f64>>)> = class
            .instruments()
            .iter()
            .map(|(id, series)| {
                let returns = series.simple_returns();
                let vol = estimator.estimate(series.dates(), &returns);
                (id, returns, vol.values().to_vec())
            })
            .collect();

        let mut weights: BTreeMap<InstrumentId, f64> = BTreeMap::new();
        let mut rebalances = Vec::new();
        let mut out_dates = Vec::new();
        let mut returns = Vec::new();

        for t in start..n {
            let mut cost = 0.0;
            if (t - start) % step == 0 {
                let target = self.target_weights(class, &inputs, t);
                let traded = turnover(&weights, &target);
                cost = traded * self.config.transaction_cost_bps / 10_000.0;
                weights = target;
                rebalances.push(Rebalance {
                    date: dates[t],
                    weights: weights.clone(),
                    turnover: traded,
                });
            }

            if t + 1 < n {
                let next: f64 = inputs
                    .iter()
                    .filter_map(|(id, r, _)| Some(weights.get(*id)? * r[t + 1]?))
                    .sum();
                out_dates.push(dates[t + 1]);
                returns.push(next - cost);
            }
        }

        let turnovers: Vec<f64> = rebalances.iter().map(|r| r.turnover).collect();
        let summary =
            PerformanceSummary::from_returns(&returns, &turnovers, self.config.periods_per_year);

        PortfolioResult {
            dates: out_dates,
            cumulative_returns: cumulative_returns(&returns),
            returns,
            rebalances,
            summary,
        }
    }

    fn target_weights(
        &self,
        class: &AssetClass,
        inputs: &[(&InstrumentId, Vec<Option<f64>>, Vec<Option<f64>>)],
        t: usize,
    ) -> BTreeMap<InstrumentId, f64> {
        let lookback = self.config.lookback_days();
        let raw: Vec<(&InstrumentId, f64)> = inputs
            .iter()
            .filter_map(|(id, _, vol)| {
                let series = class.instrument(id)?;
                let now = series.price(t)?;
                let then = series.price(t - lookback)?;
                let signal = (now / then - 1.0).signum();
                let leverage = checked_scale(self.config.target_vol, vol[t - self.config.vol_lag])?;
                Some((*id, signal * leverage))
            })
            .collect();

        let n_active = raw.len() as f64;
        raw.into_iter()
            .map(|(id, w)| (id.clone(), w / n_active))
            .collect()
    }
}

/// One-way turnover between two weight sets.
fn turnover(old: &BTreeMap<InstrumentId, f64>, new: &BTreeMap<InstrumentId, f64>) -> f64 {
    let keys: BTreeSet<&InstrumentId> = old.keys().chain(new.keys()).collect();
    keys.into_iter()
        .map(|k| {
            let a = old.get(k).copied().unwrap_or(0.0);
            let b = new.get(k).copied().unwrap_or(0.0);
            (b - a).abs()
        })
        .sum::<f64>()
        / 2.0
}

fn cumulative_returns(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(0.0, |cum, r| {
            *cum = (1.0 + *cum) * (1.0 + r) - 1.0;
            Some(*cum)
        })
        .collect()
}

fn max_drawdown(cumulative: &[f64]) -> Option<f64> {
    if cumulative.is_empty() {
        return None;
    }
    let mut max_dd: f64 = 0.0;
    let mut peak: f64 = 0.0;
    for &cum in cumulative {
        peak = peak.max(cum);
        max_dd = max_dd.max((peak - cum) / (1.0 + peak));
    }
    Some(max_dd)
}
