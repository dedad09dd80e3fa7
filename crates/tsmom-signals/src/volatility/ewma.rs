//! Exponentially-weighted volatility.

use serde::{Deserialize, Serialize};
use tsmom_traits::stats::annualize_vol;
use tsmom_traits::{Date, VolatilityEstimator, VolatilitySeries};

use super::shift;

/// Configuration for the EWMA volatility estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EwmaConfig {
    /// Returns observed before the estimate is defined (default: 60)
    pub window: usize,

    /// Dates the estimate is shifted forward (default: 1)
    pub lag: usize,

    /// Weight decay per observation, λ in (0, 1) (default: 60/61)
    pub decay: f64,

    /// Annualization factor (default: 252)
    pub periods_per_year: usize,
}

impl Default for EwmaConfig {
    fn default() -> Self {
        Self {
            window: 60,
            lag: 1,
            decay: 60.0 / 61.0,
            periods_per_year: 252,
        }
    }
}

/// Exponentially-weighted moving volatility.
///
/// The observation `k` steps in the past carries weight `λ^k`. The variance is
/// measured around the weighted mean, so
/// `σ²_t = Σ λ^k (r_{t-k} - r̄_t)² / Σ λ^k`.
/// Missing returns are skipped without decaying the weights.
///
/// With the default `λ = 60/61` the centre of mass of the weights sits 60
/// days back.
#[derive(Debug, Clone)]
pub struct EwmaEstimator {
    config: EwmaConfig,
}

impl EwmaEstimator {
    /// Create a new EWMA estimator with the given configuration.
    #[must_use]
    pub const fn new(config: EwmaConfig) -> Self {
        Self { config }
    }

    /// Get the decay factor.
    #[must_use]
    pub const fn decay(&self) -> f64 {
        self.config.decay
    }

    /// Centre of mass of the weights, `λ / (1 - λ)`.
    #[must_use]
    pub fn center_of_mass(&self) -> f64 {
        self.config.decay / (1.0 - self.config.decay)
    }

    fn raw(&self, returns: &[Option<f64>]) -> Vec<Option<f64>> {
        let lambda = self.config.decay;
        let min_obs = self.config.window.max(1);

        let mut weight_sum = 0.0;
        let mut mean = 0.0;
        let mut sum_sq = 0.0;
        let mut seen = 0usize;

        returns
            .iter()
            .map(|r| {
                if let Some(x) = *r {
                    weight_sum = lambda * weight_sum + 1.0;
                    let delta = x - mean;
                    mean += delta / weight_sum;
                    sum_sq = lambda * sum_sq + delta * (x - mean);
                    seen += 1;
                }
                (seen >= min_obs).then(|| {
                    let var = (sum_sq / weight_sum).max(0.0);
                    annualize_vol(var.sqrt(), self.config.periods_per_year)
                })
            })
            .collect()
    }
}

impl Default for EwmaEstimator {
    fn default() -> Self {
        Self::new(EwmaConfig::default())
    }
}

impl VolatilityEstimator for EwmaEstimator {
    fn name(&self) -> &str {
        "ewma"
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dates(n: usize) -> Vec<Date> {
        let start = Date::from_ymd_opt(2020, 1, 1).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    fn returns(n: usize) -> Vec<Option<f64>> {
        (0..n)
            .map(|i| Some(0.01 * ((i * 5 % 9) as f64 - 4.0)))
            .collect()
    }

    /// Direct evaluation of the weighted variance for comparison.
    fn brute_force(values: &[f64], lambda: f64) -> f64 {
        let n = values.len();
        let weights: Vec<f64> = (0..n).map(|i| lambda.powi((n - 1 - i) as i32)).collect();
        let w_sum: f64 = weights.iter().sum();
        let mean: f64 = values.iter().zip(&weights).map(|(x, w)| x * w).sum::<f64>() / w_sum;
        values
            .iter()
            .zip(&weights)
            .map(|(x, w)| w * (x - mean).powi(2))
            .sum::<f64>()
            / w_sum
    }

    #[test]
    fn test_default_config() {
        let estimator = EwmaEstimator::default();
        assert_eq!(estimator.window(), 60);
        assert_eq!(estimator.lag(), 1);
        assert_relative_eq!(estimator.center_of_mass(), 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_matches_weighted_variance() {
        let estimator = EwmaEstimator::new(EwmaConfig {
            window: 3,
            lag: 0,
            decay: 0.9,
            periods_per_year: 1,
        });
        let r = returns(40);
        let vol = estimator.estimate(&dates(40), &r);

        let values: Vec<f64> = r.iter().flatten().copied().collect();
        for t in [2, 10, 39] {
            let expected = brute_force(&values[..=t], 0.9).sqrt();
            assert_relative_eq!(vol.get(t).unwrap(), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_warmup_is_undefined() {
        let estimator = EwmaEstimator::new(EwmaConfig {
            window: 10,
            lag: 1,
            ..Default::default()
        });
        let vol = estimator.estimate(&dates(30), &returns(30));

        assert_eq!(estimator.warmup(), 10);
        assert!(vol.values()[..10].iter().all(Option::is_none));
        assert!(vol.values()[10..].iter().all(Option::is_some));
    }

    #[test]
    fn test_causality() {
        let estimator = EwmaEstimator::new(EwmaConfig {
            window: 5,
            lag: 1,
            ..Default::default()
        });
        let d = dates(50);
        let original = returns(50);
        let baseline = estimator.estimate(&d, &original);

        for t in 0..50 {
            let mut mutated = original.clone();
            for r in mutated.iter_mut().skip(t) {
                *r = Some(-0.3);
            }
            let vol = estimator.estimate(&d, &mutated);
            assert_eq!(vol.values()[..=t], baseline.values()[..=t]);
        }
    }

    #[test]
    fn test_constant_returns_give_zero_vol() {
        let estimator = EwmaEstimator::new(EwmaConfig {
            window: 2,
            lag: 0,
            ..Default::default()
        });
        let vol = estimator.estimate(&dates(10), &vec![Some(0.0); 10]);
        assert_eq!(vol.get(9), Some(0.0));
    }

    #[test]
    fn test_missing_returns_are_skipped() {
        let estimator = EwmaEstimator::new(EwmaConfig {
            window: 3,
            lag: 0,
            decay: 0.8,
            periods_per_year: 1,
        });
        let with_gap = vec![Some(0.01), None, Some(-0.02), Some(0.03)];
        let without_gap = vec![Some(0.01), Some(-0.02), Some(0.03)];

        let a = estimator.estimate(&dates(4), &with_gap);
        let b = estimator.estimate(&dates(3), &without_gap);

        assert_eq!(a.get(2), None);
        assert_relative_eq!(a.get(3).unwrap(), b.get(2).unwrap(), epsilon = 1e-15);
    }

    #[test]
    fn test_window_exceeding_history() {
        let estimator = EwmaEstimator::default();
        let vol = estimator.estimate(&dates(20), &returns(20));
        assert_eq!(vol.defined_count(), 0);
    }
}
