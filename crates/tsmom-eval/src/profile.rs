//! Horizon profile analysis.
//!
//! Summarizes how the momentum coefficient of one group evolves across
//! lookback horizons: where it is significantly positive (momentum), where it
//! is significantly negative (reversal), and where it first flips sign.

use serde::{Deserialize, Serialize};

use crate::regression::RegressionResult;

/// Default significance threshold on `|t|`.
pub const DEFAULT_T_THRESHOLD: f64 = 2.0;

/// Summary of one group's horizon sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonProfile {
    /// Threshold on `|t|` used for significance
    pub threshold: f64,
    /// Horizons with `t >= threshold`
    pub momentum_horizons: Vec<usize>,
    /// Horizons with `t <= -threshold`
    pub reversal_horizons: Vec<usize>,
    /// Horizon with the largest `|t|` and its t-statistic
    pub strongest: Option<(usize, f64)>,
    /// First horizon whose beta is negative after a positive beta
    pub crossover: Option<usize>,
    /// Horizons with defined statistics
    pub n_defined: usize,
}

impl HorizonProfile {
    /// Analyzes a horizon-ordered result sequence.
    ///
    /// Undefined horizons are skipped, so a gap never counts as a sign change.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use tsmom_eval::HorizonProfile;
    ///
    /// let profile = HorizonProfile::analyze(table.group("pooled").unwrap(), 2.0);
    /// println!("momentum up to {:?}", profile.momentum_horizons.last());
    /// ```
    pub fn analyze(results: &[RegressionResult], threshold: f64) -> Self {
        let mut momentum_horizons = Vec::new();
        let mut reversal_horizons = Vec::new();
        let mut strongest: Option<(usize, f64)> = None;

        for r in results {
            let Some(t) = r.t_stat else { continue };
            if t >= threshold {
                momentum_horizons.push(r.horizon);
            } else if t <= -threshold {
                reversal_horizons.push(r.horizon);
            }
            if strongest.is_none_or(|(_, best)| t.abs() > best.abs()) {
                strongest = Some((r.horizon, t));
            }
        }

        let betas: Vec<(usize, f64)> = results
            .iter()
            .filter_map(|r| r.beta.map(|b| (r.horizon, b)))
            .collect();
        let crossover = betas
            .windows(2)
            .find(|w| w[0].1 > 0.0 && w[1].1 < 0.0)
            .map(|w| w[1].0);

        Self {
            threshold,
            momentum_horizons,
            reversal_horizons,
            strongest,
            crossover,
            n_defined: betas.len(),
        }
    }

    /// Whether any horizon shows significant momentum.
    #[must_use]
    pub fn has_momentum(&self) -> bool {
        !self.momentum_horizons.is_empty()
    }

    /// Whether any horizon shows significant reversal.
    #[must_use]
    pub fn has_reversal(&self) -> bool {
        !self.reversal_horizons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(horizon: usize, t: Option<f64>) -> RegressionResult {
        match t {
            Some(t) => RegressionResult {
                horizon,
                alpha: Some(0.0),
                beta: Some(t * 0.01),
                std_error: Some(0.01),
                t_stat: Some(t),
                p_value: Some(0.1),
                n_obs: 500,
                n_clusters: 100,
            },
            None => RegressionResult::undefined(horizon),
        }
    }

    #[test]
    fn test_momentum_then_reversal() {
        let results = vec![
            result(1, Some(3.1)),
            result(2, Some(2.4)),
            result(3, Some(0.7)),
            result(4, Some(-0.5)),
            result(5, Some(-2.6)),
            result(6, None),
        ];
        let profile = HorizonProfile::analyze(&results, DEFAULT_T_THRESHOLD);

        assert_eq!(profile.momentum_horizons, vec![1, 2]);
        assert_eq!(profile.reversal_horizons, vec![5]);
        assert_eq!(profile.strongest, Some((1, 3.1)));
        assert_eq!(profile.crossover, Some(4));
        assert_eq!(profile.n_defined, 5);
        assert!(profile.has_momentum());
        assert!(profile.has_reversal());
    }

    #[test]
    fn test_gap_does_not_break_crossover() {
        let results = vec![result(1, Some(1.0)), result(2, None), result(3, Some(-1.0))];
        let profile = HorizonProfile::analyze(&results, DEFAULT_T_THRESHOLD);
        assert_eq!(profile.crossover, Some(3));
        assert!(!profile.has_momentum());
    }

    #[test]
    fn test_strongest_prefers_magnitude() {
        let results = vec![result(1, Some(1.5)), result(2, Some(-4.0))];
        let profile = HorizonProfile::analyze(&results, 3.0);
        assert_eq!(profile.strongest, Some((2, -4.0)));
        assert_eq!(profile.reversal_horizons, vec![2]);
    }

    #[test]
    fn test_all_undefined() {
        let results: Vec<_> = (1..=3).map(|h| result(h, None)).collect();
        let profile = HorizonProfile::analyze(&results, DEFAULT_T_THRESHOLD);
        assert_eq!(profile.strongest, None);
        assert_eq!(profile.crossover, None);
        assert_eq!(profile.n_defined, 0);
    }
}
