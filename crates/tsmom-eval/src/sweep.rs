//! Horizon sweep orchestration.
//!
//! For every horizon `1..=max_horizon` the runner builds one panel per asset
//! class plus the pooled panel of all classes, fits each, and collects the
//! results into a [`ResultsTable`].
//!
//! Volatility is estimated once per instrument with no shift; the scaled
//! return builder applies `vol_lag` when it reads the series, so the lag is
//! applied exactly once.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, error, info, warn};
use tsmom_signals::{ScaledReturnBuilder, create_estimator};
use tsmom_traits::{
    AssetClassDataset, InstrumentId, POOLED, PriceSeries, Result, SweepConfig, TsmomError,
    VolatilitySeries,
};

use crate::panel::{Panel, PanelAssembler, ScaledReturnObservation};
use crate::regression::{ClusteredRegressor, RegressionResult};
use crate::results::ResultsTable;

/// One instrument with its volatility series, ready for every horizon.
#[derive(Debug)]
struct Prepared<'a> {
    prices: &'a PriceSeries,
    vol: VolatilitySeries,
}

type PreparedClasses<'a> = BTreeMap<&'a str, BTreeMap<&'a str, Prepared<'a>>>;

/// Outcome of one group at one horizon. `Err` is fatal to the group.
type GroupOutcome = (String, Result<RegressionResult>);

/// Runs the full horizon sweep over a dataset.
///
/// # Example
///
/// ```rust,ignore
/// use tsmom_eval::HorizonSweepRunner;
/// use tsmom_traits::SweepConfig;
///
/// let runner = HorizonSweepRunner::new(SweepConfig::default())?;
/// let table = runner.run(&dataset)?;
/// for r in table.group("pooled").unwrap() {
///     println!("{:>2} {:?}", r.horizon, r.t_stat);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct HorizonSweepRunner {
    config: SweepConfig,
    builder: ScaledReturnBuilder,
    regressor: ClusteredRegressor,
}

impl HorizonSweepRunner {
    /// Creates a runner.
    ///
    /// # Errors
    ///
    /// Returns [`TsmomError::Configuration`] if the configuration is invalid.
    pub fn new(config: SweepConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            builder: ScaledReturnBuilder::new((&config).into()),
            regressor: ClusteredRegressor::new(config.min_observations),
            config,
        })
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Runs every (group, horizon) fit.
    ///
    /// Horizons with too little data get undefined results. A group hit by a
    /// non-recoverable error is dropped from the table and its error recorded;
    /// other groups are unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`TsmomError::Configuration`] if the configuration does not fit
    /// the dataset. No computation happens in that case.
    pub fn run(&self, dataset: &AssetClassDataset) -> Result<ResultsTable> {
        self.config.validate_for(dataset)?;

        info!(
            classes = dataset.classes().len(),
            instruments = dataset.n_instruments(),
            max_horizon = self.config.max_horizon,
            estimator = %self.config.vol_estimator_kind,
            "starting horizon sweep"
        );

        let prepared = self.prepare(dataset);
        let horizons: Vec<usize> = self.config.horizons().collect();

        let per_horizon: Vec<Vec<GroupOutcome>> = if self.config.parallel {
            horizons
                .par_iter()
                .map(|&h| self.run_horizon(&prepared, h))
                .collect()
        } else {
            horizons
                .iter()
                .map(|&h| self.run_horizon(&prepared, h))
                .collect()
        };

        let mut by_group: BTreeMap<String, Result<Vec<RegressionResult>>> = BTreeMap::new();
        for (label, outcome) in per_horizon.into_iter().flatten() {
            let entry = by_group.entry(label).or_insert_with(|| Ok(Vec::new()));
            match outcome {
                Ok(result) => {
                    if let Ok(results) = entry {
                        results.push(result);
                    }
                }
                Err(e) => {
                    if entry.is_ok() {
                        *entry = Err(e);
                    }
                }
            }
        }

        let mut table = ResultsTable::new();
        for (label, outcome) in by_group {
            match outcome {
                Ok(results) => {
                    let undefined = results.iter().filter(|r| !r.is_defined()).count();
                    if undefined > 0 {
                        warn!(group = %label, undefined, "horizons without enough data");
                    }
                    table.insert_group(label, results);
                }
                Err(e) => {
                    error!(group = %label, error = %e, "group aborted");
                    table.record_error(label, e.to_string());
                }
            }
        }

        info!(
            groups = table.groups().len(),
            aborted = table.errors().len(),
            "horizon sweep finished"
        );
        Ok(table)
    }

    /// Estimates every instrument's volatility once.
    fn prepare<'a>(&self, dataset: &'a AssetClassDataset) -> PreparedClasses<'a> {
        let estimator = create_estimator(&self.config, 0);

        dataset
            .classes()
            .iter()
            .map(|(label, class)| {
                let instruments: Vec<(&InstrumentId, &PriceSeries)> =
                    class.instruments().iter().collect();
                let estimate = |(id, prices): (&'a InstrumentId, &'a PriceSeries)| {
                    let vol = estimator.estimate(prices.dates(), &prices.simple_returns());
                    debug!(
                        class = %label,
                        instrument = %id,
                        defined = vol.defined_count(),
                        "estimated volatility"
                    );
                    (id.as_str(), Prepared { prices, vol })
                };

                let prepared: BTreeMap<&'a str, Prepared<'a>> = if self.config.parallel {
                    instruments.into_par_iter().map(estimate).collect()
                } else {
                    instruments.into_iter().map(estimate).collect()
                };
                (label.as_str(), prepared)
            })
            .collect()
    }

    fn run_horizon(&self, prepared: &PreparedClasses<'_>, horizon: usize) -> Vec<GroupOutcome> {
        let class_panels: Vec<(&str, Result<Panel>)> = if self.config.parallel {
            prepared
                .par_iter()
                .map(|(label, instruments)| (*label, self.class_panel(label, instruments, horizon)))
                .collect()
        } else {
            prepared
                .iter()
                .map(|(label, instruments)| (*label, self.class_panel(label, instruments, horizon)))
                .collect()
        };

        let mut outcomes = Vec::with_capacity(class_panels.len() + 1);
        let mut pooled_inputs = Vec::with_capacity(class_panels.len());
        let mut pooled_error = None;

        for (label, panel) in class_panels {
            match panel {
                Ok(panel) => {
                    outcomes.push((label.to_string(), self.fit(label, &panel)));
                    pooled_inputs.push(panel);
                }
                Err(e) => {
                    pooled_error.get_or_insert_with(|| {
                        TsmomError::DataIntegrity(format!("asset class '{label}': {e}"))
                    });
                    outcomes.push((label.to_string(), Err(e)));
                }
            }
        }

        let pooled = match pooled_error {
            Some(e) => Err(e),
            None => Panel::pool(horizon, pooled_inputs).and_then(|p| self.fit(POOLED, &p)),
        };
        outcomes.push((POOLED.to_string(), pooled));
        outcomes
    }

    fn class_panel(
        &self,
        label: &str,
        instruments: &BTreeMap<&str, Prepared<'_>>,
        horizon: usize,
    ) -> Result<Panel> {
        let per_instrument = instruments
            .iter()
            .map(|(id, p)| {
                let observations = self
                    .builder
                    .build(p.prices, &p.vol, horizon)?
                    .iter()
                    .map(|pair| ScaledReturnObservation::from_scaled(pair, id, label))
                    .collect();
                Ok(((*id).to_string(), observations))
            })
            .collect::<Result<BTreeMap<InstrumentId, Vec<ScaledReturnObservation>>>>()?;

        PanelAssembler::assemble(horizon, per_instrument)
    }

    /// Fits a panel, turning recoverable failures into an undefined result.
    fn fit(&self, group: &str, panel: &Panel) -> Result<RegressionResult> {
        match self.regressor.fit(panel) {
            Ok(result) => {
                debug!(
                    group,
                    horizon = result.horizon,
                    n_obs = result.n_obs,
                    beta = ?result.beta,
                    t_stat = ?result.t_stat,
                    "fitted horizon"
                );
                Ok(result)
            }
            Err(e) if e.is_recoverable() => {
                debug!(group, horizon = panel.horizon(), reason = %e, "horizon undefined");
                Ok(RegressionResult {
                    n_obs: panel.len(),
                    n_clusters: panel.n_dates(),
                    ..RegressionResult::undefined(panel.horizon())
                })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsmom_traits::{Date, VolatilityKind};

    fn series(n: usize, seed: f64) -> PriceSeries {
        let start = Date::from_ymd_opt(2000, 1, 3).unwrap();
        let mut price = 100.0;
        PriceSeries::from_pairs((0..n).map(|i| {
            let t = i as f64;
            let r = 0.01 * (t * 0.7 + seed).sin() + 0.004 * (t * 0.13 * seed).cos();
            price *= 1.0 + r;
            (start + chrono::Duration::days(i as i64), price)
        }))
        .unwrap()
    }

    fn dataset(n: usize, classes: &[(&str, &[&str])]) -> AssetClassDataset {
        let mut map = BTreeMap::new();
        let mut seed = 1.0;
        for (class, instruments) in classes {
            let mut inner = BTreeMap::new();
            for id in *instruments {
                inner.insert((*id).to_string(), series(n, seed));
                seed += 0.37;
            }
            map.insert((*class).to_string(), inner);
        }
        AssetClassDataset::from_classes(map).unwrap()
    }

    fn config() -> SweepConfig {
        SweepConfig {
            forward_window: 5,
            period_length: 5,
            vol_window: 10,
            max_horizon: 4,
            min_observations: 10,
            ..Default::default()
        }
    }

    fn two_class_dataset() -> AssetClassDataset {
        dataset(240, &[("bond", &["TY", "RX"]), ("equity", &["ES", "NQ", "FDAX"])])
    }

    #[test]
    fn test_run_covers_classes_and_pooled() {
        let table = HorizonSweepRunner::new(config())
            .unwrap()
            .run(&two_class_dataset())
            .unwrap();

        assert_eq!(table.labels().collect::<Vec<_>>(), vec!["bond", "equity", POOLED]);
        for label in ["bond", "equity", POOLED] {
            let results = table.group(label).unwrap();
            assert_eq!(results.iter().map(|r| r.horizon).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
            assert!(results.iter().all(RegressionResult::is_defined));
        }

        let pooled = table.get(POOLED, 1).unwrap();
        let bond = table.get("bond", 1).unwrap();
        let equity = table.get("equity", 1).unwrap();
        assert_eq!(pooled.n_obs, bond.n_obs + equity.n_obs);
        assert!(table.errors().is_empty());
    }

    #[test]
    fn test_observation_counts_follow_truncation() {
        let table = HorizonSweepRunner::new(config())
            .unwrap()
            .run(&dataset(240, &[("fx", &["EUR"])]))
            .unwrap();

        // EWMA warm-up leaves volatility undefined before position 10, so
        // the lagged read at t - 5h - 1 needs t >= 5h + 11.
        for r in table.group("fx").unwrap() {
            let h = r.horizon;
            assert_eq!(r.n_obs, 240 - 5 - (5 * h + 11));
            assert_eq!(r.n_clusters, r.n_obs);
        }
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let data = two_class_dataset();
        let runner = HorizonSweepRunner::new(config()).unwrap();

        let first = runner.run(&data).unwrap();
        let second = runner.run(&data).unwrap();
        assert_eq!(first, second);

        let sequential = HorizonSweepRunner::new(SweepConfig {
            parallel: false,
            ..config()
        })
        .unwrap()
        .run(&data)
        .unwrap();
        assert_eq!(first, sequential);
    }

    #[test]
    fn test_long_horizons_are_undefined() {
        let cfg = SweepConfig {
            max_horizon: 50,
            ..config()
        };
        let table = HorizonSweepRunner::new(cfg)
            .unwrap()
            .run(&dataset(200, &[("fx", &["EUR", "JPY"])]))
            .unwrap();

        let results = table.group("fx").unwrap();
        assert_eq!(results.len(), 50);
        assert!(results[0].is_defined());

        // 5 * 40 >= 200 leaves no observations at all
        let last = table.get("fx", 40).unwrap();
        assert!(!last.is_defined());
        assert_eq!(last.n_obs, 0);
        assert!(table.get(POOLED, 50).is_some_and(|r| r.t_stat.is_none()));
    }

    #[test]
    fn test_shared_instrument_aborts_only_pooled() {
        let data = dataset(240, &[("bond", &["XX", "TY"]), ("equity", &["XX", "ES"])]);
        let table = HorizonSweepRunner::new(config()).unwrap().run(&data).unwrap();

        assert!(table.group("bond").is_some());
        assert!(table.group("equity").is_some());
        assert!(table.group(POOLED).is_none());
        assert!(table.error(POOLED).unwrap().contains("XX"));
    }

    #[test]
    fn test_rolling_estimator() {
        let cfg = SweepConfig {
            vol_estimator_kind: VolatilityKind::RollingStd,
            ..config()
        };
        let table = HorizonSweepRunner::new(cfg)
            .unwrap()
            .run(&two_class_dataset())
            .unwrap();
        assert!(table.group(POOLED).unwrap().iter().all(RegressionResult::is_defined));
    }

    #[test]
    fn test_configuration_errors_surface_before_running() {
        assert!(matches!(
            HorizonSweepRunner::new(SweepConfig {
                vol_lag: 0,
                ..config()
            }),
            Err(TsmomError::Configuration(_))
        ));

        let runner = HorizonSweepRunner::new(SweepConfig {
            vol_window: 500,
            ..config()
        })
        .unwrap();
        assert!(matches!(
            runner.run(&two_class_dataset()),
            Err(TsmomError::Configuration(_))
        ));
    }
}
