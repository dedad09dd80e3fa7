//! Sweep configuration.
//!
//! [`SweepConfig`] carries every tunable of the horizon sweep. It
//! deserializes from TOML with any subset of fields, missing fields taking
//! their defaults.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{AssetClassDataset, Result, TsmomError};

/// Which volatility estimator scales returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolatilityKind {
    /// Rolling standard deviation over `vol_window` returns.
    RollingStd,
    /// Exponentially-weighted variance with decay `ewma_decay`.
    #[default]
    Ewma,
}

impl VolatilityKind {
    /// Registry name of the estimator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RollingStd => "rolling-std",
            Self::Ewma => "ewma",
        }
    }
}

impl fmt::Display for VolatilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VolatilityKind {
    type Err = TsmomError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "rolling-std" | "rolling" | "std" => Ok(Self::RollingStd),
            "ewma" | "ewm" => Ok(Self::Ewma),
            other => Err(TsmomError::Configuration(format!(
                "unknown volatility estimator '{other}', expected rolling-std or ewma"
            ))),
        }
    }
}

/// Configuration of a full horizon sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Forward return window in trading days (default: 21)
    pub forward_window: usize,

    /// Trading days per lookback period; horizon `h` spans `h * period_length` (default: 21)
    pub period_length: usize,

    /// Volatility estimation window in trading days (default: 60)
    pub vol_window: usize,

    /// Dates between a volatility estimate and its use (default: 1)
    pub vol_lag: usize,

    /// Largest horizon in periods (default: 60)
    pub max_horizon: usize,

    /// Annualization factor for volatility (default: 252)
    pub periods_per_year: usize,

    /// Minimum panel rows for a regression (default: 24)
    pub min_observations: usize,

    /// Volatility estimator (default: ewma)
    pub vol_estimator_kind: VolatilityKind,

    /// EWMA decay factor λ (default: 60/61, a 60-day centre of mass)
    pub ewma_decay: f64,

    /// Delta degrees of freedom of the rolling estimator (default: 1)
    pub ddof: usize,

    /// Run (group, horizon) units on the rayon pool (default: true)
    pub parallel: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            forward_window: 21,
            period_length: 21,
            vol_window: 60,
            vol_lag: 1,
            max_horizon: 60,
            periods_per_year: 252,
            min_observations: 24,
            vol_estimator_kind: VolatilityKind::Ewma,
            ewma_decay: 60.0 / 61.0,
            ddof: 1,
            parallel: true,
        }
    }
}

impl SweepConfig {
    /// Parses a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`TsmomError::Configuration`] on malformed TOML or invalid
    /// values.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| TsmomError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Horizons swept, `1..=max_horizon`.
    pub const fn horizons(&self) -> RangeInclusive<usize> {
        1..=self.max_horizon
    }

    /// Lookback length of horizon `h` in trading days.
    #[must_use]
    pub const fn lookback_days(&self, horizon: usize) -> usize {
        horizon * self.period_length
    }

    /// Checks parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`TsmomError::Configuration`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("forward_window", self.forward_window),
            ("period_length", self.period_length),
            ("vol_window", self.vol_window),
            ("vol_lag", self.vol_lag),
            ("max_horizon", self.max_horizon),
            ("periods_per_year", self.periods_per_year),
            ("min_observations", self.min_observations),
        ];

        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(TsmomError::Configuration(format!(
                "{name} must be positive"
            )));
        }

        if !(self.ewma_decay > 0.0 && self.ewma_decay < 1.0) {
            return Err(TsmomError::Configuration(format!(
                "ewma_decay must lie in (0, 1), got {}",
                self.ewma_decay
            )));
        }

        if self.ddof > 1 {
            return Err(TsmomError::Configuration(format!(
                "ddof must be 0 or 1, got {}",
                self.ddof
            )));
        }

        if self.vol_estimator_kind == VolatilityKind::RollingStd && self.vol_window <= self.ddof {
            return Err(TsmomError::Configuration(format!(
                "vol_window {} leaves no degrees of freedom with ddof {}",
                self.vol_window, self.ddof
            )));
        }

        Ok(())
    }

    /// Checks parameters, then checks the windows against the dataset.
    ///
    /// # Errors
    ///
    /// Returns [`TsmomError::Configuration`] if a parameter is invalid, the
    /// dataset is empty, or `forward_window` / `vol_window` exceed the
    /// longest date index of the dataset.
    pub fn validate_for(&self, dataset: &AssetClassDataset) -> Result<()> {
        self.validate()?;

        if dataset.is_empty() {
            return Err(TsmomError::Configuration(
                "dataset has no asset classes".to_string(),
            ));
        }

        let history = dataset.max_history_len();
        for (name, window) in [
            ("forward_window", self.forward_window),
            ("vol_window", self.vol_window),
        ] {
            if window >= history {
                return Err(TsmomError::Configuration(format!(
                    "{name} {window} exceeds the available history of {history} dates"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Date, PriceSeries};
    use std::collections::BTreeMap;

    fn dataset(len: usize) -> AssetClassDataset {
        let start = Date::from_ymd_opt(2020, 1, 1).unwrap();
        let series = PriceSeries::from_pairs(
            (0..len).map(|i| (start + chrono::Duration::days(i as i64), 100.0 + i as f64)),
        )
        .unwrap();
        let mut inner = BTreeMap::new();
        inner.insert("ES".to_string(), series);
        let mut classes = BTreeMap::new();
        classes.insert("equity".to_string(), inner);
        AssetClassDataset::from_classes(classes).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = SweepConfig::default();
        assert_eq!(config.forward_window, 21);
        assert_eq!(config.vol_window, 60);
        assert_eq!(config.vol_lag, 1);
        assert_eq!(config.max_horizon, 60);
        assert_eq!(config.periods_per_year, 252);
        assert_eq!(config.min_observations, 24);
        assert_eq!(config.vol_estimator_kind, VolatilityKind::Ewma);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_horizons() {
        let config = SweepConfig {
            max_horizon: 3,
            ..Default::default()
        };
        assert_eq!(config.horizons().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(config.lookback_days(12), 252);
    }

    #[test]
    fn test_non_positive_parameters_rejected() {
        for config in [
            SweepConfig {
                vol_window: 0,
                ..Default::default()
            },
            SweepConfig {
                vol_lag: 0,
                ..Default::default()
            },
            SweepConfig {
                max_horizon: 0,
                ..Default::default()
            },
            SweepConfig {
                forward_window: 0,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                config.validate(),
                Err(TsmomError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_invalid_decay_and_ddof() {
        let config = SweepConfig {
            ewma_decay: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SweepConfig {
            ddof: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SweepConfig {
            vol_estimator_kind: VolatilityKind::RollingStd,
            vol_window: 1,
            ddof: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_windows_exceeding_history() {
        let config = SweepConfig::default();
        assert!(config.validate_for(&dataset(300)).is_ok());

        let err = config.validate_for(&dataset(40)).unwrap_err();
        assert!(err.to_string().contains("vol_window"));

        let config = SweepConfig {
            forward_window: 500,
            ..Default::default()
        };
        let err = config.validate_for(&dataset(300)).unwrap_err();
        assert!(err.to_string().contains("forward_window"));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = SweepConfig::from_toml(
            r#"
            max_horizon = 24
            vol_estimator_kind = "rolling-std"
            vol_window = 21
            "#,
        )
        .unwrap();

        assert_eq!(config.max_horizon, 24);
        assert_eq!(config.vol_estimator_kind, VolatilityKind::RollingStd);
        assert_eq!(config.vol_window, 21);
        assert_eq!(config.forward_window, 21);
    }

    #[test]
    fn test_from_toml_invalid() {
        assert!(SweepConfig::from_toml("vol_lag = 0").is_err());
        assert!(SweepConfig::from_toml("vol_estimator_kind = \"garch\"").is_err());
    }

    #[test]
    fn test_volatility_kind_parse() {
        assert_eq!("ewma".parse::<VolatilityKind>().unwrap(), VolatilityKind::Ewma);
        assert_eq!(
            "rolling_std".parse::<VolatilityKind>().unwrap(),
            VolatilityKind::RollingStd
        );
        assert!("garch".parse::<VolatilityKind>().is_err());
        assert_eq!(VolatilityKind::RollingStd.to_string(), "rolling-std");
    }
}
