//! Sweep configuration from a TOML file plus command-line overrides.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tsmom_traits::{SweepConfig, VolatilityKind};

/// Options shared by every command that runs estimators.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct ConfigArgs {
    /// TOML file with sweep settings; flags below override it
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Volatility estimator (rolling-std or ewma)
    #[arg(short, long)]
    pub(crate) estimator: Option<VolatilityKind>,

    /// Forward return window in trading days
    #[arg(long)]
    pub(crate) forward_window: Option<usize>,

    /// Trading days per lookback period
    #[arg(long)]
    pub(crate) period_length: Option<usize>,

    /// Volatility estimation window in trading days
    #[arg(long)]
    pub(crate) vol_window: Option<usize>,

    /// Dates between a volatility estimate and its use
    #[arg(long)]
    pub(crate) vol_lag: Option<usize>,

    /// Largest horizon in periods
    #[arg(short = 'H', long)]
    pub(crate) max_horizon: Option<usize>,

    /// Minimum panel rows for a regression
    #[arg(long)]
    pub(crate) min_observations: Option<usize>,

    /// Run horizons one at a time
    #[arg(long)]
    pub(crate) sequential: bool,
}

impl ConfigArgs {
    /// Read the config file if any, then apply flag overrides and validate.
    pub(crate) fn resolve(&self) -> Result<SweepConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                SweepConfig::from_toml(&text)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => SweepConfig::default(),
        };

        if let Some(kind) = self.estimator {
            config.vol_estimator_kind = kind;
        }
        let overrides = [
            (&mut config.forward_window, self.forward_window),
            (&mut config.period_length, self.period_length),
            (&mut config.vol_window, self.vol_window),
            (&mut config.vol_lag, self.vol_lag),
            (&mut config.max_horizon, self.max_horizon),
            (&mut config.min_observations, self.min_observations),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
        if self.sequential {
            config.parallel = false;
        }

        config.validate()?;
        Ok(config)
    }
}
