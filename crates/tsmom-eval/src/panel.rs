//! Long-format panels of scaled return observations.
//!
//! A [`Panel`] holds every `(date, instrument)` observation of one group at
//! one horizon. Rows are uniquely keyed: assembly fails with
//! [`TsmomError::DataIntegrity`] rather than dropping a duplicate.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::Datelike;
use polars::prelude::*;
use tsmom_signals::ScaledReturn;
use tsmom_traits::{CE_TO_UNIX_EPOCH_DAYS, Date, InstrumentId, Result, TsmomError};

/// One panel row.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledReturnObservation {
    /// Observation date, the cluster key of the regression
    pub date: Date,
    /// Instrument identifier
    pub instrument: InstrumentId,
    /// Asset class the instrument belongs to
    pub asset_class: String,
    /// Dependent variable
    pub forward_scaled: f64,
    /// Regressor
    pub lagged_scaled: f64,
}

impl ScaledReturnObservation {
    /// Tags a scaled return pair with its instrument and asset class.
    #[must_use]
    pub fn from_scaled(pair: &ScaledReturn, instrument: &str, asset_class: &str) -> Self {
        Self {
            date: pair.date,
            instrument: instrument.to_string(),
            asset_class: asset_class.to_string(),
            forward_scaled: pair.forward_scaled,
            lagged_scaled: pair.lagged_scaled,
        }
    }
}

/// Observations for one group at one horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    horizon: usize,
    rows: Vec<ScaledReturnObservation>,
}

impl Panel {
    /// Builds a panel, checking `(date, instrument)` uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`TsmomError::DataIntegrity`] on the first duplicate key.
    pub fn new(horizon: usize, rows: Vec<ScaledReturnObservation>) -> Result<Self> {
        {
            let mut seen = HashSet::with_capacity(rows.len());
            for row in &rows {
                if !seen.insert((row.date, row.instrument.as_str())) {
                    return Err(TsmomError::DataIntegrity(format!(
                        "duplicate observation for instrument '{}' on {} at horizon {horizon}",
                        row.instrument, row.date
                    )));
                }
            }
        }
        Ok(Self { horizon, rows })
    }

    /// Concatenates per-class panels into one pooled panel.
    ///
    /// The `asset_class` of every row is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`TsmomError::DataIntegrity`] if the panels disagree on the
    /// horizon or the same instrument appears on the same date in two of them.
    pub fn pool<I>(horizon: usize, panels: I) -> Result<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let mut rows = Vec::new();
        for panel in panels {
            if panel.horizon != horizon {
                return Err(TsmomError::DataIntegrity(format!(
                    "cannot pool a horizon {} panel into horizon {horizon}",
                    panel.horizon
                )));
            }
            rows.extend(panel.rows);
        }
        Self::new(horizon, rows)
    }

    /// Horizon in periods.
    #[must_use]
    pub const fn horizon(&self) -> usize {
        self.horizon
    }

    /// All rows, in assembly order.
    #[must_use]
    pub fn rows(&self) -> &[ScaledReturnObservation] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the panel has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct dates.
    #[must_use]
    pub fn n_dates(&self) -> usize {
        self.rows.iter().map(|r| r.date).collect::<BTreeSet<_>>().len()
    }

    /// Regressor column.
    #[must_use]
    pub fn lagged(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.lagged_scaled).collect()
    }

    /// Dependent variable column.
    #[must_use]
    pub fn forward(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.forward_scaled).collect()
    }

    /// Cluster key column.
    #[must_use]
    pub fn dates(&self) -> Vec<Date> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// Row counts per asset class.
    #[must_use]
    pub fn class_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.asset_class.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Converts the panel to a DataFrame with columns `date`, `instrument`,
    /// `asset_class`, `forward_scaled`, `lagged_scaled`.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be built.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let days: Vec<i32> = self
            .rows
            .iter()
            .map(|r| r.date.num_days_from_ce() - CE_TO_UNIX_EPOCH_DAYS)
            .collect();
        let instruments: Vec<&str> = self.rows.iter().map(|r| r.instrument.as_str()).collect();
        let classes: Vec<&str> = self.rows.iter().map(|r| r.asset_class.as_str()).collect();

        let frame = df!(
            "date" => days,
            "instrument" => instruments,
            "asset_class" => classes,
            "forward_scaled" => self.forward(),
            "lagged_scaled" => self.lagged(),
        )?;

        Ok(frame
            .lazy()
            .with_column(col("date").cast(DataType::Date))
            .collect()?)
    }
}

/// Stacks per-instrument observations into a [`Panel`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelAssembler;

impl PanelAssembler {
    /// Concatenates every instrument's observations for one horizon.
    ///
    /// Instruments are visited in key order, so the row order is
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`TsmomError::DataIntegrity`] if an instrument contributes the
    /// same date twice, or if a row's instrument disagrees with its key.
    pub fn assemble(
        horizon: usize,
        per_instrument: BTreeMap<InstrumentId, Vec<ScaledReturnObservation>>,
    ) -> Result<Panel> {
        let mut rows = Vec::with_capacity(per_instrument.values().map(Vec::len).sum());
        for (instrument, observations) in per_instrument {
            if let Some(stray) = observations.iter().find(|o| o.instrument != instrument) {
                return Err(TsmomError::DataIntegrity(format!(
                    "observation for '{}' filed under '{instrument}'",
                    stray.instrument
                )));
            }
            rows.extend(observations);
        }
        Panel::new(horizon, rows)
    }
}
