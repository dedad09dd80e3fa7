//! Per-group horizon results of a sweep.

use std::collections::BTreeMap;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tsmom_traits::Result;

use crate::regression::RegressionResult;

/// Regression results per group, plus the groups a fatal error aborted.
///
/// Group labels are asset classes and [`POOLED`](tsmom_traits::POOLED).
/// Each group's results are ordered by horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsTable {
    results: BTreeMap<String, Vec<RegressionResult>>,
    errors: BTreeMap<String, String>,
}

impl ResultsTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a group's results, sorted by horizon.
    pub fn insert_group(&mut self, label: impl Into<String>, mut results: Vec<RegressionResult>) {
        results.sort_by_key(|r| r.horizon);
        self.results.insert(label.into(), results);
    }

    /// Records the error that aborted a group and drops its results.
    pub fn record_error(&mut self, label: impl Into<String>, message: impl Into<String>) {
        let label = label.into();
        self.results.remove(&label);
        self.errors.insert(label, message.into());
    }

    /// Results of one group.
    #[must_use]
    pub fn group(&self, label: &str) -> Option<&[RegressionResult]> {
        self.results.get(label).map(Vec::as_slice)
    }

    /// Result of one group at one horizon.
    #[must_use]
    pub fn get(&self, label: &str, horizon: usize) -> Option<&RegressionResult> {
        self.group(label)?.iter().find(|r| r.horizon == horizon)
    }

    /// All completed groups.
    #[must_use]
    pub const fn groups(&self) -> &BTreeMap<String, Vec<RegressionResult>> {
        &self.results
    }

    /// Labels of completed groups.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    /// Aborted groups and their error messages.
    #[must_use]
    pub const fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Error that aborted a group, if any.
    #[must_use]
    pub fn error(&self, label: &str) -> Option<&str> {
        self.errors.get(label).map(String::as_str)
    }

    /// Whether no group completed and none failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty() && self.errors.is_empty()
    }

    /// Converts one group to a DataFrame with columns `horizon`, `beta`,
    /// `std_error`, `t_stat`, `p_value`.
    ///
    /// Undefined statistics are nulls. Returns `Ok(None)` for an unknown or
    /// aborted group.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be built.
    pub fn to_frame(&self, label: &str) -> Result<Option<DataFrame>> {
        let Some(results) = self.group(label) else {
            return Ok(None);
        };

        let horizons: Vec<u32> = results
            .iter()
            .map(|r| u32::try_from(r.horizon).unwrap_or(u32::MAX))
            .collect();
        let column = |f: fn(&RegressionResult) -> Option<f64>| -> Vec<Option<f64>> {
            results.iter().map(f).collect()
        };

        let frame = df!(
            "horizon" => horizons,
            "beta" => column(|r| r.beta),
            "std_error" => column(|r| r.std_error),
            "t_stat" => column(|r| r.t_stat),
            "p_value" => column(|r| r.p_value),
        )?;
        Ok(Some(frame))
    }
}
