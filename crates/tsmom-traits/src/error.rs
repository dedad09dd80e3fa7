//! Error types for the tsmom framework.
//!
//! This module defines the error taxonomy shared by every stage of the
//! momentum pipeline: configuration checks, data validation, panel assembly
//! and regression fitting.

use thiserror::Error;

/// The main error type for tsmom operations.
#[derive(Debug, Error)]
pub enum TsmomError {
    /// A panel is too small (or too degenerate) to fit.
    ///
    /// Recoverable: the sweep records an undefined result for the horizon and
    /// moves on.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Duplicate `(date, instrument)` rows reached panel assembly.
    ///
    /// Fatal to the affected group.
    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    /// Invalid sweep or estimator parameters. Raised before any computation.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Error due to invalid or malformed input data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a required column is missing from a price frame.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl TsmomError {
    /// Returns whether this error only invalidates a single horizon.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientData(_))
    }
}

/// A specialized Result type for tsmom operations.
pub type Result<T> = std::result::Result<T, TsmomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TsmomError::InsufficientData("3 rows".to_string());
        assert_eq!(err.to_string(), "Insufficient data: 3 rows");

        let err = TsmomError::MissingColumn("price".to_string());
        assert_eq!(err.to_string(), "Missing required column: price");

        let err = TsmomError::Configuration("vol_window must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: vol_window must be positive"
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(TsmomError::InsufficientData(String::new()).is_recoverable());
        assert!(!TsmomError::DataIntegrity(String::new()).is_recoverable());
        assert!(!TsmomError::Configuration(String::new()).is_recoverable());
    }

    #[test]
    fn test_result_type() {
        let ok_result: Result<i32> = Ok(42);
        assert!(ok_result.is_ok());

        let err_result: Result<i32> = Err(TsmomError::InvalidData("fail".to_string()));
        assert!(err_result.is_err());
    }
}
