//! Statistical utility functions shared by estimators and evaluators.
//!
//! Callers filter undefined values first. An undefined statistic is reported
//! as `None`, never as zero.

/// Minimum threshold for a standard deviation to be treated as non-zero.
pub const MIN_STD_THRESHOLD: f64 = 1e-10;

/// Arithmetic mean, `None` for an empty slice.
///
/// # Examples
///
/// ```
/// use tsmom_traits::stats::mean;
///
/// assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
/// assert_eq!(mean(&[]), None);
/// ```
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Variance with `ddof` delta degrees of freedom (0 = population, 1 = sample).
///
/// Returns `None` when `values.len() <= ddof`.
///
/// # Examples
///
/// ```
/// use tsmom_traits::stats::variance;
///
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert_eq!(variance(&v, 0), Some(4.0));
/// ```
pub fn variance(values: &[f64], ddof: usize) -> Option<f64> {
    let n = values.len();
    if n <= ddof {
        return None;
    }
    let m = mean(values)?;
    let ss = values.iter().map(|x| (x - m).powi(2)).sum::<f64>();
    Some(ss / (n - ddof) as f64)
}

/// Standard deviation with `ddof` delta degrees of freedom.
pub fn std_dev(values: &[f64], ddof: usize) -> Option<f64> {
    variance(values, ddof).map(f64::sqrt)
}

/// Scales a per-period volatility to an annual figure.
pub fn annualize_vol(vol: f64, periods_per_year: usize) -> f64 {
    vol * (periods_per_year as f64).sqrt()
}

/// Returns `x / divisor` when the divisor is a usable (positive, finite)
/// volatility and the result is finite.
pub fn checked_scale(x: f64, divisor: Option<f64>) -> Option<f64> {
    let divisor = divisor.filter(|v| v.is_finite() && *v > 0.0)?;
    Some(x / divisor).filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), Some(3.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_variance_population_and_sample() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(variance(&values, 0).unwrap(), 2.0);
        assert_relative_eq!(variance(&values, 1).unwrap(), 2.5);
    }

    #[test]
    fn test_variance_too_short() {
        assert_eq!(variance(&[1.0], 1), None);
        assert_eq!(variance(&[1.0], 0), Some(0.0));
        assert_eq!(variance(&[], 0), None);
    }

    #[test]
    fn test_std_dev_constant() {
        let sd = std_dev(&[5.0, 5.0, 5.0, 5.0], 1).unwrap();
        assert!(sd < MIN_STD_THRESHOLD);
    }

    #[test]
    fn test_annualize_vol() {
        assert_relative_eq!(annualize_vol(0.01, 252), 0.01 * 252.0_f64.sqrt());
        assert_relative_eq!(annualize_vol(0.05, 12), 0.05 * 12.0_f64.sqrt());
    }

    #[test]
    fn test_checked_scale() {
        assert_eq!(checked_scale(0.2, Some(0.1)), Some(2.0));
        assert_eq!(checked_scale(0.2, Some(0.0)), None);
        assert_eq!(checked_scale(0.2, Some(-0.1)), None);
        assert_eq!(checked_scale(0.2, None), None);
        assert_eq!(checked_scale(0.2, Some(f64::NAN)), None);
        assert_eq!(checked_scale(1e10, Some(f64::MIN_POSITIVE)), None);
    }
}
