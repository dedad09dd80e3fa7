//! Data loading and synthetic data for the tsmom CLI.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use tsmom_traits::{AssetClassDataset, CE_TO_UNIX_EPOCH_DAYS, PriceFrame, TsmomError};

/// Asset classes of the synthetic universe with their annualized volatility.
const SYNTHETIC_CLASSES: [(&str, f64); 4] = [
    ("bond", 0.06),
    ("commodity", 0.25),
    ("currency", 0.10),
    ("equity", 0.18),
];

/// Load a long-format price CSV (`date,asset_class,instrument,price`).
///
/// Dates are `YYYY-MM-DD`; an empty price is a gap.
pub(crate) fn load_prices(path: &Path) -> Result<AssetClassDataset> {
    let schema = Schema::from_iter([
        Field::new("date".into(), DataType::String),
        Field::new("asset_class".into(), DataType::String),
        Field::new("instrument".into(), DataType::String),
        Field::new("price".into(), DataType::Float64),
    ]);

    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_schema_overwrite(Some(Arc::new(schema)))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("failed to open {}", path.display()))?
        .finish()
        .with_context(|| format!("failed to parse {}", path.display()))?;

    tracing::info!(path = %path.display(), rows = frame.height(), "loaded price file");

    Ok(PriceFrame::new(frame).into_dataset()?)
}

/// Write a DataFrame to CSV with a header row.
pub(crate) fn write_csv(frame: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    CsvWriter::new(&mut file).include_header(true).finish(frame)?;
    Ok(())
}

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate, TsmomError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|e| TsmomError::InvalidData(format!("Invalid date format: {}", e)))
}

/// Parameters of the synthetic price generator.
#[derive(Debug, Clone)]
pub(crate) struct SyntheticSpec {
    /// Instruments per asset class.
    pub(crate) instruments_per_class: usize,
    /// Trading days per instrument.
    pub(crate) n_days: usize,
    /// First trading day; weekends are skipped.
    pub(crate) start: NaiveDate,
    /// Daily persistence of each instrument's drift.
    pub(crate) persistence: f64,
    /// Stationary drift size relative to daily volatility.
    pub(crate) trend_strength: f64,
    /// Probability that a price is missing.
    pub(crate) gap_rate: f64,
    /// RNG seed.
    pub(crate) seed: u64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            instruments_per_class: 6,
            n_days: 252 * 20,
            start: NaiveDate::from_ymd_opt(2000, 1, 3).unwrap_or_default(),
            persistence: 0.995,
            trend_strength: 0.08,
            gap_rate: 0.0,
            seed: 42,
        }
    }
}

/// Weekdays starting at `start`.
fn trading_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(n);
    let mut day = start;
    while days.len() < n {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(day);
        }
        day += Duration::days(1);
    }
    days
}

/// Generate a long-format price frame with trending instruments.
///
/// Each instrument's daily return is a persistent AR(1) drift plus noise
/// that loads on a shock common to its asset class, so momentum appears at
/// short horizons and dates carry correlated residuals.
pub(crate) fn synthetic_frame(spec: &SyntheticSpec) -> Result<DataFrame> {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let days = trading_days(spec.start, spec.n_days);
    let epoch_days: Vec<i32> = days
        .iter()
        .map(|d| d.num_days_from_ce() - CE_TO_UNIX_EPOCH_DAYS)
        .collect();

    let capacity = SYNTHETIC_CLASSES.len() * spec.instruments_per_class * days.len();
    let mut out_dates = Vec::with_capacity(capacity);
    let mut out_classes = Vec::with_capacity(capacity);
    let mut out_instruments = Vec::with_capacity(capacity);
    let mut out_prices: Vec<Option<f64>> = Vec::with_capacity(capacity);

    let phi = spec.persistence.clamp(0.0, 0.9999);
    let innovation = (1.0 - phi * phi).sqrt();

    for (class, annual_vol) in SYNTHETIC_CLASSES {
        let sigma = annual_vol / 252f64.sqrt();
        let common: Vec<f64> = (0..days.len())
            .map(|_| rng.sample::<f64, _>(StandardNormal))
            .collect();

        for k in 0..spec.instruments_per_class {
            let instrument = format!("{}{:02}", &class[..3].to_uppercase(), k + 1);
            let mut price = 100.0;
            let mut drift = 0.0;

            for (t, day) in epoch_days.iter().enumerate() {
                if t > 0 {
                    let z_drift: f64 = rng.sample(StandardNormal);
                    let z_own: f64 = rng.sample(StandardNormal);
                    drift = phi * drift + innovation * spec.trend_strength * sigma * z_drift;
                    let ret = drift + sigma * (0.5 * common[t] + 0.866 * z_own);
                    price *= 1.0 + ret.max(-0.5);
                }

                let missing = spec.gap_rate > 0.0 && rng.gen_bool(spec.gap_rate.min(1.0));
                out_dates.push(*day);
                out_classes.push(class);
                out_instruments.push(instrument.clone());
                out_prices.push((!missing).then_some(price));
            }
        }
    }

    let frame = df!(
        "date" => out_dates,
        "asset_class" => out_classes,
        "instrument" => out_instruments,
        "price" => out_prices,
    )?;

    Ok(frame
        .lazy()
        .with_column(col("date").cast(DataType::Date))
        .collect()?)
}

/// Generate a synthetic dataset directly.
pub(crate) fn synthetic_dataset(spec: &SyntheticSpec) -> Result<AssetClassDataset> {
    let frame = synthetic_frame(spec)?;
    Ok(PriceFrame::new(frame).into_dataset()?)
}

/// Load prices from `path`, or synthesize them with `seed` when no path is given.
pub(crate) fn load_or_synthesize(path: Option<&Path>, seed: u64) -> Result<AssetClassDataset> {
    match path {
        Some(path) => load_prices(path),
        None => {
            tracing::info!(seed, "no price file given, using synthetic data");
            synthetic_dataset(&SyntheticSpec {
                seed,
                ..Default::default()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn small_spec() -> SyntheticSpec {
        SyntheticSpec {
            instruments_per_class: 2,
            n_days: 300,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_parse_date_invalid() {
        let result = parse_date("invalid");
        assert!(result.is_err());
    }

    #[test]
    fn test_trading_days_skip_weekends() {
        // 2024-01-05 is a Friday
        let start = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let days = trading_days(start, 3);
        assert_eq!(days.len(), 3);
        assert_eq!(days[1], NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert!(days.iter().all(|d| d.weekday() != Weekday::Sat));
    }

    #[test]
    fn test_synthetic_dataset_shape() {
        let dataset = synthetic_dataset(&small_spec()).unwrap();
        assert_eq!(dataset.classes().len(), SYNTHETIC_CLASSES.len());
        assert_eq!(dataset.n_instruments(), SYNTHETIC_CLASSES.len() * 2);
        assert_eq!(dataset.max_history_len(), 300);

        let equity = dataset.asset_class("equity").unwrap();
        assert!(equity.instrument("EQU01").is_some());
    }

    #[test]
    fn test_synthetic_is_seeded() {
        let a = synthetic_frame(&small_spec()).unwrap();
        let b = synthetic_frame(&small_spec()).unwrap();
        assert!(a.equals_missing(&b));

        let c = synthetic_frame(&SyntheticSpec {
            seed: 7,
            ..small_spec()
        })
        .unwrap();
        assert!(!a.equals_missing(&c));
    }

    #[test]
    fn test_synthetic_gaps() {
        let frame = synthetic_frame(&SyntheticSpec {
            gap_rate: 0.2,
            ..small_spec()
        })
        .unwrap();
        let nulls = frame.column("price").unwrap().null_count();
        assert!(nulls > 0);
        assert!(nulls < frame.height());
    }

    #[test]
    fn test_load_prices_csv() {
        let dir = std::env::temp_dir().join(format!("tsmom-load-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("prices.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "date,asset_class,instrument,price").unwrap();
        writeln!(file, "2024-01-02,equity,ES,4750.0").unwrap();
        writeln!(file, "2024-01-03,equity,ES,").unwrap();
        writeln!(file, "2024-01-04,equity,ES,4790.5").unwrap();
        writeln!(file, "2024-01-02,bond,10,110.0").unwrap();
        drop(file);

        let dataset = load_prices(&path).unwrap();
        let es = dataset.asset_class("equity").unwrap().instrument("ES").unwrap();
        assert_eq!(es.len(), 3);
        assert_eq!(es.price(1), None);
        assert!(dataset.asset_class("bond").unwrap().instrument("10").is_some());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_synthetic_csv_round_trip() {
        let dir = std::env::temp_dir().join(format!("tsmom-csv-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("synthetic.csv");

        let mut frame = synthetic_frame(&small_spec()).unwrap();
        write_csv(&mut frame, &path).unwrap();

        let dataset = load_prices(&path).unwrap();
        assert_eq!(dataset.n_instruments(), SYNTHETIC_CLASSES.len() * 2);
        assert_eq!(dataset.max_history_len(), 300);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file() {
        assert!(load_prices(Path::new("/nonexistent/prices.csv")).is_err());
    }
}
