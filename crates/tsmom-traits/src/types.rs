//! Common types used throughout the tsmom framework.
//!
//! This module defines the price and volatility series the pipeline operates
//! on, the asset-class dataset that groups them, and a thin wrapper around a
//! long-format Polars DataFrame used to load that dataset.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;

use crate::{Result, TsmomError};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// Days between 0001-01-01 (CE) and 1970-01-01 (Unix epoch).
///
/// Polars stores `Date` values as days since the Unix epoch, chrono counts
/// from the common era.
pub const CE_TO_UNIX_EPOCH_DAYS: i32 = 719_163;

/// Group label reserved for the union of all asset classes.
pub const POOLED: &str = "pooled";

/// An instrument identifier, e.g. `"ES"` or `"EURUSD"`.
pub type InstrumentId = String;

/// Prices of one instrument on an ordered date index.
///
/// Dates are strictly increasing. A `None` price is an explicit gap; a
/// present price is finite and strictly positive.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    dates: Vec<Date>,
    prices: Vec<Option<f64>>,
}

impl PriceSeries {
    /// Creates a price series, validating ordering and price values.
    ///
    /// # Errors
    ///
    /// Returns [`TsmomError::InvalidData`] if the lengths differ, dates are not
    /// strictly increasing, or a present price is non-finite or non-positive.
    pub fn new(dates: Vec<Date>, prices: Vec<Option<f64>>) -> Result<Self> {
        if dates.len() != prices.len() {
            return Err(TsmomError::InvalidData(format!(
                "{} dates but {} prices",
                dates.len(),
                prices.len()
            )));
        }

        if let Some(w) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(TsmomError::InvalidData(format!(
                "dates must be strictly increasing: {} followed by {}",
                w[0], w[1]
            )));
        }

        if let Some((date, price)) = dates
            .iter()
            .zip(prices.iter())
            .find_map(|(d, p)| p.filter(|p| !(p.is_finite() && *p > 0.0)).map(|p| (d, p)))
        {
            return Err(TsmomError::InvalidData(format!(
                "price on {date} must be positive and finite, got {price}"
            )));
        }

        Ok(Self { dates, prices })
    }

    /// Creates a gap-free series from `(date, price)` pairs.
    ///
    /// # Errors
    ///
    /// See [`PriceSeries::new`].
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Date, f64)>,
    {
        let (dates, prices): (Vec<Date>, Vec<Option<f64>>) =
            pairs.into_iter().map(|(d, p)| (d, Some(p))).unzip();
        Self::new(dates, prices)
    }

    /// Returns the number of dates in the series.
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns whether the series has no dates.
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Returns the date index.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Returns the prices, `None` marking gaps.
    pub fn prices(&self) -> &[Option<f64>] {
        &self.prices
    }

    /// Returns the price at position `idx`, if present.
    pub fn price(&self, idx: usize) -> Option<f64> {
        self.prices.get(idx).copied().flatten()
    }

    /// Simple one-period returns, aligned with the date index.
    ///
    /// The first entry is always `None`, as is any entry where either
    /// neighbouring price is missing.
    pub fn simple_returns(&self) -> Vec<Option<f64>> {
        let mut returns = Vec::with_capacity(self.prices.len());
        returns.extend(self.prices.first().map(|_| None));
        returns.extend(self.prices.windows(2).map(|w| match (w[0], w[1]) {
            (Some(prev), Some(curr)) => Some(curr / prev - 1.0),
            _ => None,
        }));
        returns
    }

    /// Aligns the series onto `index`, inserting gaps on dates it lacks.
    ///
    /// `index` must be sorted and contain every date of this series.
    ///
    /// # Errors
    ///
    /// Returns [`TsmomError::InvalidData`] if a date of the series is missing
    /// from `index`.
    pub fn reindex(&self, index: &[Date]) -> Result<Self> {
        let mut prices = vec![None; index.len()];
        let mut pos = 0;

        for (date, price) in self.dates.iter().zip(self.prices.iter()) {
            while pos < index.len() && index[pos] < *date {
                pos += 1;
            }
            if pos == index.len() || index[pos] != *date {
                return Err(TsmomError::InvalidData(format!(
                    "date {date} is not part of the target index"
                )));
            }
            prices[pos] = *price;
        }

        Ok(Self {
            dates: index.to_vec(),
            prices,
        })
    }
}

/// Annualized volatility of one instrument on its price date index.
///
/// `None` marks dates where the estimator has insufficient history.
#[derive(Debug, Clone, PartialEq)]
pub struct VolatilitySeries {
    dates: Vec<Date>,
    values: Vec<Option<f64>>,
}

impl VolatilitySeries {
    /// Creates a volatility series. Both vectors must have the same length.
    pub fn new(dates: Vec<Date>, values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        Self { dates, values }
    }

    /// Returns the number of dates in the series.
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns whether the series has no dates.
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Returns the date index.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Returns the volatility values.
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Returns the volatility at position `idx`, if defined.
    pub fn get(&self, idx: usize) -> Option<f64> {
        self.values.get(idx).copied().flatten()
    }

    /// Number of dates with a defined value.
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// All instruments of one asset class, aligned on a shared date index.
#[derive(Debug, Clone)]
pub struct AssetClass {
    dates: Vec<Date>,
    instruments: BTreeMap<InstrumentId, PriceSeries>,
}

impl AssetClass {
    /// Returns the shared (outer-joined) date index.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Returns the instruments in identifier order.
    pub const fn instruments(&self) -> &BTreeMap<InstrumentId, PriceSeries> {
        &self.instruments
    }

    /// Returns the price series of a single instrument.
    pub fn instrument(&self, id: &str) -> Option<&PriceSeries> {
        self.instruments.get(id)
    }
}

/// Price series grouped by asset class.
///
/// Every class is outer-joined onto the union of its instruments' dates, so
/// all series within a class share one index and missing prices are explicit
/// gaps. The dataset is immutable once built.
#[derive(Debug, Clone, Default)]
pub struct AssetClassDataset {
    classes: BTreeMap<String, AssetClass>,
}

impl AssetClassDataset {
    /// Builds a dataset from `asset class -> instrument -> series`.
    ///
    /// # Errors
    ///
    /// Returns [`TsmomError::InvalidData`] if an asset class is labelled
    /// [`POOLED`], or has no instruments.
    pub fn from_classes(
        classes: BTreeMap<String, BTreeMap<InstrumentId, PriceSeries>>,
    ) -> Result<Self> {
        let mut aligned = BTreeMap::new();

        for (label, instruments) in classes {
            if label == POOLED {
                return Err(TsmomError::InvalidData(format!(
                    "asset class label '{POOLED}' is reserved for the pooled group"
                )));
            }
            if instruments.is_empty() {
                return Err(TsmomError::InvalidData(format!(
                    "asset class '{label}' has no instruments"
                )));
            }

            let index: Vec<Date> = instruments
                .values()
                .flat_map(|s| s.dates().iter().copied())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();

            let instruments = instruments
                .into_iter()
                .map(|(id, series)| series.reindex(&index).map(|s| (id, s)))
                .collect::<Result<BTreeMap<_, _>>>()?;

            aligned.insert(
                label,
                AssetClass {
                    dates: index,
                    instruments,
                },
            );
        }

        Ok(Self { classes: aligned })
    }

    /// Returns the asset classes in label order.
    pub const fn classes(&self) -> &BTreeMap<String, AssetClass> {
        &self.classes
    }

    /// Returns a single asset class.
    pub fn asset_class(&self, label: &str) -> Option<&AssetClass> {
        self.classes.get(label)
    }

    /// Returns the asset-class labels in order.
    pub fn labels(&self) -> Vec<&str> {
        self.classes.keys().map(String::as_str).collect()
    }

    /// Total number of instruments across classes.
    pub fn n_instruments(&self) -> usize {
        self.classes.values().map(|c| c.instruments.len()).sum()
    }

    /// Length of the longest class date index.
    pub fn max_history_len(&self) -> usize {
        self.classes
            .values()
            .map(|c| c.dates.len())
            .max()
            .unwrap_or(0)
    }

    /// Returns whether the dataset has no asset classes.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Long-format price data.
///
/// `PriceFrame` wraps a Polars DataFrame with one row per
/// `(date, asset_class, instrument)` and converts it into an
/// [`AssetClassDataset`].
///
/// # Expected Schema
///
/// - `date`: `Date` column, or strings formatted `YYYY-MM-DD`
/// - `asset_class`: asset-class label
/// - `instrument`: instrument identifier
/// - `price`: numeric price; nulls are gaps
///
/// # Example
///
/// ```no_run
/// use tsmom_traits::PriceFrame;
/// use polars::prelude::*;
///
/// let df = df! {
///     "date" => &["2024-01-02", "2024-01-03"],
///     "asset_class" => &["equity", "equity"],
///     "instrument" => &["ES", "ES"],
///     "price" => &[4750.0, 4705.5],
/// }.unwrap();
///
/// let dataset = PriceFrame::new(df).into_dataset().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct PriceFrame {
    data: DataFrame,
}

impl PriceFrame {
    /// Columns every price frame must carry.
    pub const REQUIRED_COLUMNS: [&'static str; 4] = ["date", "asset_class", "instrument", "price"];

    /// Creates a new `PriceFrame` from a DataFrame.
    pub const fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the frame is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checks if a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }

    /// Converts the long frame into an aligned [`AssetClassDataset`].
    ///
    /// # Errors
    ///
    /// Returns an error if a required column is missing, a row has no date,
    /// class or instrument, a date string cannot be parsed, or an
    /// instrument repeats a date.
    pub fn into_dataset(self) -> Result<AssetClassDataset> {
        for col in Self::REQUIRED_COLUMNS {
            if !self.has_column(col) {
                return Err(TsmomError::MissingColumn(col.to_string()));
            }
        }

        let dates = self.date_column()?;

        let classes = self.data.column("asset_class")?.as_materialized_series().str()?;
        let instruments = self.data.column("instrument")?.as_materialized_series().str()?;
        let price_col = self.data.column("price")?.cast(&DataType::Float64)?;
        let prices = price_col.as_materialized_series().f64()?;

        let mut grouped: BTreeMap<String, BTreeMap<InstrumentId, Vec<(Date, Option<f64>)>>> =
            BTreeMap::new();

        for (((date, class), instrument), price) in dates
            .into_iter()
            .zip(classes.into_iter())
            .zip(instruments.into_iter())
            .zip(prices.into_iter())
        {
            let (Some(class), Some(instrument)) = (class, instrument) else {
                return Err(TsmomError::InvalidData(
                    "rows must carry an asset_class and an instrument".to_string(),
                ));
            };
            grouped
                .entry(class.to_string())
                .or_default()
                .entry(instrument.to_string())
                .or_default()
                .push((date, price));
        }

        let classes = grouped
            .into_iter()
            .map(|(class, instruments)| {
                let series = instruments
                    .into_iter()
                    .map(|(id, mut rows)| {
                        rows.sort_by_key(|(d, _)| *d);
                        let (d, p): (Vec<Date>, Vec<Option<f64>>) = rows.into_iter().unzip();
                        PriceSeries::new(d, p)
                            .map(|s| (id.clone(), s))
                            .map_err(|e| TsmomError::InvalidData(format!("instrument {id}: {e}")))
                    })
                    .collect::<Result<BTreeMap<_, _>>>()?;
                Ok((class, series))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        AssetClassDataset::from_classes(classes)
    }

    /// Reads the `date` column as chrono dates.
    fn date_column(&self) -> Result<Vec<Date>> {
        let series = self.data.column("date")?.as_materialized_series();

        if let Ok(date_series) = series.date() {
            return date_series
                .into_iter()
                .map(|d: Option<i32>| {
                    d.and_then(|days| Date::from_num_days_from_ce_opt(days + CE_TO_UNIX_EPOCH_DAYS))
                        .ok_or_else(|| TsmomError::InvalidData("missing or invalid date".to_string()))
                })
                .collect();
        }

        series
            .str()?
            .into_iter()
            .map(|d: Option<&str>| {
                let s = d.ok_or_else(|| TsmomError::InvalidData("missing date".to_string()))?;
                Date::parse_from_str(s.trim(), "%Y-%m-%d")
                    .map_err(|e| TsmomError::InvalidData(format!("invalid date '{s}': {e}")))
            })
            .collect()
    }
}

impl From<DataFrame> for PriceFrame {
    fn from(data: DataFrame) -> Self {
        Self::new(data)
    }
}

impl AsRef<DataFrame> for PriceFrame {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_price_series_rejects_unordered_dates() {
        let result = PriceSeries::new(vec![d(2), d(1)], vec![Some(1.0), Some(2.0)]);
        assert!(matches!(result, Err(TsmomError::InvalidData(_))));

        let result = PriceSeries::new(vec![d(1), d(1)], vec![Some(1.0), Some(2.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_price_series_rejects_non_positive_prices() {
        let result = PriceSeries::new(vec![d(1), d(2)], vec![Some(1.0), Some(0.0)]);
        assert!(result.is_err());

        let result = PriceSeries::new(vec![d(1), d(2)], vec![Some(f64::NAN), None]);
        assert!(result.is_err());

        let result = PriceSeries::new(vec![d(1), d(2)], vec![Some(1.0), None]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_simple_returns_with_gap() {
        let series = PriceSeries::new(
            vec![d(1), d(2), d(3), d(4), d(5)],
            vec![Some(100.0), Some(110.0), None, Some(99.0), Some(108.9)],
        )
        .unwrap();

        let returns = series.simple_returns();
        assert_eq!(returns.len(), 5);
        assert_eq!(returns[0], None);
        assert!((returns[1].unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(returns[2], None);
        assert_eq!(returns[3], None);
        assert!((returns[4].unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_simple_returns_empty() {
        let series = PriceSeries::new(vec![], vec![]).unwrap();
        assert!(series.simple_returns().is_empty());
    }

    #[test]
    fn test_reindex_inserts_gaps() {
        let series = PriceSeries::from_pairs([(d(2), 10.0), (d(4), 11.0)]).unwrap();
        let aligned = series.reindex(&[d(1), d(2), d(3), d(4)]).unwrap();

        assert_eq!(aligned.prices(), &[None, Some(10.0), None, Some(11.0)]);
        assert!(series.reindex(&[d(1), d(2)]).is_err());
    }

    #[test]
    fn test_dataset_outer_joins_classes() {
        let a = PriceSeries::from_pairs([(d(1), 1.0), (d(2), 1.1)]).unwrap();
        let b = PriceSeries::from_pairs([(d(2), 5.0), (d(3), 5.5)]).unwrap();

        let mut equity = BTreeMap::new();
        equity.insert("A".to_string(), a);
        equity.insert("B".to_string(), b);
        let mut classes = BTreeMap::new();
        classes.insert("equity".to_string(), equity);

        let dataset = AssetClassDataset::from_classes(classes).unwrap();
        let class = dataset.asset_class("equity").unwrap();

        assert_eq!(class.dates(), &[d(1), d(2), d(3)]);
        assert_eq!(class.instrument("A").unwrap().prices(), &[Some(1.0), Some(1.1), None]);
        assert_eq!(class.instrument("B").unwrap().prices(), &[None, Some(5.0), Some(5.5)]);
        assert_eq!(dataset.n_instruments(), 2);
        assert_eq!(dataset.max_history_len(), 3);
    }

    #[test]
    fn test_dataset_rejects_pooled_label() {
        let mut inner = BTreeMap::new();
        inner.insert("A".to_string(), PriceSeries::from_pairs([(d(1), 1.0)]).unwrap());
        let mut classes = BTreeMap::new();
        classes.insert(POOLED.to_string(), inner);

        assert!(AssetClassDataset::from_classes(classes).is_err());
    }

    #[test]
    fn test_price_frame_into_dataset() {
        let df = df! {
            "date" => &["2024-01-02", "2024-01-01", "2024-01-01", "2024-01-03"],
            "asset_class" => &["equity", "equity", "bond", "bond"],
            "instrument" => &["ES", "ES", "TY", "TY"],
            "price" => &[Some(101.0), Some(100.0), Some(120.0), None],
        }
        .unwrap();

        let dataset = PriceFrame::new(df).into_dataset().unwrap();
        assert_eq!(dataset.labels(), vec!["bond", "equity"]);

        let es = dataset.asset_class("equity").unwrap().instrument("ES").unwrap();
        assert_eq!(es.dates(), &[d(1), d(2)]);
        assert_eq!(es.prices(), &[Some(100.0), Some(101.0)]);

        let ty = dataset.asset_class("bond").unwrap().instrument("TY").unwrap();
        assert_eq!(ty.prices(), &[Some(120.0), None]);
    }

    #[test]
    fn test_price_frame_missing_column() {
        let df = df! {
            "date" => &["2024-01-02"],
            "price" => &[1.0],
        }
        .unwrap();

        let result = PriceFrame::new(df).into_dataset();
        assert!(matches!(result, Err(TsmomError::MissingColumn(c)) if c == "asset_class"));
    }

    #[test]
    fn test_price_frame_duplicate_date() {
        let df = df! {
            "date" => &["2024-01-02", "2024-01-02"],
            "asset_class" => &["equity", "equity"],
            "instrument" => &["ES", "ES"],
            "price" => &[1.0, 2.0],
        }
        .unwrap();

        assert!(PriceFrame::new(df).into_dataset().is_err());
    }

    #[test]
    fn test_date_type() {
        use chrono::Datelike;
        let date: Date = Date::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(
            Date::from_num_days_from_ce_opt(CE_TO_UNIX_EPOCH_DAYS),
            Date::from_ymd_opt(1970, 1, 1)
        );
    }
}
