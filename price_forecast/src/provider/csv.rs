//! CSV price files in the Yahoo download layout
//!
//! Expected header: `Date,Open,High,Low,Close,Adj Close,Volume`. Only the
//! date, open and close columns are read; lower-case headers are accepted.

use super::{validate_request, PriceSeriesProvider};
use crate::data::{PricePoint, PriceSeries};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date", alias = "date")]
    date: String,
    #[serde(
        rename = "Open",
        alias = "open",
        deserialize_with = "::csv::invalid_option"
    )]
    open: Option<f64>,
    #[serde(
        rename = "Close",
        alias = "close",
        deserialize_with = "::csv::invalid_option"
    )]
    close: Option<f64>,
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    // Accept both "2024-01-02" and "2024-01-02 00:00:00+00:00"
    let day = raw.trim().get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| ForecastError::DataUnavailable(format!("Invalid date '{}': {}", raw, e)))
}

/// Parse a price CSV from any reader.
///
/// Rows with an empty, `null` or non-finite open or close are skipped.
/// Rows are sorted by date and a repeated date keeps its last row.
pub fn read_price_csv<R: Read>(reader: R) -> Result<PriceSeries> {
    let mut csv_reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(::csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    for (line, record) in csv_reader.deserialize::<CsvRow>().enumerate() {
        let row = record
            .map_err(|e| ForecastError::DataUnavailable(format!("Malformed CSV row: {}", e)))?;

        match (row.open, row.close) {
            (Some(open), Some(close)) if open.is_finite() && close.is_finite() => {
                points.push(PricePoint::new(parse_date(&row.date)?, open, close))
            }
            _ => warn!(
                line = line + 2,
                date = %row.date,
                "skipping row with missing or non-finite prices"
            ),
        }
    }

    points.sort_by_key(|p| p.date);
    let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
    for point in points {
        match deduped.last_mut() {
            Some(last) if last.date == point.date => *last = point,
            _ => deduped.push(point),
        }
    }

    PriceSeries::new(deduped)
}

/// Load a price CSV from disk
pub fn load_price_csv<P: AsRef<Path>>(path: P) -> Result<PriceSeries> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        ForecastError::DataUnavailable(format!("Cannot open {}: {}", path.display(), e))
    })?;
    read_price_csv(file)
}

/// Provider reading `<dir>/<TICKER>.csv`
#[derive(Debug, Clone)]
pub struct CsvPriceProvider {
    dir: PathBuf,
}

impl CsvPriceProvider {
    /// Serve tickers from files in `dir`
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing `ticker`
    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", ticker.trim()))
    }
}

impl PriceSeriesProvider for CsvPriceProvider {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        validate_request(ticker, start, end)?;

        let path = self.path_for(ticker);
        if !path.is_file() {
            return Err(ForecastError::DataUnavailable(format!(
                "Unknown ticker {}: no file at {}",
                ticker,
                path.display()
            )));
        }

        let series = load_price_csv(&path)?.between(start, end)?;
        info!(ticker, rows = series.len(), path = %path.display(), "loaded price csv");

        Ok(series)
    }

    fn name(&self) -> &str {
        "csv"
    }
}
