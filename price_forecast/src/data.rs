//! Price series handling for forecasting

use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// One trading day of a price history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date
    pub date: NaiveDate,
    /// Opening price
    pub open: f64,
    /// Closing price
    pub close: f64,
}

impl PricePoint {
    /// Create a new price point
    pub fn new(date: NaiveDate, open: f64, close: f64) -> Self {
        Self { date, open, close }
    }
}

/// Ordered, non-empty price history with strictly increasing dates.
///
/// Gaps between dates (weekends, holidays) are allowed. A series is never
/// mutated after construction; forecasters only borrow it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create a series, validating ordering and non-emptiness
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(ForecastError::DataUnavailable(
                "Price series is empty".to_string(),
            ));
        }

        if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(ForecastError::InvalidParameter(format!(
                "Dates must be strictly increasing: {} is followed by {}",
                pair[0].date, pair[1].date
            )));
        }

        if let Some(bad) = points
            .iter()
            .find(|p| !p.open.is_finite() || !p.close.is_finite())
        {
            return Err(ForecastError::InvalidParameter(format!(
                "Non-finite price on {}",
                bad.date
            )));
        }

        Ok(Self { points })
    }

    /// Create a close-only series; opens are set equal to closes
    pub fn from_closes(dates: Vec<NaiveDate>, closes: Vec<f64>) -> Result<Self> {
        if dates.len() != closes.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Got {} dates but {} closes",
                dates.len(),
                closes.len()
            )));
        }

        let points = dates
            .into_iter()
            .zip(closes)
            .map(|(date, close)| PricePoint::new(date, close, close))
            .collect();

        Self::new(points)
    }

    /// Create a close-only series on consecutive calendar days from `start`
    pub fn daily(start: NaiveDate, closes: Vec<f64>) -> Result<Self> {
        let dates = (0..closes.len() as u64)
            .map(|offset| {
                start.checked_add_days(Days::new(offset)).ok_or_else(|| {
                    ForecastError::InvalidParameter(format!(
                        "Date overflow {} days after {}",
                        offset, start
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_closes(dates, closes)
    }

    /// All price points in date order
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed series
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dates in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Close prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Open prices in date order
    pub fn opens(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.open).collect()
    }

    /// First observation
    pub fn first(&self) -> &PricePoint {
        &self.points[0]
    }

    /// Most recent observation
    pub fn last(&self) -> &PricePoint {
        &self.points[self.points.len() - 1]
    }

    /// Calendar days between the first and last observation
    pub fn span_days(&self) -> i64 {
        (self.last().date - self.first().date).num_days()
    }

    /// The most recent `n` observations (fewer if the series is shorter)
    pub fn tail(&self, n: usize) -> &[PricePoint] {
        &self.points[self.points.len().saturating_sub(n)..]
    }

    /// Observations with `start <= date <= end`, if any remain
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let points: Vec<PricePoint> = self
            .points
            .iter()
            .filter(|p| p.date >= start && p.date <= end)
            .copied()
            .collect();

        if points.is_empty() {
            return Err(ForecastError::DataUnavailable(format!(
                "No observations between {} and {}",
                start, end
            )));
        }

        Ok(Self { points })
    }
}

/// The `count` consecutive calendar days after `last`
pub fn calendar_days_after(last: NaiveDate, count: usize) -> Result<Vec<NaiveDate>> {
    (1..=count as u64)
        .map(|offset| {
            last.checked_add_days(Days::new(offset)).ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "Date overflow {} days after {}",
                    offset, last
                ))
            })
        })
        .collect()
}
