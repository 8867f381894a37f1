//! Yahoo Finance chart endpoint adapter

use super::{validate_request, PriceSeriesProvider};
use crate::data::{PricePoint, PriceSeries};
use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate, TimeZone, Utc};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

/// Public chart API host
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Parse a chart API response body into a daily series.
///
/// Bars with a null open or close are dropped. Timestamps are shifted by
/// the exchange GMT offset before taking the calendar date; a repeated
/// date keeps its last bar.
pub fn parse_chart_response(ticker: &str, body: &str) -> Result<PriceSeries> {
    let response: ChartResponse = serde_json::from_str(body).map_err(|e| {
        ForecastError::DataUnavailable(format!("Failed to parse chart for {}: {}", ticker, e))
    })?;

    if let Some(error) = response.chart.error {
        return Err(ForecastError::DataUnavailable(format!(
            "Chart API error for {}: {} {}",
            ticker,
            error.code.unwrap_or_default(),
            error.description.unwrap_or_default()
        )));
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ForecastError::DataUnavailable(format!("No chart data for {}", ticker)))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().ok_or_else(|| {
        ForecastError::DataUnavailable(format!("No quote indicators for {}", ticker))
    })?;

    let mut points: Vec<PricePoint> = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let (Some(open), Some(close)) = (
            quote.open.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
        ) else {
            warn!(ticker, timestamp = ts, "dropping bar with missing prices");
            continue;
        };

        let date = Utc
            .timestamp_opt(ts + result.meta.gmtoffset, 0)
            .single()
            .ok_or_else(|| {
                ForecastError::DataUnavailable(format!("Invalid timestamp {} for {}", ts, ticker))
            })?
            .date_naive();

        match points.last_mut() {
            Some(last) if last.date == date => *last = PricePoint::new(date, open, close),
            Some(last) if last.date > date => {
                return Err(ForecastError::DataUnavailable(format!(
                    "Chart bars for {} are out of order at {}",
                    ticker, date
                )))
            }
            _ => points.push(PricePoint::new(date, open, close)),
        }
    }

    PriceSeries::new(points).map_err(|e| match e {
        ForecastError::DataUnavailable(_) => {
            ForecastError::DataUnavailable(format!("No usable bars for {}", ticker))
        }
        other => other,
    })
}

fn unix_seconds(date: NaiveDate) -> Result<i64> {
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
        ForecastError::InvalidParameter(format!("Cannot build midnight of {}", date))
    })?;
    Ok(Utc.from_utc_datetime(&midnight).timestamp())
}

/// Blocking HTTP provider for the Yahoo chart API
#[derive(Debug, Clone)]
pub struct YahooChartProvider {
    client: Client,
    base_url: String,
}

impl YahooChartProvider {
    /// Create a provider whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            ForecastError::DataUnavailable(format!("Cannot build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the provider at another host, e.g. a local mock
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn chart_url(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<String> {
        // period2 is exclusive, so ask for the day after `end`
        let after_end = end.checked_add_days(Days::new(1)).ok_or_else(|| {
            ForecastError::InvalidParameter(format!("Date overflow after {}", end))
        })?;

        Ok(format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url,
            ticker.trim(),
            unix_seconds(start)?,
            unix_seconds(after_end)?
        ))
    }
}

impl PriceSeriesProvider for YahooChartProvider {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        validate_request(ticker, start, end)?;
        let url = self.chart_url(ticker, start, end)?;

        info!(ticker, %start, %end, "fetching chart");
        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, "Mozilla/5.0")
            .send()
            .map_err(|e| {
                ForecastError::DataUnavailable(format!("Request for {} failed: {}", ticker, e))
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| {
            ForecastError::DataUnavailable(format!("Reading response for {} failed: {}", ticker, e))
        })?;

        if !status.is_success() {
            // The API still returns a JSON error body for unknown tickers
            return match parse_chart_response(ticker, &body) {
                Err(e) => Err(e),
                Ok(_) => Err(ForecastError::DataUnavailable(format!(
                    "Chart request for {} returned HTTP {}",
                    ticker, status
                ))),
            };
        }

        parse_chart_response(ticker, &body)?.between(start, end)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_url_covers_end_date() {
        let provider = YahooChartProvider::new(DEFAULT_TIMEOUT)
            .unwrap()
            .with_base_url("http://localhost:9/");
        let url = provider
            .chart_url(
                "BTC-USD",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            )
            .unwrap();

        assert_eq!(
            url,
            "http://localhost:9/v8/finance/chart/BTC-USD?period1=1704067200&period2=1704240000&interval=1d&events=history"
        );
    }
}
