//! Price history providers
//!
//! A [`PriceSeriesProvider`] turns `(ticker, start, end)` into a
//! [`PriceSeries`]. Every failure (unknown ticker, unreachable source,
//! timeout, malformed payload, empty range) is reported as
//! [`ForecastError::DataUnavailable`].
//!
//! [`CachedProvider`] adds read-through caching with an injected
//! [`PriceCache`], so the cache lifetime and TTL are owned by the caller.

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use tracing::info;

pub mod cache;
pub mod csv;
pub mod yahoo;

pub use self::cache::{CacheKey, PriceCache};
pub use self::csv::CsvPriceProvider;
pub use self::yahoo::YahooChartProvider;

/// Source of historical daily prices
pub trait PriceSeriesProvider {
    /// Fetch daily prices for `ticker` with `start <= date <= end`
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries>;

    /// Short identifier used in logs
    fn name(&self) -> &str;
}

impl<P: PriceSeriesProvider + ?Sized> PriceSeriesProvider for Box<P> {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        (**self).fetch(ticker, start, end)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Reject empty tickers and inverted date ranges
pub(crate) fn validate_request(ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<()> {
    if ticker.trim().is_empty() {
        return Err(ForecastError::InvalidParameter(
            "Ticker must not be empty".to_string(),
        ));
    }
    if start > end {
        return Err(ForecastError::InvalidParameter(format!(
            "Start date {} is after end date {}",
            start, end
        )));
    }
    Ok(())
}

/// Read-through cache in front of another provider.
///
/// Tickers are normalized before both the cache lookup and the inner
/// fetch, so a request succeeds or fails the same way whether or not the
/// cache is warm.
#[derive(Debug, Clone)]
pub struct CachedProvider<P> {
    inner: P,
    cache: PriceCache,
}

impl<P: PriceSeriesProvider> CachedProvider<P> {
    /// Wrap `inner`, storing results in `cache`
    pub fn new(inner: P, cache: PriceCache) -> Self {
        Self { inner, cache }
    }

    /// The injected cache
    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    /// The wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: PriceSeriesProvider> PriceSeriesProvider for CachedProvider<P> {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        validate_request(ticker, start, end)?;
        let key = CacheKey::new(ticker, start, end);

        if let Some(series) = self.cache.get(&key) {
            info!(%key, "price cache hit");
            return Ok(series);
        }

        info!(%key, provider = self.inner.name(), "price cache miss");
        let series = self.inner.fetch(key.ticker(), start, end)?;
        self.cache.put(key, series.clone(), None);

        Ok(series)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
