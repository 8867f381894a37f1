use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use price_forecast::provider::csv::read_price_csv;
use price_forecast::provider::yahoo::parse_chart_response;
use price_forecast::provider::{CachedProvider, CsvPriceProvider, PriceCache, PriceSeriesProvider};
use price_forecast::{ForecastError, PriceSeries, Result};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

const BTC_CSV: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-01-01,42280.2,44175.4,42214.9,44167.3,44167.3,18426978443
2024-01-02,44187.1,45899.7,44176.9,44957.9,44957.9,39335274536
2024-01-03,44961.6,45503.2,40813.5,42848.1,42848.1,46342323118
2024-01-04,42855.8,44770.0,42675.1,44179.9,44179.9,30448091210
";

fn create_csv_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("BTC-USD.csv"), BTC_CSV).unwrap();
    dir
}

#[test]
fn test_csv_provider_filters_range() {
    let dir = create_csv_dir();
    let provider = CsvPriceProvider::new(dir.path());

    let series = provider
        .fetch("BTC-USD", date("2024-01-02"), date("2024-01-03"))
        .unwrap();

    assert_eq!(series.dates(), vec![date("2024-01-02"), date("2024-01-03")]);
    assert_eq!(series.closes(), vec![44957.9, 42848.1]);
    assert_eq!(series.opens(), vec![44187.1, 44961.6]);
    assert_eq!(provider.name(), "csv");
}

#[test]
fn test_csv_provider_unknown_ticker() {
    let dir = create_csv_dir();
    let provider = CsvPriceProvider::new(dir.path());

    let result = provider.fetch("NOPE-USD", date("2024-01-01"), date("2024-01-31"));
    assert!(matches!(result, Err(ForecastError::DataUnavailable(_))));
}

#[test]
fn test_csv_provider_empty_range() {
    let dir = create_csv_dir();
    let provider = CsvPriceProvider::new(dir.path());

    let result = provider.fetch("BTC-USD", date("2023-01-01"), date("2023-12-31"));
    assert!(matches!(result, Err(ForecastError::DataUnavailable(_))));
}

#[test]
fn test_invalid_request() {
    let dir = create_csv_dir();
    let provider = CsvPriceProvider::new(dir.path());

    let result = provider.fetch("BTC-USD", date("2024-02-01"), date("2024-01-01"));
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));

    let result = provider.fetch("  ", date("2024-01-01"), date("2024-02-01"));
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_csv_skips_missing_and_sorts() {
    let data = "\
date,open,close
2024-01-03,3.0,3.5
2024-01-01,1.0,1.5
2024-01-02,null,null
2024-01-04,,4.5
2024-01-03,3.1,3.6
";
    let series = read_price_csv(data.as_bytes()).unwrap();

    assert_eq!(series.dates(), vec![date("2024-01-01"), date("2024-01-03")]);
    assert_eq!(series.closes(), vec![1.5, 3.6]);
}

#[test]
fn test_csv_without_rows_is_unavailable() {
    let result = read_price_csv("Date,Open,Close\n".as_bytes());
    assert!(matches!(result, Err(ForecastError::DataUnavailable(_))));
}

const CHART_BODY: &str = r#"{
  "chart": {
    "result": [{
      "meta": {"currency": "USD", "symbol": "BTC-USD", "gmtoffset": 0},
      "timestamp": [1704067200, 1704153600, 1704240000],
      "indicators": {
        "quote": [{
          "open": [42280.2, 44187.1, 44961.6],
          "high": [44175.4, 45899.7, 45503.2],
          "low": [42214.9, 44176.9, 40813.5],
          "close": [44167.3, null, 42848.1],
          "volume": [18426978443, 39335274536, 46342323118]
        }]
      }
    }],
    "error": null
  }
}"#;

#[test]
fn test_parse_chart_drops_null_bars() {
    let series = parse_chart_response("BTC-USD", CHART_BODY).unwrap();

    assert_eq!(series.dates(), vec![date("2024-01-01"), date("2024-01-03")]);
    assert_eq!(series.closes(), vec![44167.3, 42848.1]);
}

#[test]
fn test_parse_chart_error_body() {
    let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
    let result = parse_chart_response("NOPE", body);

    match result {
        Err(ForecastError::DataUnavailable(msg)) => assert!(msg.contains("Not Found")),
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[test]
fn test_parse_chart_malformed() {
    let result = parse_chart_response("BTC-USD", "<html>rate limited</html>");
    assert!(matches!(result, Err(ForecastError::DataUnavailable(_))));
}

/// Provider that counts upstream calls
struct CountingProvider {
    calls: AtomicUsize,
}

impl CountingProvider {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl PriceSeriesProvider for CountingProvider {
    fn fetch(&self, _ticker: &str, start: NaiveDate, _end: NaiveDate) -> Result<PriceSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        PriceSeries::daily(start, vec![1.0, 2.0, 3.0])
    }

    fn name(&self) -> &str {
        "counting"
    }
}

#[test]
fn test_cached_provider_reads_through() {
    let provider = CachedProvider::new(CountingProvider::new(), PriceCache::with_default_ttl());

    let first = provider
        .fetch("btc-usd", date("2024-01-01"), date("2024-01-03"))
        .unwrap();
    let second = provider
        .fetch("BTC-USD", date("2024-01-01"), date("2024-01-03"))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(provider.inner().calls.load(Ordering::SeqCst), 1);
    assert_eq!(provider.cache().len(), 1);

    provider
        .fetch("BTC-USD", date("2024-01-02"), date("2024-01-03"))
        .unwrap();
    assert_eq!(provider.inner().calls.load(Ordering::SeqCst), 2);
    assert_eq!(provider.name(), "counting");
}

#[test]
fn test_cached_csv_ticker_case_does_not_depend_on_cache_state() {
    let dir = create_csv_dir();
    let (start, end) = (date("2024-01-01"), date("2024-01-02"));

    let cold = CachedProvider::new(
        CsvPriceProvider::new(dir.path()),
        PriceCache::with_default_ttl(),
    );
    let from_cold = cold.fetch("btc-usd", start, end).unwrap();

    let warm = CachedProvider::new(
        CsvPriceProvider::new(dir.path()),
        PriceCache::with_default_ttl(),
    );
    warm.fetch("BTC-USD", start, end).unwrap();
    let from_warm = warm.fetch("btc-usd", start, end).unwrap();

    assert_eq!(from_cold, from_warm);
    assert_eq!(from_cold.len(), 2);
}

#[test]
fn test_csv_non_finite_rows_are_skipped() {
    let data = "\
Date,Open,Close
2024-01-01,1.0,1.5
2024-01-02,NaN,2.5
2024-01-03,3.0,nan
2024-01-04,4.0,inf
2024-01-05,5.0,5.5
";
    let series = read_price_csv(data.as_bytes()).unwrap();

    assert_eq!(series.dates(), vec![date("2024-01-01"), date("2024-01-05")]);
}

#[test]
fn test_csv_only_non_finite_rows_is_unavailable() {
    let result = read_price_csv("Date,Open,Close\n2024-01-01,NaN,NaN\n".as_bytes());
    assert!(matches!(result, Err(ForecastError::DataUnavailable(_))));
}

#[test]
fn test_cached_provider_refetches_after_expiry() {
    let provider = CachedProvider::new(
        CountingProvider::new(),
        PriceCache::new(Duration::from_millis(50)),
    );

    provider
        .fetch("ETH-USD", date("2024-01-01"), date("2024-01-03"))
        .unwrap();
    thread::sleep(Duration::from_millis(100));
    provider
        .fetch("ETH-USD", date("2024-01-01"), date("2024-01-03"))
        .unwrap();

    assert_eq!(provider.inner().calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_disabled_cache_always_fetches() {
    let provider = CachedProvider::new(CountingProvider::new(), PriceCache::disabled());

    for _ in 0..3 {
        provider
            .fetch("DOT-USD", date("2024-01-01"), date("2024-01-03"))
            .unwrap();
    }

    assert_eq!(provider.inner().calls.load(Ordering::SeqCst), 3);
    assert!(provider.cache().is_empty());
}
