//! In-memory TTL cache for fetched price series.

use crate::data::PriceSeries;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::warn;

/// Default time-to-live of a cached series
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Identity of one fetch request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    ticker: String,
    start: NaiveDate,
    end: NaiveDate,
}

impl CacheKey {
    /// Tickers are case-insensitive
    pub fn new(ticker: &str, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            start,
            end,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}..{}]", self.ticker, self.start, self.end)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    series: PriceSeries,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<CacheKey, CacheEntry>,
    default_ttl: Duration,
}

impl CacheInner {
    fn new(default_ttl: Duration) -> Self {
        Self {
            map: HashMap::new(),
            default_ttl,
        }
    }

    fn get(&self, key: &CacheKey) -> Option<PriceSeries> {
        self.map.get(key).and_then(|entry| {
            if Instant::now() <= entry.expires_at {
                Some(entry.series.clone())
            } else {
                None
            }
        })
    }

    fn put(&mut self, key: CacheKey, series: PriceSeries, ttl_override: Option<Duration>) {
        let ttl = ttl_override.unwrap_or(self.default_ttl);
        let now = Instant::now();
        self.map.retain(|_, entry| entry.expires_at > now);
        self.map.insert(
            key,
            CacheEntry {
                series,
                expires_at: now + ttl,
            },
        );
    }

    fn clear_expired(&mut self) {
        let now = Instant::now();
        self.map.retain(|_, entry| entry.expires_at > now);
    }
}

/// Thread-safe read-through cache of price series.
///
/// Clones share the same storage and readers never block each other.
/// A poisoned lock reads as a miss and drops writes.
#[derive(Debug, Clone)]
pub struct PriceCache {
    inner: Arc<RwLock<CacheInner>>,
}

impl PriceCache {
    /// Create a cache with a default TTL
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CacheInner::new(default_ttl))),
        }
    }

    /// Create a cache with a default TTL of 5 minutes
    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_TTL)
    }

    /// Create a cache that never stores anything
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Cached series for `key` if present and not expired
    pub fn get(&self, key: &CacheKey) -> Option<PriceSeries> {
        match self.inner.read() {
            Ok(store) => store.get(key),
            Err(_) => {
                warn!(%key, "price cache lock poisoned; treating as miss");
                None
            }
        }
    }

    /// Store a series. `ttl_override` replaces the default TTL for this entry.
    ///
    /// Expired entries are pruned on every write. No-op when the cache is
    /// disabled.
    pub fn put(&self, key: CacheKey, series: PriceSeries, ttl_override: Option<Duration>) {
        match self.inner.write() {
            Ok(mut store) => {
                if store.default_ttl == Duration::ZERO {
                    return;
                }
                store.put(key, series, ttl_override);
            }
            Err(_) => warn!(%key, "price cache lock poisoned; dropping write"),
        }
    }

    /// Remove expired entries
    pub fn clear_expired(&self) {
        if let Ok(mut store) = self.inner.write() {
            store.clear_expired();
        }
    }

    /// Remove all entries
    pub fn clear(&self) {
        if let Ok(mut store) = self.inner.write() {
            store.map.clear();
        }
    }

    /// Number of entries, including expired ones not yet cleared
    pub fn len(&self) -> usize {
        self.inner.read().map(|store| store.map.len()).unwrap_or(0)
    }

    /// Whether no entries are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the cache was created disabled (TTL of zero)
    pub fn is_disabled(&self) -> bool {
        self.inner
            .read()
            .map(|store| store.default_ttl == Duration::ZERO)
            .unwrap_or(true)
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::with_default_ttl()
    }
}
