//! Rate acquisition policy.
//!
//! Decides between the cached table and a network fetch:
//!
//! 1. Offline with a cached table: serve the cache, even when forced.
//! 2. Not forced and the cached table is younger than the TTL: serve the cache.
//! 3. Otherwise fetch. A successful fetch is persisted and returned fresh; a
//!    failed fetch falls back to any cached table regardless of age, and only
//!    surfaces as an error when nothing is cached.

use crate::core::cache::RateCacheStore;
use crate::core::error::AcquisitionError;
use crate::core::rates::{
    AcquisitionResult, CachedRateTable, Connectivity, NetworkStatus, RateProvider,
};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_BASE_CURRENCY: &str = "EUR";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AcquireOptions {
    pub force_refresh: bool,
}

impl AcquireOptions {
    pub fn forced() -> Self {
        Self {
            force_refresh: true,
        }
    }
}

pub struct RateAcquirer {
    provider: Arc<dyn RateProvider>,
    cache: RateCacheStore,
    connectivity: Arc<dyn Connectivity>,
    clock: Arc<dyn Clock>,
    base: String,
    ttl: Duration,
    // Serializes acquisitions so two fetches never race on the cache write.
    in_flight: Mutex<()>,
}

impl RateAcquirer {
    pub fn new(provider: Arc<dyn RateProvider>, cache: RateCacheStore) -> Self {
        Self {
            provider,
            cache,
            connectivity: Arc::new(NetworkStatus::default()),
            clock: Arc::new(SystemClock),
            base: DEFAULT_BASE_CURRENCY.to_string(),
            ttl: DEFAULT_TTL,
            in_flight: Mutex::new(()),
        }
    }

    pub fn with_base(mut self, base: &str) -> Self {
        self.base = base.to_string();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, cached: &CachedRateTable, now: DateTime<Utc>) -> bool {
        let ttl = TimeDelta::from_std(self.ttl).unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(cached.timestamp) < ttl
    }

    #[instrument(name = "AcquireRates", skip(self), fields(base = %self.base))]
    pub async fn acquire(
        &self,
        options: AcquireOptions,
    ) -> Result<AcquisitionResult, AcquisitionError> {
        let _guard = self.in_flight.lock().await;

        let cached = self.cache.load().await;
        let now = self.clock.now();

        if let Some(cached) = &cached {
            if !self.connectivity.is_online() {
                debug!("Offline, serving cached rates");
                return Ok(from_cache(cached));
            }
            if !options.force_refresh && self.is_fresh(cached, now) {
                debug!("Cached rates are fresh, skipping fetch");
                return Ok(from_cache(cached));
            }
        }

        match self.provider.fetch_rates(&self.base).await {
            Ok(table) => {
                let ts = self.clock.now();
                let entry = CachedRateTable {
                    payload: table,
                    timestamp: ts,
                };
                self.cache.save(&entry).await;
                debug!(count = entry.payload.rates.len(), "Fetched fresh rates");
                Ok(AcquisitionResult {
                    data: entry.payload,
                    from_cache: false,
                    ts,
                })
            }
            Err(e) => match cached {
                Some(cached) => {
                    warn!(error = %e, "Rate fetch failed, falling back to cached rates");
                    Ok(from_cache(&cached))
                }
                None => Err(AcquisitionError::Unavailable { source: e }),
            },
        }
    }
}

fn from_cache(cached: &CachedRateTable) -> AcquisitionResult {
    AcquisitionResult {
        data: cached.payload.clone(),
        from_cache: true,
        ts: cached.timestamp,
    }
}
