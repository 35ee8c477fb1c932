//! Exchange rate data model and the provider seams used by acquisition

use crate::core::error::ProviderError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Currency code to rate, relative to a table's base currency.
pub type Rates = BTreeMap<String, f64>;

/// A complete rate table as returned by the provider.
///
/// Tables are replaced wholesale on every acquisition and never mutated
/// after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredRateTable")]
pub struct RateTable {
    pub base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub rates: Rates,
}

/// Wire shape of a persisted table, before invalid rates are filtered out.
#[derive(Deserialize)]
struct StoredRateTable {
    base: String,
    #[serde(default)]
    date: Option<String>,
    rates: Rates,
}

impl From<StoredRateTable> for RateTable {
    fn from(stored: StoredRateTable) -> Self {
        RateTable::new(stored.base, stored.date, stored.rates)
    }
}

impl RateTable {
    /// Builds a table, keeping only finite non-negative rates.
    pub fn new(base: impl Into<String>, date: Option<String>, rates: Rates) -> Self {
        let rates = rates
            .into_iter()
            .filter(|(_, rate)| rate.is_finite() && *rate >= 0.0)
            .collect();
        Self {
            base: base.into(),
            date,
            rates,
        }
    }
}

/// The last successfully fetched table and when it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRateTable {
    pub payload: RateTable,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// A rate table together with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionResult {
    pub data: RateTable,
    pub from_cache: bool,
    pub ts: DateTime<Utc>,
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, ProviderError>;
}

/// Reports whether the network is believed to be reachable.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Connectivity flag that can be flipped at runtime.
#[derive(Debug)]
pub struct NetworkStatus {
    online: AtomicBool,
}

impl NetworkStatus {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for NetworkStatus {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }
}
