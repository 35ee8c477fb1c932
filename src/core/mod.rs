//! Core conversion logic and abstractions

pub mod acquire;
pub mod amount;
pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod log;
pub mod rates;
pub mod schedule;
pub mod state;

// Re-export main types for cleaner imports
pub use acquire::{AcquireOptions, RateAcquirer};
pub use cache::{KeyValueStore, RateCacheStore};
pub use error::{AcquisitionError, ConversionError, ProviderError};
pub use rates::{AcquisitionResult, CachedRateTable, RateProvider, RateTable, Rates};
