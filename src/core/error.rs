//! Error types for rate acquisition and conversion

use std::time::Duration;
use thiserror::Error;

/// Failure talking to the rates provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("HTTP error: {status} {body}")]
    Http { status: u16, body: String },
    #[error("Request timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
    #[error("Malformed rates response: {0}")]
    Malformed(String),
    #[error("Request error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("Bad amount")]
    InvalidAmount,
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Raised only when the network path failed and nothing was cached.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AcquisitionError {
    #[error("No exchange rates available: {source}")]
    Unavailable {
        #[source]
        source: ProviderError,
    },
}
