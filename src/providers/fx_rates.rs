use crate::core::error::ProviderError;
use crate::core::rates::{RateProvider, RateTable, Rates};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::value::RawValue;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_BASE_URL: &str = "https://api.fxratesapi.com/latest";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(12);

/// Client for a `latest`-style rates endpoint returning
/// `{ base, date?, rates: { CODE: number | "number" } }`.
pub struct FxRatesProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl FxRatesProvider {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent("fxconv/0.1")
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(FxRatesProvider {
            client,
            base_url: base_url.to_string(),
            api_key,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn request_url(&self, base: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ProviderError::Transport(format!("Invalid provider URL {}: {}", self.base_url, e))
        })?;

        // `base` and `apikey` already present in the URL are replaced
        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "base" && key != "apikey")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            pairs.extend_pairs(retained);
            pairs.append_pair("base", base);
            if let Some(api_key) = &self.api_key {
                pairs.append_pair("apikey", api_key);
            }
        }
        Ok(url)
    }

    async fn fetch_body(&self, url: Url) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(%status, "Received rates response");

        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(format!("Failed to read response body: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct FxRatesResponse {
    base: String,
    #[serde(default)]
    date: Option<String>,
    // Kept raw so one unusable entry (e.g. `1e400`) cannot fail the whole body
    rates: HashMap<String, Box<RawValue>>,
}

/// Reads a rate given as a JSON number or a numeric string. Anything else
/// yields `None`. Out-of-range numbers come back infinite and are dropped
/// by [`RateTable::new`].
fn rate_value(raw: &RawValue) -> Option<f64> {
    let text = raw.get().trim();
    if text.starts_with('"') {
        let s: String = serde_json::from_str(text).ok()?;
        s.trim().parse().ok()
    } else if text.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}

fn normalize(response: FxRatesResponse) -> RateTable {
    let total = response.rates.len();
    let rates: Rates = response
        .rates
        .iter()
        .filter_map(|(code, raw)| rate_value(raw).map(|rate| (code.clone(), rate)))
        .collect();
    let table = RateTable::new(response.base, response.date, rates);
    if table.rates.len() < total {
        debug!(
            dropped = total - table.rates.len(),
            "Dropped unusable rate entries"
        );
    }
    table
}

fn parse_rates(body: &str) -> Result<RateTable, ProviderError> {
    let response: FxRatesResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;
    Ok(normalize(response))
}

#[async_trait]
impl RateProvider for FxRatesProvider {
    #[instrument(name = "FxRatesFetch", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, ProviderError> {
        let url = self.request_url(base)?;
        debug!("Requesting rates from {}", self.base_url);

        let body = tokio::time::timeout(self.timeout, self.fetch_body(url))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))??;

        parse_rates(&body)
    }
}
