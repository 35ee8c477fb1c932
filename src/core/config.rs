use crate::core::acquire::{DEFAULT_BASE_CURRENCY, DEFAULT_TTL};
use crate::core::schedule::DEFAULT_REFRESH_THROTTLE;
use crate::core::state::{Action, ConverterState, DEFAULT_AMOUNT, DEFAULT_FROM, DEFAULT_TO};
use crate::providers::fx_rates::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const ENV_BASE_URL: &str = "FXCONV_RATES_BASE_URL";
pub const ENV_API_KEY: &str = "FXCONV_RATES_API_KEY";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_base_currency() -> String {
    DEFAULT_BASE_CURRENCY.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

fn default_refresh_throttle_secs() -> u64 {
    DEFAULT_REFRESH_THROTTLE.as_secs()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DefaultsConfig {
    pub from: String,
    pub to: String,
    pub amount: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        DefaultsConfig {
            from: DEFAULT_FROM.to_string(),
            to: DEFAULT_TO.to_string(),
            amount: DEFAULT_AMOUNT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_refresh_throttle_secs")]
    pub refresh_throttle_secs: u64,
    #[serde(default)]
    pub data_path: Option<String>,
    #[serde(default)]
    pub offline: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            provider: ProviderConfig::default(),
            base_currency: default_base_currency(),
            defaults: DefaultsConfig::default(),
            cache_ttl_secs: default_cache_ttl_secs(),
            refresh_throttle_secs: default_refresh_throttle_secs(),
            data_path: None,
            offline: false,
        }
    }
}

impl AppConfig {
    /// Loads the config from `path`, or from the default location.
    ///
    /// An explicit path must exist. A missing file at the default location
    /// means defaults. Environment overrides are applied either way.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => {
                let default_path = Self::default_config_path()?;
                if default_path.exists() {
                    Self::load_from_path(&default_path)?
                } else {
                    debug!("No config at {}, using defaults", default_path.display());
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fxconv", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "fxconv", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Applies environment overrides for the provider endpoint and key.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            debug!("Provider base URL overridden from {}", ENV_BASE_URL);
            self.provider.base_url = base_url;
        }
        if let Some(api_key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.provider.api_key = Some(api_key);
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn refresh_throttle(&self) -> Duration {
        Duration::from_secs(self.refresh_throttle_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }

    pub fn default_state(&self) -> ConverterState {
        ConverterState::default()
            .reduce(Action::SetFrom(self.defaults.from.clone()))
            .reduce(Action::SetTo(self.defaults.to.clone()))
            .reduce(Action::SetAmount(self.defaults.amount.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
provider:
  base_url: "http://example.com/latest"
  api_key: "secret"
  timeout_secs: 3
base_currency: "USD"
defaults:
  from: "gbp"
  to: "JPY"
  amount: "25,5"
cache_ttl_secs: 600
refresh_throttle_secs: 2
data_path: "/tmp/fxconv"
offline: true
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.provider.base_url, "http://example.com/latest");
        assert_eq!(config.provider.api_key.as_deref(), Some("secret"));
        assert_eq!(config.provider_timeout(), Duration::from_secs(3));
        assert_eq!(config.base_currency, "USD");
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
        assert_eq!(config.refresh_throttle(), Duration::from_secs(2));
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/fxconv")
        );
        assert!(config.offline);

        let state = config.default_state();
        assert_eq!(state.from, "GBP");
        assert_eq!(state.to, "JPY");
        assert_eq!(state.amount, "25,5");
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert!(config.provider.api_key.is_none());
        assert_eq!(config.provider_timeout(), Duration::from_secs(12));
        assert_eq!(config.base_currency, "EUR");
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.defaults.from, DEFAULT_FROM);
        assert_eq!(config.defaults.amount, DEFAULT_AMOUNT);
        assert!(!config.offline);

        let partial: AppConfig =
            serde_yaml::from_str("defaults:\n  to: CHF\n").expect("Failed to deserialize");
        assert_eq!(partial.defaults.from, DEFAULT_FROM);
        assert_eq!(partial.defaults.to, "CHF");
    }

    #[test]
    fn test_env_overrides() {
        let env = HashMap::from([
            (ENV_BASE_URL, "http://localhost:9999/rates".to_string()),
            (ENV_API_KEY, "k3y".to_string()),
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).cloned());
        assert_eq!(config.provider.base_url, "http://localhost:9999/rates");
        assert_eq!(config.provider.api_key.as_deref(), Some("k3y"));

        // Blank values are ignored
        let mut config = AppConfig::default();
        config.apply_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert!(config.provider.api_key.is_none());
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = AppConfig::load(Some("/definitely/not/here/config.yaml"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
