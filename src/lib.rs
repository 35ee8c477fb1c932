pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::acquire::RateAcquirer;
use crate::core::cache::{KeyValueStore, RateCacheStore};
use crate::core::config::AppConfig;
use crate::core::rates::NetworkStatus;
use crate::providers::FxRatesProvider;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Convert {
        amount: Option<String>,
        from: Option<String>,
        to: Option<String>,
        refresh: bool,
    },
    Swap,
    Rates {
        refresh: bool,
    },
    Watch,
}

/// Options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config_path: Option<String>,
    pub offline: bool,
    pub ephemeral: bool,
}

/// Everything a command needs, built once per run.
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<dyn KeyValueStore>,
    pub network: Arc<NetworkStatus>,
    pub acquirer: RateAcquirer,
}

impl AppContext {
    pub fn build(options: &RunOptions) -> Result<Self> {
        let config = AppConfig::load(options.config_path.as_deref())?;
        debug!(
            base_url = %config.provider.base_url,
            base_currency = %config.base_currency,
            "Loaded config"
        );

        let data_path = config.default_data_path()?;
        let store = store::open_store(&data_path, options.ephemeral)?;
        let network = Arc::new(NetworkStatus::new(!(options.offline || config.offline)));

        let provider =
            FxRatesProvider::new(&config.provider.base_url, config.provider.api_key.clone())?
                .with_timeout(config.provider_timeout());
        let acquirer = RateAcquirer::new(Arc::new(provider), RateCacheStore::new(store.clone()))
            .with_base(&config.base_currency)
            .with_ttl(config.cache_ttl())
            .with_connectivity(network.clone());

        Ok(Self {
            config,
            store,
            network,
            acquirer,
        })
    }
}

pub async fn run_command(command: AppCommand, options: &RunOptions) -> Result<()> {
    info!("fxconv starting...");
    let ctx = AppContext::build(options)?;

    match command {
        AppCommand::Convert {
            amount,
            from,
            to,
            refresh,
        } => cli::convert::run(&ctx, amount, from, to, refresh).await,
        AppCommand::Swap => cli::swap::run(&ctx).await,
        AppCommand::Rates { refresh } => cli::rates::run(&ctx, refresh).await,
        AppCommand::Watch => cli::watch::run(&ctx).await,
    }
}
