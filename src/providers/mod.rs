pub mod fx_rates;

pub use fx_rates::FxRatesProvider;
