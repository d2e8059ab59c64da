use crate::{
    Config,
    model::{ForecastQuery, ForecastResponse},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

pub mod openweather;

/// Why a forecast could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The API does not know the requested location.
    #[error("location not found: {0}")]
    NotFound(String),

    #[error("forecast request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to reach the forecast service: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to parse forecast response: {0}")]
    Parse(String),
}

#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn forecast(&self, query: &ForecastQuery) -> Result<ForecastResponse, FetchError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastProvider>> {
    let api_key = config.api_key()?;

    let provider = match config.base_url.as_deref() {
        Some(base_url) => OpenWeatherProvider::with_base_url(api_key.to_owned(), base_url)?,
        None => OpenWeatherProvider::new(api_key.to_owned())?,
    };

    Ok(Box::new(provider))
}
