//! Core library for the `weatherdash` terminal dashboard.
//!
//! This crate defines:
//! - Configuration handling
//! - The OpenWeather forecast provider behind a trait
//! - Forecast aggregation, chart series and unit conversion
//! - The persisted recent-searches history
//! - The dashboard controller owning all UI state
//!
//! It is used by `weatherdash-cli`, but holds no presentation code of its own.

pub mod chart;
pub mod clock;
pub mod config;
pub mod controller;
pub mod forecast;
pub mod geolocation;
pub mod history;
pub mod model;
pub mod provider;
pub mod storage;
pub mod units;

#[cfg(test)]
mod test_support;

pub use chart::{ChartData, Series};
pub use clock::Clock;
pub use config::Config;
pub use controller::{Backdrop, Dashboard, FetchOrigin, FetchStatus};
pub use forecast::daily_summaries;
pub use geolocation::{ConfiguredLocation, Geolocator, LocationDenied};
pub use history::SearchHistory;
pub use model::{
    CityInfo, Condition, Coordinates, DailySummary, DisplayUnit, ForecastEntry, ForecastQuery,
    ForecastResponse, SearchRecord, Theme,
};
pub use provider::{FetchError, ForecastProvider, provider_from_config};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
