//! Dashboard state and the fetch lifecycle driving it.

use chrono::TimeZone;
use std::fmt::Display;
use tracing::{debug, info, warn};

use crate::{
    chart::ChartData,
    forecast::daily_summaries,
    geolocation::Geolocator,
    history::SearchHistory,
    model::{DailySummary, DisplayUnit, ForecastQuery, ForecastResponse, SearchRecord, Theme},
    provider::{FetchError, ForecastProvider},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// What triggered a fetch. Decides the failure message and whether history is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    Submit,
    Recent,
    Geolocation,
}

impl FetchOrigin {
    pub fn failure_message(self) -> &'static str {
        match self {
            FetchOrigin::Submit => "City not found. Please check your input and try again.",
            FetchOrigin::Recent => "Failed to fetch weather data.",
            FetchOrigin::Geolocation => "Failed to fetch weather for your location.",
        }
    }
}

/// An in-flight fetch handed out by [`Dashboard::begin_fetch`].
///
/// Tickets are not ordered: whichever finishes last overwrites the displayed forecast,
/// even if it was started first.
#[derive(Debug)]
pub struct FetchTicket {
    origin: FetchOrigin,
    query: ForecastQuery,
    record: Option<SearchRecord>,
}

impl FetchTicket {
    pub fn origin(&self) -> FetchOrigin {
        self.origin
    }

    pub fn query(&self) -> &ForecastQuery {
        &self.query
    }
}

/// Background style of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backdrop {
    Dark,
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl Backdrop {
    /// Dark theme is always dark. Light theme follows the local hour once a forecast is
    /// shown, and starts as morning before that.
    pub fn select(theme: Theme, has_forecast: bool, hour: u32) -> Self {
        match (theme, has_forecast) {
            (Theme::Dark, _) => Backdrop::Dark,
            (Theme::Light, false) => Backdrop::Morning,
            (Theme::Light, true) => match hour {
                6..=11 => Backdrop::Morning,
                12..=16 => Backdrop::Afternoon,
                17..=19 => Backdrop::Evening,
                _ => Backdrop::Night,
            },
        }
    }
}

/// Owns every piece of dashboard state: unit, theme, current forecast, history and the
/// status of the latest fetch.
#[derive(Debug)]
pub struct Dashboard {
    provider: Box<dyn ForecastProvider>,
    history: SearchHistory,
    unit: DisplayUnit,
    theme: Theme,
    weather: Option<ForecastResponse>,
    error: Option<String>,
    status: FetchStatus,
    city_input: String,
    country_input: String,
}

impl Dashboard {
    pub fn new(provider: Box<dyn ForecastProvider>, history: SearchHistory) -> Self {
        Self {
            provider,
            history,
            unit: DisplayUnit::default(),
            theme: Theme::default(),
            weather: None,
            error: None,
            status: FetchStatus::Idle,
            city_input: String::new(),
            country_input: String::new(),
        }
    }

    pub fn with_preferences(mut self, unit: DisplayUnit, theme: Theme) -> Self {
        self.unit = unit;
        self.theme = theme;
        self
    }

    pub fn unit(&self) -> DisplayUnit {
        self.unit
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn weather(&self) -> Option<&ForecastResponse> {
        self.weather.as_ref()
    }

    pub fn recent_searches(&self) -> &[SearchRecord] {
        self.history.entries()
    }

    /// Last city and country entered or picked from history.
    pub fn search_input(&self) -> (&str, &str) {
        (&self.city_input, &self.country_input)
    }

    /// Switches display unit. Never refetches.
    pub fn toggle_unit(&mut self) -> DisplayUnit {
        self.unit = self.unit.toggle();
        debug!(unit = %self.unit, "Display unit toggled");
        self.unit
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggle();
        debug!(theme = %self.theme, "Theme toggled");
        self.theme
    }

    /// Enter the loading state and clear any previous error.
    pub fn begin_fetch(&mut self, origin: FetchOrigin, query: ForecastQuery) -> FetchTicket {
        self.status = FetchStatus::Loading;
        self.error = None;

        let record = match (&origin, &query) {
            (FetchOrigin::Submit, ForecastQuery::City { city, country }) => {
                Some(SearchRecord::new(city, country))
            }
            _ => None,
        };

        debug!(?origin, query = %query, "Fetch started");
        FetchTicket { origin, query, record }
    }

    /// Apply the outcome of a fetch.
    ///
    /// Success replaces the forecast wholesale (and records the search for submits).
    /// Failure sets the origin's message and keeps whatever forecast was shown before.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<ForecastResponse, FetchError>,
    ) -> FetchStatus {
        match result {
            Ok(forecast) => {
                info!(
                    origin = ?ticket.origin,
                    city = %forecast.city.name,
                    country = %forecast.city.country,
                    entries = forecast.entries.len(),
                    "Forecast loaded"
                );
                self.weather = Some(forecast);

                if let Some(record) = ticket.record {
                    if let Err(e) = self.history.record(record) {
                        warn!("Search history not saved: {e:#}");
                    }
                }

                self.status = FetchStatus::Success;
            }
            Err(e) => {
                warn!(origin = ?ticket.origin, query = %ticket.query, error = %e, "Forecast fetch failed");
                self.error = Some(ticket.origin.failure_message().to_string());
                self.status = FetchStatus::Error;
            }
        }

        self.status
    }

    /// Search form submission. Records the search on success.
    pub async fn submit(&mut self, city: &str, country: &str) -> FetchStatus {
        self.city_input = city.to_string();
        self.country_input = country.to_string();

        let ticket = self.begin_fetch(FetchOrigin::Submit, ForecastQuery::city(city, country));
        let result = self.provider.forecast(&ticket.query).await;
        self.finish_fetch(ticket, result)
    }

    /// Re-run a search picked from history. History is left as is.
    pub async fn select_recent(&mut self, record: &SearchRecord) -> FetchStatus {
        let (city, country) = record.split().unwrap_or((record.as_str(), ""));
        self.city_input = city.to_string();
        self.country_input = country.to_string();

        let ticket = self.begin_fetch(FetchOrigin::Recent, ForecastQuery::city(city, country));
        let result = self.provider.forecast(&ticket.query).await;
        self.finish_fetch(ticket, result)
    }

    /// Initial fetch for the user's position. Denial leaves the dashboard untouched.
    pub async fn locate(&mut self, geolocator: &dyn Geolocator) -> FetchStatus {
        let coords = match geolocator.locate().await {
            Ok(coords) => coords,
            Err(denied) => {
                debug!(reason = %denied, "Skipping location forecast");
                return self.status;
            }
        };

        let ticket = self.begin_fetch(FetchOrigin::Geolocation, ForecastQuery::Coordinates(coords));
        let result = self.provider.forecast(&ticket.query).await;
        self.finish_fetch(ticket, result)
    }

    /// Day cards for the current forecast; empty until something is loaded.
    pub fn daily(&self) -> Vec<DailySummary> {
        self.weather.as_ref().map(|w| daily_summaries(&w.entries)).unwrap_or_default()
    }

    pub fn chart<Tz>(&self, tz: &Tz) -> ChartData
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let entries = self.weather.as_ref().map(|w| w.entries.as_slice()).unwrap_or_default();
        ChartData::build(entries, self.unit, tz)
    }

    /// Whether the nearest forecast slot is rain.
    pub fn rain_advisory(&self) -> bool {
        self.weather.as_ref().is_some_and(ForecastResponse::rain_expected)
    }

    pub fn backdrop(&self, hour: u32) -> Backdrop {
        Backdrop::select(self.theme, self.weather.is_some(), hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geolocation::ConfiguredLocation,
        model::Coordinates,
        storage::MemoryStore,
        test_support::{days, response},
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    /// Knows a fixed set of cities; everything else is "not found".
    #[derive(Debug, Clone, Default)]
    struct FakeProvider {
        known: Vec<(String, ForecastResponse)>,
        calls: Arc<Mutex<Vec<ForecastQuery>>>,
    }

    impl FakeProvider {
        fn knowing(cities: &[&str]) -> Self {
            let known = cities.iter().map(|c| (c.to_string(), response(c, days(1, 6)))).collect();
            Self { known, ..Default::default() }
        }

        fn calls(&self) -> Vec<ForecastQuery> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ForecastProvider for FakeProvider {
        async fn forecast(&self, query: &ForecastQuery) -> Result<ForecastResponse, FetchError> {
            self.calls.lock().unwrap().push(query.clone());

            let name = match query {
                ForecastQuery::City { city, .. } => city.clone(),
                ForecastQuery::Coordinates(_) => "Here".to_string(),
            };
            self.known
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, r)| r.clone())
                .ok_or_else(|| FetchError::NotFound(query.to_string()))
        }
    }

    fn dashboard(provider: &FakeProvider, store: &MemoryStore) -> Dashboard {
        Dashboard::new(Box::new(provider.clone()), SearchHistory::load(Box::new(store.clone())))
    }

    fn history(d: &Dashboard) -> Vec<&str> {
        d.recent_searches().iter().map(SearchRecord::as_str).collect()
    }

    #[test]
    fn starts_idle_and_empty() {
        let d = dashboard(&FakeProvider::default(), &MemoryStore::new());

        assert_eq!(d.status(), FetchStatus::Idle);
        assert!(d.weather().is_none());
        assert!(d.daily().is_empty());
        assert!(d.chart(&Utc).is_empty());
        assert!(!d.rain_advisory());
    }

    #[tokio::test]
    async fn submit_success_loads_forecast_and_records_history() {
        let provider = FakeProvider::knowing(&["Paris"]);
        let store = MemoryStore::new();
        let mut d = dashboard(&provider, &store);

        assert_eq!(d.submit("Paris", "FR").await, FetchStatus::Success);

        assert_eq!(d.weather().unwrap().city.name, "Paris");
        assert_eq!(d.daily().len(), 5);
        assert_eq!(d.chart(&Utc).len(), 48);
        assert_eq!(history(&d), ["Paris, FR"]);
        assert_eq!(provider.calls(), vec![ForecastQuery::city("Paris", "FR")]);

        let reloaded = SearchHistory::load(Box::new(store));
        assert_eq!(reloaded.entries(), d.recent_searches());
    }

    #[tokio::test]
    async fn submit_failure_keeps_previous_forecast() {
        let provider = FakeProvider::knowing(&["Paris"]);
        let mut d = dashboard(&provider, &MemoryStore::new());
        d.submit("Paris", "FR").await;

        assert_eq!(d.submit("Atlantis", "XX").await, FetchStatus::Error);

        assert_eq!(d.error(), Some("City not found. Please check your input and try again."));
        assert_eq!(d.weather().unwrap().city.name, "Paris");
        assert_eq!(history(&d), ["Paris, FR"]);
    }

    #[tokio::test]
    async fn new_fetch_clears_previous_error() {
        let provider = FakeProvider::knowing(&["Oslo"]);
        let mut d = dashboard(&provider, &MemoryStore::new());
        d.submit("Atlantis", "XX").await;
        assert!(d.error().is_some());

        let ticket = d.begin_fetch(FetchOrigin::Submit, ForecastQuery::city("Oslo", "NO"));
        assert_eq!(d.status(), FetchStatus::Loading);
        assert_eq!(d.error(), None);

        d.finish_fetch(ticket, Err(FetchError::Parse("truncated".into())));
        assert_eq!(d.status(), FetchStatus::Error);
    }

    #[tokio::test]
    async fn selecting_recent_search_does_not_reorder_history() {
        let provider = FakeProvider::knowing(&["Paris", "Oslo"]);
        let mut d = dashboard(&provider, &MemoryStore::new());
        d.submit("Paris", "FR").await;
        d.submit("Oslo", "NO").await;

        let paris = SearchRecord::new("Paris", "FR");
        assert_eq!(d.select_recent(&paris).await, FetchStatus::Success);

        assert_eq!(d.weather().unwrap().city.name, "Paris");
        assert_eq!(d.search_input(), ("Paris", "FR"));
        assert_eq!(history(&d), ["Oslo, NO", "Paris, FR"]);
    }

    #[tokio::test]
    async fn failed_recent_search_uses_its_own_message() {
        let mut d = dashboard(&FakeProvider::default(), &MemoryStore::new());

        d.select_recent(&SearchRecord::new("Lima", "PE")).await;

        assert_eq!(d.error(), Some("Failed to fetch weather data."));
    }

    #[tokio::test]
    async fn granted_location_loads_forecast_without_history() {
        let provider = FakeProvider::knowing(&["Here"]);
        let mut d = dashboard(&provider, &MemoryStore::new());
        let home = Coordinates { lat: 48.85, lon: 2.35 };

        assert_eq!(d.locate(&ConfiguredLocation::new(Some(home))).await, FetchStatus::Success);

        assert_eq!(d.weather().unwrap().city.name, "Here");
        assert!(d.recent_searches().is_empty());
        assert_eq!(provider.calls(), vec![ForecastQuery::Coordinates(home)]);
    }

    #[tokio::test]
    async fn denied_location_is_silent() {
        let provider = FakeProvider::knowing(&["Here"]);
        let mut d = dashboard(&provider, &MemoryStore::new());

        assert_eq!(d.locate(&ConfiguredLocation::default()).await, FetchStatus::Idle);

        assert!(d.weather().is_none());
        assert_eq!(d.error(), None);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn location_fetch_failure_sets_message() {
        let mut d = dashboard(&FakeProvider::default(), &MemoryStore::new());
        let home = Coordinates { lat: 0.0, lon: 0.0 };

        d.locate(&ConfiguredLocation::new(Some(home))).await;

        assert_eq!(d.error(), Some("Failed to fetch weather for your location."));
    }

    #[test]
    fn last_response_to_resolve_wins() {
        let mut d = dashboard(&FakeProvider::default(), &MemoryStore::new());

        let first = d.begin_fetch(FetchOrigin::Submit, ForecastQuery::city("Paris", "FR"));
        let second = d.begin_fetch(FetchOrigin::Submit, ForecastQuery::city("Oslo", "NO"));

        d.finish_fetch(second, Ok(response("Oslo", days(1, 1))));
        d.finish_fetch(first, Ok(response("Paris", days(1, 1))));

        // Stale response overwrites the newer one; no request generation is tracked.
        assert_eq!(d.weather().unwrap().city.name, "Paris");
        assert_eq!(history(&d), ["Paris, FR", "Oslo, NO"]);
    }

    #[tokio::test]
    async fn toggles_do_not_refetch() {
        let provider = FakeProvider::knowing(&["Paris"]);
        let mut d = dashboard(&provider, &MemoryStore::new());
        d.submit("Paris", "FR").await;
        let metric = d.chart(&Utc).temperature.values;

        assert_eq!(d.toggle_unit(), DisplayUnit::Imperial);
        assert_eq!(d.toggle_theme(), Theme::Light);

        let imperial = d.chart(&Utc).temperature.values;
        assert_ne!(metric, imperial);
        assert_eq!(provider.calls().len(), 1);
    }

    #[test]
    fn rain_advisory_follows_nearest_entry() {
        let mut d = dashboard(&FakeProvider::default(), &MemoryStore::new());
        let mut entries = days(1, 1);
        entries[1].condition.main = "Rain".to_string();

        let ticket = d.begin_fetch(FetchOrigin::Recent, ForecastQuery::city("Paris", "FR"));
        d.finish_fetch(ticket, Ok(response("Paris", entries.clone())));
        assert!(!d.rain_advisory());

        entries[0].condition.main = "Rain".to_string();
        let ticket = d.begin_fetch(FetchOrigin::Recent, ForecastQuery::city("Paris", "FR"));
        d.finish_fetch(ticket, Ok(response("Paris", entries)));
        assert!(d.rain_advisory());
    }

    #[test]
    fn backdrop_by_theme_and_hour() {
        assert_eq!(Backdrop::select(Theme::Dark, true, 13), Backdrop::Dark);
        assert_eq!(Backdrop::select(Theme::Light, false, 23), Backdrop::Morning);
        assert_eq!(Backdrop::select(Theme::Light, true, 6), Backdrop::Morning);
        assert_eq!(Backdrop::select(Theme::Light, true, 12), Backdrop::Afternoon);
        assert_eq!(Backdrop::select(Theme::Light, true, 19), Backdrop::Evening);
        assert_eq!(Backdrop::select(Theme::Light, true, 20), Backdrop::Night);
        assert_eq!(Backdrop::select(Theme::Light, true, 3), Backdrop::Night);
    }
}
