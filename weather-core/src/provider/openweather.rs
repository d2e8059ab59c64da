use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::model::{CityInfo, Condition, ForecastEntry, ForecastQuery, ForecastResponse};

use super::{FetchError, ForecastProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the OpenWeather 5-day / 3-hour forecast endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self, FetchError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self { api_key, base_url: base_url.trim_end_matches('/').to_string(), http })
    }

    #[instrument(skip_all, fields(query = %query))]
    async fn fetch(&self, query: &ForecastQuery) -> Result<ForecastResponse, FetchError> {
        let url = format!("{}/forecast", self.base_url);

        let mut params: Vec<(&str, String)> = match query {
            ForecastQuery::City { city, country } => vec![("q", format!("{city},{country}"))],
            ForecastQuery::Coordinates(c) => {
                vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string())]
            }
        };
        params.push(("units", "metric".to_string()));
        params.push(("appid", self.api_key.clone()));

        debug!(url = %url, "Fetching forecast");

        let res = self.http.get(&url).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(query.to_string()));
        }

        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), body: truncate_body(&body) });
        }

        let parsed: OwForecastResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        let response = parsed.into_domain()?;
        debug!(entries = response.entries.len(), city = %response.city.name, "Forecast received");

        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    dt_txt: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

impl OwForecastResponse {
    fn into_domain(self) -> Result<ForecastResponse, FetchError> {
        let entries =
            self.list.into_iter().map(OwForecastEntry::into_domain).collect::<Result<_, _>>()?;

        let city = CityInfo {
            name: self.city.name,
            country: self.city.country,
            sunrise: unix_to_utc(self.city.sunrise)?,
            sunset: unix_to_utc(self.city.sunset)?,
        };

        Ok(ForecastResponse { entries, city })
    }
}

impl OwForecastEntry {
    fn into_domain(self) -> Result<ForecastEntry, FetchError> {
        let local_time = NaiveDateTime::parse_from_str(&self.dt_txt, "%Y-%m-%d %H:%M:%S")
            .map_err(|e| FetchError::Parse(format!("invalid dt_txt '{}': {e}", self.dt_txt)))?;

        let condition = self
            .weather
            .into_iter()
            .next()
            .map(|w| Condition { main: w.main, description: w.description, icon: w.icon })
            .unwrap_or_else(Condition::unknown);

        Ok(ForecastEntry {
            timestamp: unix_to_utc(self.dt)?,
            local_time,
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            humidity_pct: self.main.humidity,
            wind_speed: self.wind.speed,
            condition,
        })
    }
}

#[async_trait]
impl ForecastProvider for OpenWeatherProvider {
    async fn forecast(&self, query: &ForecastQuery) -> Result<ForecastResponse, FetchError> {
        self.fetch(query).await
    }
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>, FetchError> {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .ok_or_else(|| FetchError::Parse(format!("timestamp {ts} out of range")))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
