use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weather classification attached to a forecast entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Primary condition group, e.g. "Rain" or "Clouds".
    pub main: String,
    pub description: String,
    /// Icon identifier, e.g. "10d".
    pub icon: String,
}

impl Condition {
    pub fn unknown() -> Self {
        Self { main: "Unknown".to_string(), description: String::new(), icon: String::new() }
    }

    pub fn is_rain(&self) -> bool {
        self.main == "Rain"
    }

    pub fn icon_url(&self) -> Option<String> {
        if self.icon.is_empty() {
            return None;
        }
        Some(format!("https://openweathermap.org/img/wn/{}@4x.png", self.icon))
    }
}

/// One 3-hour forecast sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    /// API-local wall time of the sample (`dt_txt`).
    pub local_time: NaiveDateTime,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    /// Always metric (m/s) as delivered by the API.
    pub wind_speed: f64,
    pub condition: Condition,
}

impl ForecastEntry {
    pub fn date(&self) -> NaiveDate {
        self.local_time.date()
    }
}

/// Representative entry for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub entry: ForecastEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityInfo {
    pub name: String,
    pub country: String,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub entries: Vec<ForecastEntry>,
    pub city: CityInfo,
}

impl ForecastResponse {
    /// The entry closest to now, which is the first one the API returns.
    pub fn nearest(&self) -> Option<&ForecastEntry> {
        self.entries.first()
    }

    pub fn rain_expected(&self) -> bool {
        self.nearest().is_some_and(|e| e.condition.is_rain())
    }
}

/// A `"city, country"` search string kept in the recent-searches history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchRecord(String);

impl SearchRecord {
    pub fn new(city: &str, country: &str) -> Self {
        Self(format!("{city}, {country}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split back into `(city, country)`.
    pub fn split(&self) -> Option<(&str, &str)> {
        self.0.split_once(", ")
    }
}

impl From<&str> for SearchRecord {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SearchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    #[default]
    Metric,
    Imperial,
}

impl DisplayUnit {
    pub fn toggle(self) -> Self {
        match self {
            DisplayUnit::Metric => DisplayUnit::Imperial,
            DisplayUnit::Imperial => DisplayUnit::Metric,
        }
    }

    pub fn temperature_symbol(self) -> &'static str {
        match self {
            DisplayUnit::Metric => "°C",
            DisplayUnit::Imperial => "°F",
        }
    }

    /// Label only; wind values are never converted.
    pub fn speed_label(self) -> &'static str {
        match self {
            DisplayUnit::Metric => "m/s",
            DisplayUnit::Imperial => "mph",
        }
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DisplayUnit::Metric => "metric",
            DisplayUnit::Imperial => "imperial",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// What to ask the forecast API for.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastQuery {
    City { city: String, country: String },
    Coordinates(Coordinates),
}

impl ForecastQuery {
    pub fn city(city: &str, country: &str) -> Self {
        Self::City { city: city.to_string(), country: country.to_string() }
    }
}

impl fmt::Display for ForecastQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastQuery::City { city, country } => write!(f, "{city},{country}"),
            ForecastQuery::Coordinates(c) => write!(f, "lat={} lon={}", c.lat, c.lon),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_record_splits_on_first_separator() {
        let record = SearchRecord::new("Paris", "FR");
        assert_eq!(record.as_str(), "Paris, FR");
        assert_eq!(record.split(), Some(("Paris", "FR")));

        assert_eq!(SearchRecord::from("nowhere").split(), None);
    }

    #[test]
    fn search_record_serializes_as_plain_string() {
        let json = serde_json::to_string(&vec![SearchRecord::new("Oslo", "NO")]).unwrap();
        assert_eq!(json, r#"["Oslo, NO"]"#);
    }

    #[test]
    fn unit_labels_follow_unit() {
        assert_eq!(DisplayUnit::Metric.temperature_symbol(), "°C");
        assert_eq!(DisplayUnit::Imperial.speed_label(), "mph");
        assert_eq!(DisplayUnit::Metric.toggle(), DisplayUnit::Imperial);
        assert_eq!(Theme::default().toggle(), Theme::Light);
    }

    #[test]
    fn icon_url_is_absent_without_icon() {
        assert_eq!(Condition::unknown().icon_url(), None);
        let c = Condition { main: "Rain".into(), description: "light rain".into(), icon: "10d".into() };
        assert_eq!(c.icon_url().as_deref(), Some("https://openweathermap.org/img/wn/10d@4x.png"));
        assert!(c.is_rain());
    }
}
