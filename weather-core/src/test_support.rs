use chrono::{DateTime, NaiveDateTime, Utc};

use crate::model::{CityInfo, Condition, ForecastEntry, ForecastResponse};

/// Entry at `dt_txt` (UTC, as the API reports it) with the given temperature.
pub fn entry(dt_txt: &str, temperature_c: f64) -> ForecastEntry {
    let local_time = NaiveDateTime::parse_from_str(dt_txt, "%Y-%m-%d %H:%M:%S")
        .expect("fixture dt_txt must be valid");

    ForecastEntry {
        timestamp: local_time.and_utc(),
        local_time,
        temperature_c,
        feels_like_c: temperature_c - 1.0,
        humidity_pct: 60,
        wind_speed: 3.5,
        condition: Condition {
            main: "Clouds".to_string(),
            description: "scattered clouds".to_string(),
            icon: "03d".to_string(),
        },
    }
}

/// Eight 3-hour entries per day starting at `2024-05-{first_day}`.
pub fn days(first_day: u32, count: u32) -> Vec<ForecastEntry> {
    (0..count)
        .flat_map(|d| {
            (0..8).map(move |h| {
                entry(&format!("2024-05-{:02} {:02}:00:00", first_day + d, h * 3), 10.0 + h as f64)
            })
        })
        .collect()
}

pub fn response(city: &str, entries: Vec<ForecastEntry>) -> ForecastResponse {
    ForecastResponse {
        entries,
        city: CityInfo {
            name: city.to_string(),
            country: "FR".to_string(),
            sunrise: DateTime::<Utc>::from_timestamp(1_715_000_000, 0).expect("valid"),
            sunset: DateTime::<Utc>::from_timestamp(1_715_050_000, 0).expect("valid"),
        },
    }
}
