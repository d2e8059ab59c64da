use chrono::TimeZone;
use serde::Serialize;
use std::fmt::Display;

use crate::{
    model::{DisplayUnit, ForecastEntry},
    units::display_temp,
};

/// One plotted line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
}

/// Parallel series over the full 3-hour forecast, aligned by index to `labels`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub temperature: Series,
    pub humidity: Series,
    pub wind_speed: Series,
}

impl ChartData {
    /// Build chart series for `entries`, labelling each point with its time in `tz`.
    ///
    /// Temperatures are converted to `unit`. Wind speed stays in the API's m/s and only
    /// its label follows `unit`.
    pub fn build<Tz>(entries: &[ForecastEntry], unit: DisplayUnit, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let labels = entries.iter().map(|e| time_label(e, tz)).collect();

        let temperature = Series {
            label: format!("Temperature ({})", unit.temperature_symbol()),
            values: entries.iter().map(|e| display_temp(e.temperature_c, unit) as f64).collect(),
        };

        let humidity = Series {
            label: "Humidity (%)".to_string(),
            values: entries.iter().map(|e| f64::from(e.humidity_pct)).collect(),
        };

        // FIXME: imperial labels this mph while the values are still m/s.
        let wind_speed = Series {
            label: format!("Wind Speed ({})", unit.speed_label()),
            values: entries.iter().map(|e| e.wind_speed).collect(),
        };

        Self { labels, temperature, humidity, wind_speed }
    }

    pub fn series(&self) -> [&Series; 3] {
        [&self.temperature, &self.humidity, &self.wind_speed]
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Time-of-day label for one entry.
pub fn time_label<Tz>(entry: &ForecastEntry, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    entry.timestamp.with_timezone(tz).format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{days, entry};
    use chrono::{FixedOffset, Utc};

    #[test]
    fn series_align_with_entries() {
        let entries = days(1, 5);
        let chart = ChartData::build(&entries, DisplayUnit::Metric, &Utc);

        assert_eq!(chart.len(), entries.len());
        for s in chart.series() {
            assert_eq!(s.values.len(), entries.len());
        }
        for (i, e) in entries.iter().enumerate() {
            assert_eq!(chart.labels[i], time_label(e, &Utc));
            assert_eq!(chart.labels[i], e.local_time.format("%H:%M:%S").to_string());
        }
    }

    #[test]
    fn labels_use_requested_zone() {
        let entries = vec![entry("2024-05-01 21:00:00", 5.0)];
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();

        let chart = ChartData::build(&entries, DisplayUnit::Metric, &ist);
        assert_eq!(chart.labels, vec!["02:30:00".to_string()]);
    }

    #[test]
    fn imperial_converts_temperature_but_not_wind() {
        let mut e = entry("2024-05-01 12:00:00", 20.0);
        e.wind_speed = 4.2;
        e.humidity_pct = 81;

        let metric = ChartData::build(std::slice::from_ref(&e), DisplayUnit::Metric, &Utc);
        let imperial = ChartData::build(std::slice::from_ref(&e), DisplayUnit::Imperial, &Utc);

        assert_eq!(metric.temperature.values, vec![20.0]);
        assert_eq!(imperial.temperature.values, vec![68.0]);
        assert_eq!(imperial.temperature.label, "Temperature (°F)");

        assert_eq!(metric.humidity.values, imperial.humidity.values);
        assert_eq!(metric.wind_speed.values, vec![4.2]);
        assert_eq!(imperial.wind_speed.values, vec![4.2]);
        assert_eq!(metric.wind_speed.label, "Wind Speed (m/s)");
        assert_eq!(imperial.wind_speed.label, "Wind Speed (mph)");
    }

    #[test]
    fn empty_forecast_gives_empty_chart() {
        let chart = ChartData::build(&[], DisplayUnit::Imperial, &Utc);
        assert!(chart.is_empty());
        assert!(chart.series().iter().all(|s| s.values.is_empty()));
    }
}
