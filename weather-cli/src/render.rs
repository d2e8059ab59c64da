//! Text rendering of the dashboard.

use chrono::{Local, TimeZone, Timelike};
use std::fmt::{Display, Write};

use weatherdash_core::{
    Backdrop, ChartData, DailySummary, Dashboard, DisplayUnit, ForecastResponse, Series,
    units::{celsius_to_fahrenheit, display_temp, fahrenheit_to_celsius, round_half_up},
};

const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// ANSI styling picked from the backdrop.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    accent: &'static str,
    muted: &'static str,
    alert: &'static str,
    info: &'static str,
    reset: &'static str,
}

impl Palette {
    pub fn for_backdrop(backdrop: Backdrop) -> Self {
        let accent = match backdrop {
            Backdrop::Dark => "\x1b[1;37m",
            Backdrop::Morning => "\x1b[1;33m",
            Backdrop::Afternoon => "\x1b[1;36m",
            Backdrop::Evening => "\x1b[1;31m",
            Backdrop::Night => "\x1b[1;35m",
        };
        Self { accent, muted: "\x1b[2m", alert: "\x1b[1;31m", info: "\x1b[1;34m", reset: "\x1b[0m" }
    }

    /// No escape codes, for piped output and tests.
    pub fn plain() -> Self {
        Self { accent: "", muted: "", alert: "", info: "", reset: "" }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions<'a> {
    /// `(zone label, time)` shown in the header, read from the clock at each redraw.
    pub clock: Option<(&'a str, &'a str)>,
    /// Print every chart point as a table row.
    pub table: bool,
}

/// Full dashboard using the machine's local time zone.
pub fn dashboard(dash: &Dashboard, options: RenderOptions<'_>, color: bool) -> String {
    let palette = if color {
        Palette::for_backdrop(dash.backdrop(Local::now().hour()))
    } else {
        Palette::plain()
    };
    dashboard_in(dash, options, palette, &Local)
}

pub fn dashboard_in<Tz>(
    dash: &Dashboard,
    options: RenderOptions<'_>,
    p: Palette,
    tz: &Tz,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();

    let _ = write!(out, "{}☁ Weather Forecast{}", p.accent, p.reset);
    if let Some((zone, time)) = options.clock {
        let _ = write!(out, "    {zone}: {time}");
    }
    let _ = writeln!(
        out,
        "    {}[{} · {}]{}",
        p.muted,
        dash.unit().temperature_symbol(),
        dash.theme(),
        p.reset
    );

    if let Some(error) = dash.error() {
        let _ = writeln!(out, "\n{}⚠ {error}{}", p.alert, p.reset);
    }

    let Some(weather) = dash.weather() else {
        let _ = writeln!(out, "\n{}No forecast loaded yet.{}", p.muted, p.reset);
        return out;
    };

    out.push('\n');
    out.push_str(&header(weather, p, tz));

    let unit = dash.unit();
    for (i, day) in dash.daily().iter().enumerate() {
        out.push('\n');
        out.push_str(&day_card(i, day, unit, p));
    }

    out.push('\n');
    out.push_str(&chart(&dash.chart(tz), options.table, p));

    if dash.rain_advisory() {
        let _ = writeln!(out, "\n{}☂ Don't forget your umbrella today!{}", p.info, p.reset);
    }

    out
}

fn header<Tz>(weather: &ForecastResponse, p: Palette, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let city = &weather.city;
    format!(
        "{}📍 {}, {}{}\n   Sunrise: {}   Sunset: {}\n",
        p.accent,
        city.name,
        city.country,
        p.reset,
        city.sunrise.with_timezone(tz).format("%H:%M:%S"),
        city.sunset.with_timezone(tz).format("%H:%M:%S"),
    )
}

/// One daily card. The first card is today.
pub fn day_card(index: usize, day: &DailySummary, unit: DisplayUnit, p: Palette) -> String {
    let entry = &day.entry;
    let symbol = unit.temperature_symbol();

    let title = if index == 0 { "Today".to_string() } else { day.date.format("%a, %b %-d").to_string() };

    let mut card = format!("{}── {title} ──{}\n", p.accent, p.reset);
    let _ = writeln!(
        card,
        "   {}{symbol}  {}",
        display_temp(entry.temperature_c, unit),
        entry.condition.description
    );
    if let Some(url) = entry.condition.icon_url() {
        let _ = writeln!(card, "   {}{url}{}", p.muted, p.reset);
    }
    let _ = writeln!(
        card,
        "   Wind {} {}   Humidity {}%   Feels like {}{symbol}",
        round_half_up(entry.wind_speed),
        unit.speed_label(),
        entry.humidity_pct,
        display_temp(entry.feels_like_c, unit),
    );
    let _ = writeln!(card, "   {}{}{}", p.muted, conversion_note(entry.temperature_c, unit), p.reset);

    card
}

/// Both scales side by side, e.g. `20°C = 68.0°F`.
pub fn conversion_note(temp_c: f64, unit: DisplayUnit) -> String {
    match unit {
        DisplayUnit::Metric => {
            format!("{}°C = {:.1}°F", display_temp(temp_c, unit), celsius_to_fahrenheit(temp_c))
        }
        DisplayUnit::Imperial => {
            let fahrenheit = celsius_to_fahrenheit(temp_c);
            format!("{}°F = {:.1}°C", display_temp(temp_c, unit), fahrenheit_to_celsius(fahrenheit))
        }
    }
}

fn chart(data: &ChartData, table: bool, p: Palette) -> String {
    let mut out = String::new();
    if data.is_empty() {
        return out;
    }

    let first = data.labels.first().map(String::as_str).unwrap_or_default();
    let last = data.labels.last().map(String::as_str).unwrap_or_default();
    let _ = writeln!(out, "{}Next {} readings ({first} → {last}){}", p.accent, data.len(), p.reset);

    for series in data.series() {
        let (min, max) = bounds(&series.values);
        let _ = writeln!(
            out,
            "   {:<20} {}  {}min {} max {}{}",
            series.label,
            sparkline(&series.values),
            p.muted,
            min,
            max,
            p.reset
        );
    }

    if table {
        out.push_str(&chart_table(data));
    }

    out
}

fn chart_table(data: &ChartData) -> String {
    let [temperature, humidity, wind]: [&Series; 3] = data.series();

    let mut out = format!(
        "\n   {:<10} {:>18} {:>14} {:>18}\n",
        "Time", temperature.label, humidity.label, wind.label
    );
    for (i, label) in data.labels.iter().enumerate() {
        let _ = writeln!(
            out,
            "   {:<10} {:>18} {:>14} {:>18}",
            label, temperature.values[i], humidity.values[i], wind.values[i]
        );
    }
    out
}

pub fn sparkline(values: &[f64]) -> String {
    let (min, max) = bounds(values);
    let span = max - min;

    values
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                return SPARK[SPARK.len() / 2];
            }
            let idx = ((v - min) / span * (SPARK.len() - 1) as f64).round() as usize;
            SPARK[idx.min(SPARK.len() - 1)]
        })
        .collect()
}

fn bounds(values: &[f64]) -> (f64, f64) {
    values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
}

/// Recent searches as a numbered list.
pub fn history<T: Display>(entries: &[T]) -> String {
    if entries.is_empty() {
        return "No recent searches yet.\n".to_string();
    }

    entries.iter().enumerate().fold(String::new(), |mut out, (i, e)| {
        let _ = writeln!(out, "{:>2}. {e}", i + 1);
        out
    })
}
