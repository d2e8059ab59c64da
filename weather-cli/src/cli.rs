use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use inquire::{Confirm, CustomType, InquireError, Password, Select, Text};
use std::{
    fmt,
    io::{self, IsTerminal, Write},
};
use tokio::sync::watch;
use tracing::debug;
use weatherdash_core::{
    Clock, Config, ConfiguredLocation, Coordinates, Dashboard, DisplayUnit, FetchStatus,
    FileStore, SearchHistory, SearchRecord, Theme, provider_from_config,
};

use crate::render::{self, RenderOptions};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Terminal weather dashboard")]
pub struct Cli {
    /// OpenWeather API key; overrides the configured one.
    #[arg(long, global = true, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Display unit; defaults to the configured one.
    #[arg(long, global = true, value_enum)]
    pub units: Option<UnitArg>,

    /// Color theme; defaults to the configured one.
    #[arg(long, global = true, value_enum)]
    pub theme: Option<ThemeArg>,

    /// Disable ANSI colors.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, preferred unit and theme, and an optional home location.
    Configure,

    /// Show the forecast for a city and remember the search.
    Show {
        /// City name, e.g. "Paris".
        city: String,

        /// ISO country code, e.g. "FR".
        country: String,

        /// Print every 3-hour reading as a table.
        #[arg(long)]
        table: bool,
    },

    /// Show the forecast for the configured home location.
    Here {
        #[arg(long)]
        table: bool,
    },

    /// Pick one of the recent searches and show its forecast.
    Recent,

    /// List recent searches.
    History,

    /// Interactive dashboard. The clock ticks while a forecast loads.
    Dashboard,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnitArg {
    Metric,
    Imperial,
}

impl From<UnitArg> for DisplayUnit {
    fn from(value: UnitArg) -> Self {
        match value {
            UnitArg::Metric => DisplayUnit::Metric,
            UnitArg::Imperial => DisplayUnit::Imperial,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    Dark,
    Light,
}

impl From<ThemeArg> for Theme {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Light => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Search,
    Recent,
    ToggleUnit,
    ToggleTheme,
    Quit,
}

impl MenuAction {
    const ALL: [MenuAction; 5] = [
        MenuAction::Search,
        MenuAction::Recent,
        MenuAction::ToggleUnit,
        MenuAction::ToggleTheme,
        MenuAction::Quit,
    ];
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuAction::Search => "Search a city",
            MenuAction::Recent => "Recent searches",
            MenuAction::ToggleUnit => "Toggle °C / °F",
            MenuAction::ToggleTheme => "Toggle dark / light",
            MenuAction::Quit => "Quit",
        })
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let color = !self.no_color && std::io::stdout().is_terminal();

        match self.command {
            Command::Configure => configure(),
            Command::History => {
                let history = open_history()?;
                print!("{}", render::history(history.entries()));
                Ok(())
            }
            Command::Show { ref city, ref country, table } => {
                let (mut dash, _) = self.open_dashboard()?;

                println!("Loading forecast for {city}, {country}...");
                dash.submit(city.trim(), country.trim()).await;

                let options = RenderOptions { table, ..Default::default() };
                print!("{}", render::dashboard(&dash, options, color));
                Ok(())
            }
            Command::Here { table } => {
                let (mut dash, config) = self.open_dashboard()?;

                let geolocator = ConfiguredLocation::new(config.home);
                if dash.locate(&geolocator).await == FetchStatus::Idle {
                    eprintln!(
                        "No home location configured.\n\
                         Hint: run `weatherdash configure` and set a home location."
                    );
                    return Ok(());
                }

                let options = RenderOptions { table, ..Default::default() };
                print!("{}", render::dashboard(&dash, options, color));
                Ok(())
            }
            Command::Recent => {
                let (mut dash, _) = self.open_dashboard()?;

                let Some(choice) = pick_recent(&dash)? else {
                    return Ok(());
                };
                dash.select_recent(&choice).await;

                print!("{}", render::dashboard(&dash, RenderOptions::default(), color));
                Ok(())
            }
            Command::Dashboard => {
                let (mut dash, config) = self.open_dashboard()?;
                interactive(&mut dash, &config, color).await
            }
        }
    }

    /// Load config, apply command-line overrides and build the controller.
    fn open_dashboard(&self) -> Result<(Dashboard, Config)> {
        let mut config = Config::load()?;
        if let Some(key) = &self.api_key {
            config.set_api_key(key.clone());
        }

        let unit = self.units.map(DisplayUnit::from).unwrap_or(config.units);
        let theme = self.theme.map(Theme::from).unwrap_or(config.theme);

        let dash = Dashboard::new(provider_from_config(&config)?, open_history()?)
            .with_preferences(unit, theme);
        debug!(%unit, %theme, recent = dash.recent_searches().len(), "Dashboard ready");

        Ok((dash, config))
    }
}

/// Menu-driven session. The location forecast loads on start.
async fn interactive(dash: &mut Dashboard, config: &Config, color: bool) -> Result<()> {
    let clock = Clock::start(config.clock_timezone()?);
    let zone = clock.zone_label();

    let geolocator = ConfiguredLocation::new(config.home);
    tick_while(clock.subscribe(), &zone, &mut io::stdout(), dash.locate(&geolocator)).await;

    loop {
        let now = clock.now();
        let options = RenderOptions { clock: Some((&zone, &now)), table: false };
        println!("{}", render::dashboard(dash, options, color));

        let action = match Select::new("What next?", MenuAction::ALL.to_vec()).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read menu choice"),
        };

        match action {
            MenuAction::Search => {
                let (last_city, last_country) = dash.search_input();
                let (last_city, last_country) = (last_city.to_string(), last_country.to_string());

                let Some(city) = optional(Text::new("City:").with_default(&last_city).prompt())?
                else {
                    continue;
                };
                let Some(country) =
                    optional(Text::new("Country code:").with_default(&last_country).prompt())?
                else {
                    continue;
                };

                let fetch = dash.submit(city.trim(), country.trim());
                tick_while(clock.subscribe(), &zone, &mut io::stdout(), fetch).await;
            }
            MenuAction::Recent => {
                if let Some(choice) = pick_recent(dash)? {
                    let fetch = dash.select_recent(&choice);
                    tick_while(clock.subscribe(), &zone, &mut io::stdout(), fetch).await;
                }
            }
            MenuAction::ToggleUnit => {
                dash.toggle_unit();
            }
            MenuAction::ToggleTheme => {
                dash.toggle_theme();
            }
            MenuAction::Quit => break,
        }
    }

    Ok(())
}

/// Await `fetch`, redrawing a `zone: time  Loading...` status line on every clock tick.
async fn tick_while<F, W>(
    mut ticks: watch::Receiver<String>,
    zone: &str,
    out: &mut W,
    fetch: F,
) -> F::Output
where
    F: Future,
    W: Write,
{
    tokio::pin!(fetch);

    let output = loop {
        let now = ticks.borrow_and_update().clone();
        let _ = write!(out, "\r{zone}: {now}  Loading...");
        let _ = out.flush();

        tokio::select! {
            biased;
            changed = ticks.changed() => {
                if changed.is_err() {
                    break (&mut fetch).await;
                }
            }
            output = &mut fetch => break output,
        }
    };

    let _ = writeln!(out);
    output
}

fn pick_recent(dash: &Dashboard) -> Result<Option<SearchRecord>> {
    let recent = dash.recent_searches().to_vec();
    if recent.is_empty() {
        println!("No recent searches yet.");
        return Ok(None);
    }

    optional(Select::new("Recent searches", recent).prompt())
}

/// Treat a cancelled prompt as "no answer".
fn optional<T>(answer: Result<T, InquireError>) -> Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Failed to read answer"),
    }
}

fn open_history() -> Result<SearchHistory> {
    let dir = Config::data_dir()?;
    Ok(SearchHistory::load(Box::new(FileStore::new(dir))))
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;
    if !key.trim().is_empty() {
        config.set_api_key(key.trim().to_string());
    }

    config.units = Select::new("Display unit:", vec![DisplayUnit::Metric, DisplayUnit::Imperial])
        .with_starting_cursor(usize::from(config.units == DisplayUnit::Imperial))
        .prompt()
        .context("Failed to read display unit")?;

    config.theme = Select::new("Theme:", vec![Theme::Dark, Theme::Light])
        .with_starting_cursor(usize::from(config.theme == Theme::Light))
        .prompt()
        .context("Failed to read theme")?;

    let set_home = Confirm::new("Set a home location for `weatherdash here`?")
        .with_default(config.home.is_some())
        .prompt()
        .context("Failed to read answer")?;
    config.home = if set_home {
        let lat = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a number, e.g. 48.85")
            .prompt()
            .context("Failed to read latitude")?;
        let lon = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a number, e.g. 2.35")
            .prompt()
            .context("Failed to read longitude")?;
        Some(Coordinates { lat, lon })
    } else {
        None
    };

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_show_with_global_flags() {
        let cli = Cli::try_parse_from([
            "weatherdash", "show", "Paris", "FR", "--units", "imperial", "--theme", "light", "--table",
        ])
        .unwrap();

        assert!(matches!(cli.units, Some(UnitArg::Imperial)));
        assert!(matches!(cli.theme, Some(ThemeArg::Light)));
        match cli.command {
            Command::Show { city, country, table } => {
                assert_eq!(city, "Paris");
                assert_eq!(country, "FR");
                assert!(table);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[tokio::test]
    async fn loading_line_follows_clock_ticks() {
        let (tx, rx) = watch::channel("05:30:00 PM".to_string());
        let fetch = async move {
            tx.send("05:30:01 PM".to_string()).unwrap();
            tokio::task::yield_now().await;
            tx.send("05:30:02 PM".to_string()).unwrap();
            tokio::task::yield_now().await;
            "loaded"
        };

        let mut out = Vec::new();
        let result = tick_while(rx, "IST", &mut out, fetch).await;

        assert_eq!(result, "loaded");
        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "\rIST: 05:30:00 PM  Loading...\
             \rIST: 05:30:01 PM  Loading...\
             \rIST: 05:30:02 PM  Loading...\n"
        );
    }

    #[tokio::test]
    async fn stopped_clock_still_waits_for_fetch() {
        let (tx, rx) = watch::channel("09:00:00 AM".to_string());
        drop(tx);

        let mut out = Vec::new();
        let result = tick_while(rx, "UTC", &mut out, async { 7 }).await;

        assert_eq!(result, 7);
        assert!(String::from_utf8(out).unwrap().starts_with("\rUTC: 09:00:00 AM"));
    }

    #[test]
    fn show_requires_country() {
        assert!(Cli::try_parse_from(["weatherdash", "show", "Paris"]).is_err());
    }
}
