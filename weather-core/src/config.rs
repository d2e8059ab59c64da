use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::{Coordinates, DisplayUnit, Theme};

/// Zone used for the header clock when none is configured.
pub const DEFAULT_CLOCK_TIMEZONE: Tz = chrono_tz::Asia::Kolkata;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "imperial"
/// theme = "light"
/// clock_timezone = "Europe/Oslo"
///
/// [home]
/// lat = 59.91
/// lon = 10.75
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    #[serde(default)]
    pub units: DisplayUnit,

    #[serde(default)]
    pub theme: Theme,

    /// Location used in place of device geolocation. Absent means "denied".
    pub home: Option<Coordinates>,

    /// Override for the forecast API base URL.
    pub base_url: Option<String>,

    /// IANA zone name for the header clock, e.g. "Asia/Kolkata".
    pub clock_timezone: Option<String>,
}

impl Config {
    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `weatherdash configure` or set OPENWEATHER_API_KEY."
            )
        })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn clock_timezone(&self) -> Result<Tz> {
        match self.clock_timezone.as_deref() {
            None => Ok(DEFAULT_CLOCK_TIMEZONE),
            Some(name) => name
                .parse::<Tz>()
                .map_err(|e| anyhow!("Invalid clock_timezone '{name}' in config: {e}")),
        }
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.clock_timezone()?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding persisted dashboard state such as the search history.
    pub fn data_dir() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weatherdash", "weatherdash-cli")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
