use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::model::Coordinates;

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_CITY: &str = "London";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

/// Credentials and connection settings for OpenWeather.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWeatherConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Dashboard behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// City shown when device location is unavailable on first load.
    #[serde(default = "default_city")]
    pub default_city: String,

    /// Notification permission granted by the user.
    #[serde(default)]
    pub notifications: bool,

    /// Query the best-effort alerts endpoint after each fetch.
    #[serde(default)]
    pub alerts: bool,

    /// Coordinates used as the "device location".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<Coordinates>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_city: default_city(),
            notifications: false,
            alerts: false,
            home: None,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [openweather]
/// api_key = "..."
///
/// [dashboard]
/// default_city = "London"
/// home = { lat = 51.5, lon = -0.12 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub openweather: OpenWeatherConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if let Some(home) = cfg.dashboard.home {
            home.validate().with_context(|| {
                format!(
                    "Invalid dashboard.home in config file: {}\n\
                     Hint: run `skyview configure` to set it again.",
                    path.display()
                )
            })?;
        }

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// API key from the environment, falling back to the stored one.
    pub fn api_key(&self) -> Result<String> {
        self.api_key_with_override(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_with_override(&self, env: Option<String>) -> Result<String> {
        env.filter(|key| !key.trim().is_empty())
            .or_else(|| self.openweather.api_key.clone())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `skyview configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.openweather.api_key = Some(api_key);
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.openweather.timeout_secs)
    }
}

pub(crate) fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "skyview", "skyview")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key_with_override(None).unwrap_err();

        assert!(err.to_string().contains("No OpenWeather API key configured"));
        assert!(err.to_string().contains("skyview configure"));
    }

    #[test]
    fn environment_overrides_stored_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("STORED".into());

        let key = cfg.api_key_with_override(Some("FROM_ENV".into())).unwrap();
        assert_eq!(key, "FROM_ENV");

        let key = cfg.api_key_with_override(Some("  ".into())).unwrap();
        assert_eq!(key, "STORED");

        let key = cfg.api_key_with_override(None).unwrap();
        assert_eq!(key, "STORED");
    }

    #[test]
    fn missing_sections_take_defaults() {
        let cfg: Config = toml::from_str("[openweather]\napi_key = \"K\"\n").unwrap();

        assert_eq!(cfg.openweather.api_key.as_deref(), Some("K"));
        assert_eq!(cfg.openweather.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.dashboard.default_city, DEFAULT_CITY);
        assert!(!cfg.dashboard.notifications);
        assert!(cfg.dashboard.home.is_none());
    }

    #[test]
    fn save_and_load_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.dashboard.default_city = "Berlin".into();
        cfg.dashboard.home = Some(Coordinates { lat: 52.52, lon: 13.4 });
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.openweather.api_key.as_deref(), Some("KEY"));
        assert_eq!(loaded.dashboard.default_city, "Berlin");
        assert_eq!(loaded.dashboard.home, Some(Coordinates { lat: 52.52, lon: 13.4 }));
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert!(cfg.openweather.api_key.is_none());
    }

    #[test]
    fn out_of_range_home_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[dashboard]\nhome = { lat = 123.0, lon = 0.0 }\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();

        assert!(err.to_string().contains("Invalid dashboard.home"));
        assert!(format!("{err:#}").contains("latitude 123 is outside"));
    }
}
