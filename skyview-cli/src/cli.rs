use std::{path::Path, sync::Arc};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, InquireError, Password, PasswordDisplayMode, Select, Text};
use skyview_core::{
    Config, Coordinates, FetchOrchestrator, FetchOutcome, Location, NotificationPermission,
    OrchestratorOptions, Renderer, SearchHistory, WeatherApi, WeatherError, client_from_config,
};

use crate::{
    adapters::{HomeGeolocator, TerminalNotifier},
    render::TerminalRenderer,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyview", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, default city and home coordinates.
    Configure,

    /// Show current conditions and the forecast.
    ///
    /// Without a city or coordinates, the configured home location is used,
    /// falling back to the default city.
    Show {
        /// City name, e.g. "London" or "Paris,FR".
        #[arg(conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,

        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Print a shareable summary after the dashboard.
        #[arg(long)]
        share: bool,

        /// Ask to enable notifications before fetching.
        #[arg(long)]
        notify: bool,
    },

    /// Pick a previously searched city and show its weather.
    History {
        /// Only print the list.
        #[arg(long)]
        list: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                city,
                lat,
                lon,
                share,
                notify,
            } => {
                let coords = match (lat, lon) {
                    (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)?),
                    _ => None,
                };
                show(city, coords, share, notify).await
            }
            Command::History { list } => history(list).await,
        }
    }
}

async fn show(
    city: Option<String>,
    coords: Option<Coordinates>,
    share: bool,
    notify: bool,
) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    let api: Arc<dyn WeatherApi> = client_from_config(&config)?.into();
    let notifier = Arc::new(TerminalNotifier::new(config.dashboard.notifications));
    let orchestrator =
        FetchOrchestrator::new(api, notifier, OrchestratorOptions::from(&config));

    if notify {
        match orchestrator.enable_notifications().await {
            NotificationPermission::Granted => {
                config.dashboard.notifications = true;
                config.save()?;
            }
            other => eprintln!("Notifications not enabled ({other:?})."),
        }
    }

    let outcome = match Location::from_parts(city.as_deref(), coords) {
        Ok(location) => {
            if let Location::Name(name) = &location {
                match SearchHistory::default_path() {
                    Ok(path) => {
                        record_search(&path, name);
                    }
                    Err(err) => tracing::warn!(error = %err, "search history unavailable"),
                }
            }
            orchestrator.fetch(location).await?
        }
        Err(WeatherError::InvalidRequest(_)) if city.is_none() && coords.is_none() => {
            let geolocator = HomeGeolocator::new(config.dashboard.home);
            orchestrator.fetch_by_device_location(&geolocator).await?
        }
        Err(err) => return Err(err.into()),
    };

    let view = orchestrator.view().await;
    TerminalRenderer::stdout().render(&view)?;

    if share {
        match view.share_message() {
            Some(msg) => println!("\n{}\n{}", msg.title, msg.text),
            None => eprintln!("Nothing to share yet."),
        }
    }

    if let FetchOutcome::Failed(message) = outcome {
        bail!(message);
    }

    Ok(())
}

/// Add `name` to the history at `path`. Failures are logged, never fatal.
fn record_search(path: &Path, name: &str) -> bool {
    match SearchHistory::open(path).and_then(|mut history| history.record(name)) {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(error = ?err, "could not record search");
            false
        }
    }
}

async fn history(list: bool) -> anyhow::Result<()> {
    let history = SearchHistory::open_default()?;

    if history.entries().is_empty() {
        println!("No searches yet. Try `skyview show <city>`.");
        return Ok(());
    }
    if list {
        print_history(&history);
        return Ok(());
    }

    let recent_first: Vec<String> = history.entries().iter().rev().cloned().collect();
    match Select::new("Show weather for:", recent_first).prompt() {
        Ok(city) => show(Some(city), None, false, false).await,
        Err(InquireError::NotTTY) => {
            print_history(&history);
            Ok(())
        }
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(()),
        Err(err) => Err(err).context("Failed to read history selection"),
    }
}

fn print_history(history: &SearchHistory) {
    for name in history.entries() {
        println!("{name}");
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let default_city = Text::new("Default city:")
        .with_default(&config.dashboard.default_city)
        .prompt()
        .context("Failed to read default city")?;
    if let Location::Name(city) = Location::name(&default_city)? {
        config.dashboard.default_city = city;
    }

    let current_home = config
        .dashboard
        .home
        .map(|c| format!("{},{}", c.lat, c.lon))
        .unwrap_or_default();
    let home = Text::new("Home coordinates (lat,lon):")
        .with_initial_value(&current_home)
        .with_help_message("Used when no city is given; leave empty to skip")
        .prompt()
        .context("Failed to read home coordinates")?;
    config.dashboard.home = parse_coordinates(&home)?;

    config.dashboard.alerts = Confirm::new("Show weather alerts when available?")
        .with_default(config.dashboard.alerts)
        .prompt()
        .context("Failed to read alerts preference")?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

/// Parse "lat,lon"; empty input means no coordinates.
fn parse_coordinates(input: &str) -> anyhow::Result<Option<Coordinates>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let (lat, lon) = input
        .split_once(',')
        .with_context(|| format!("Expected \"lat,lon\", got \"{input}\""))?;
    let lat: f64 = lat.trim().parse().context("Latitude is not a number")?;
    let lon: f64 = lon.trim().parse().context("Longitude is not a number")?;

    Ok(Some(Coordinates::new(lat, lon)?))
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
    fn city_and_coordinates_conflict() {
        let res = Cli::try_parse_from(["skyview", "show", "Paris", "--lat", "1", "--lon", "2"]);
        assert!(res.is_err());
    }

    #[test]
    fn lat_requires_lon() {
        let res = Cli::try_parse_from(["skyview", "show", "--lat", "1"]);
        assert!(res.is_err());
    }

    #[test]
    fn negative_coordinates_parse() {
        let cli = Cli::try_parse_from(["skyview", "show", "--lat", "-33.9", "--lon", "-70.6"])
            .unwrap();

        match cli.command {
            Command::Show { lat, lon, city, .. } => {
                assert_eq!(lat, Some(-33.9));
                assert_eq!(lon, Some(-70.6));
                assert!(city.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn history_picks_by_default_and_lists_on_request() {
        let cli = Cli::try_parse_from(["skyview", "history"]).unwrap();
        assert!(matches!(cli.command, Command::History { list: false }));

        let cli = Cli::try_parse_from(["skyview", "history", "--list"]).unwrap();
        assert!(matches!(cli.command, Command::History { list: true }));
    }

    #[test]
    fn search_is_recorded_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        assert!(record_search(&path, "Paris"));
        assert!(record_search(&path, "Paris"));
        assert_eq!(SearchHistory::open(&path).unwrap().entries(), ["Paris"]);
    }

    #[test]
    fn corrupt_history_does_not_block_a_search() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(!record_search(&path, "Paris"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn parse_coordinates_accepts_pair_or_empty() {
        assert_eq!(
            parse_coordinates(" 51.5, -0.12 ").unwrap(),
            Some(Coordinates { lat: 51.5, lon: -0.12 })
        );
        assert_eq!(parse_coordinates("").unwrap(), None);
        assert!(parse_coordinates("51.5").is_err());
        assert!(parse_coordinates("95,0").is_err());
    }
}
