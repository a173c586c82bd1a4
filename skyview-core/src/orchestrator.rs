//! Request sequencing and application state.
//!
//! Every request takes a ticket. Only the holder of the latest ticket may
//! commit its result, so a slow response that arrives after a newer request
//! has started is dropped instead of overwriting fresher data.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    Config,
    client::WeatherApi,
    config::DEFAULT_CITY,
    error::WeatherError,
    model::{Coordinates, CurrentConditions, ForecastSeries, Location, WeatherAlert},
    platform::{Geolocator, LocationError, NotificationPermission, Notifier},
    view::DashboardView,
};

/// Dashboard state owned by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub query: String,
    pub weather: Option<CurrentConditions>,
    pub forecast: Option<ForecastSeries>,
    pub alerts: Vec<WeatherAlert>,
    pub loading: bool,
    pub error: Option<String>,
    pub notifications_enabled: bool,
}

/// How a request ended, once validation has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success,
    /// The user-visible message now stored in [`AppState::error`].
    Failed(String),
    /// A newer request started before this one finished; nothing was committed.
    Superseded,
}

#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Shown when device location fails before anything has loaded.
    pub default_city: String,
    pub fetch_alerts: bool,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            default_city: DEFAULT_CITY.to_string(),
            fetch_alerts: false,
        }
    }
}

impl From<&Config> for OrchestratorOptions {
    fn from(config: &Config) -> Self {
        Self {
            default_city: config.dashboard.default_city.clone(),
            fetch_alerts: config.dashboard.alerts,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: AppState,
    latest: u64,
}

#[derive(Debug)]
pub struct FetchOrchestrator {
    api: Arc<dyn WeatherApi>,
    notifier: Arc<dyn Notifier>,
    options: OrchestratorOptions,
    inner: Mutex<Inner>,
}

impl FetchOrchestrator {
    pub fn new(
        api: Arc<dyn WeatherApi>,
        notifier: Arc<dyn Notifier>,
        options: OrchestratorOptions,
    ) -> Self {
        let state = AppState {
            notifications_enabled: notifier.permission() == NotificationPermission::Granted,
            ..AppState::default()
        };

        Self {
            api,
            notifier,
            options,
            inner: Mutex::new(Inner { state, latest: 0 }),
        }
    }

    pub async fn state(&self) -> AppState {
        self.inner.lock().await.state.clone()
    }

    pub async fn view(&self) -> DashboardView {
        DashboardView::from_state(&self.inner.lock().await.state)
    }

    /// Drop any loaded weather, forecast and alerts.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.state.weather = None;
        inner.state.forecast = None;
        inner.state.alerts.clear();
    }

    pub async fn fetch_by_name(&self, name: &str) -> Result<FetchOutcome, WeatherError> {
        let location = Location::name(name)?;
        self.run(location).await
    }

    pub async fn fetch_by_coords(&self, coords: Coordinates) -> Result<FetchOutcome, WeatherError> {
        coords.validate()?;
        self.run(Location::Coords(coords)).await
    }

    pub async fn fetch(&self, location: Location) -> Result<FetchOutcome, WeatherError> {
        match location {
            Location::Name(name) => self.fetch_by_name(&name).await,
            Location::Coords(coords) => self.fetch_by_coords(coords).await,
        }
    }

    /// Fetch for the device position, falling back to the default city when
    /// the position is unavailable and nothing has been loaded yet.
    pub async fn fetch_by_device_location(
        &self,
        geolocator: &dyn Geolocator,
    ) -> Result<FetchOutcome, WeatherError> {
        let ticket = {
            let mut inner = self.inner.lock().await;
            inner.latest += 1;
            inner.state.loading = true;
            inner.latest
        };

        let err = match geolocator.locate().await {
            Ok(coords) => match coords.validate() {
                Ok(()) => {
                    debug!(%coords, "device location resolved");
                    let location = Location::Coords(coords);
                    if !self.resume(ticket, &location).await {
                        return Ok(FetchOutcome::Superseded);
                    }
                    return Ok(self.run_with_ticket(ticket, location).await);
                }
                Err(invalid) => {
                    warn!(error = %invalid, "device reported unusable coordinates");
                    LocationError::Unavailable
                }
            },
            Err(err) => err,
        };

        let has_weather = {
            let mut inner = self.inner.lock().await;
            if inner.latest != ticket {
                return Ok(FetchOutcome::Superseded);
            }
            inner.state.loading = false;
            inner.state.error = Some(err.to_string());
            inner.state.weather.is_some()
        };

        warn!(error = %err, "device location failed");

        if has_weather {
            return Ok(FetchOutcome::Failed(err.to_string()));
        }

        info!(city = %self.options.default_city, "falling back to default city");
        self.fetch_by_name(&self.options.default_city).await
    }

    /// Ask for notification permission and turn notifications on if granted.
    pub async fn enable_notifications(&self) -> NotificationPermission {
        let permission = self.notifier.request_permission().await;

        if permission == NotificationPermission::Granted {
            self.inner.lock().await.state.notifications_enabled = true;
            self.send_notification("Notifications Enabled", "We'll let you know about the weather!");
        }

        permission
    }

    async fn run(&self, location: Location) -> Result<FetchOutcome, WeatherError> {
        let ticket = self.begin(&location).await;
        Ok(self.run_with_ticket(ticket, location).await)
    }

    /// Issue both calls and commit the result if `ticket` is still the latest.
    async fn run_with_ticket(&self, ticket: u64, location: Location) -> FetchOutcome {
        let result = tokio::try_join!(self.api.current(&location), self.api.forecast(&location));

        let alerts = match &result {
            Ok(_) if self.options.fetch_alerts => self.api.alerts(&location).await,
            _ => Vec::new(),
        };

        let mut inner = self.inner.lock().await;
        if inner.latest != ticket {
            debug!(ticket, latest = inner.latest, "discarding stale response");
            return FetchOutcome::Superseded;
        }
        inner.state.loading = false;

        match result {
            Ok((weather, forecast)) => {
                info!(
                    place = %weather.name,
                    temp = weather.temperature_c,
                    samples = forecast.samples.len(),
                    "weather updated"
                );

                let summary = inner
                    .state
                    .notifications_enabled
                    .then(|| notification_for(&weather));

                inner.state.weather = Some(weather);
                inner.state.forecast = Some(forecast);
                inner.state.alerts = alerts;
                drop(inner);

                if let Some((title, body)) = summary {
                    self.send_notification(&title, &body);
                }

                FetchOutcome::Success
            }
            Err(err) => {
                warn!(error = %err, query = %location.query_text(), "weather fetch failed");
                let message = err.user_message();
                inner.state.error = Some(message.clone());
                FetchOutcome::Failed(message)
            }
        }
    }

    /// Enter the loading state and take a new ticket.
    async fn begin(&self, location: &Location) -> u64 {
        let mut inner = self.inner.lock().await;
        inner.latest += 1;
        inner.state.query = location.query_text();
        inner.state.loading = true;
        inner.state.error = None;
        inner.latest
    }

    /// Carry an already-issued ticket into the loading state for `location`.
    /// Returns `false` if a newer request has taken over.
    async fn resume(&self, ticket: u64, location: &Location) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.latest != ticket {
            debug!(ticket, latest = inner.latest, "device location arrived after a newer request");
            return false;
        }
        inner.state.query = location.query_text();
        inner.state.error = None;
        true
    }

    fn send_notification(&self, title: &str, body: &str) {
        if self.notifier.permission() != NotificationPermission::Granted {
            return;
        }
        if let Err(err) = self.notifier.notify(title, body) {
            warn!(error = %err, "notification not delivered");
        }
    }
}

fn notification_for(weather: &CurrentConditions) -> (String, String) {
    (
        format!("Weather in {}", weather.name),
        format!(
            "It's currently {}°C with {}.",
            weather.rounded_temperature(),
            weather.description
        ),
    )
}
