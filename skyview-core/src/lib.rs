//! Core library for the `skyview` weather dashboard.
//!
//! This crate defines:
//! - The OpenWeather client and its error taxonomy
//! - Condition theming and daily forecast sampling
//! - The fetch orchestrator that owns dashboard state
//! - Configuration and search-history persistence
//!
//! It is used by `skyview-cli`, but rendering, notifications and geolocation
//! are injected, so other front ends can reuse it.

pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod orchestrator;
pub mod platform;
pub mod sampler;
pub mod theme;
pub mod view;

pub use client::{WeatherApi, client_from_config, openweather::OpenWeatherClient};
pub use config::Config;
pub use error::WeatherError;
pub use history::SearchHistory;
pub use model::{Coordinates, CurrentConditions, ForecastSample, ForecastSeries, Location};
pub use orchestrator::{AppState, FetchOrchestrator, FetchOutcome, OrchestratorOptions};
pub use platform::{Geolocator, LocationError, NotificationPermission, Notifier};
pub use theme::{ConditionTheme, classify};
pub use view::{DashboardView, Renderer, ShareMessage};
