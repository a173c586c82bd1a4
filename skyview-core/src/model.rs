use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, WeatherError> {
        let coords = Self { lat, lon };
        coords.validate()?;
        Ok(coords)
    }

    /// Check that both components are finite and inside the valid ranges.
    pub fn validate(&self) -> Result<(), WeatherError> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(WeatherError::invalid(format!(
                "latitude {} is outside [-90, 90]",
                self.lat
            )));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(WeatherError::invalid(format!(
                "longitude {} is outside [-180, 180]",
                self.lon
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Where to fetch weather for. Exactly one form per request.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Name(String),
    Coords(Coordinates),
}

impl Location {
    /// Build a location from optional inputs, as they arrive from a form or command line.
    pub fn from_parts(name: Option<&str>, coords: Option<Coordinates>) -> Result<Self, WeatherError> {
        match (name, coords) {
            (Some(_), Some(_)) => Err(WeatherError::invalid(
                "supply either a place name or coordinates, not both",
            )),
            (Some(name), None) => Self::name(name),
            (None, Some(coords)) => {
                coords.validate()?;
                Ok(Self::Coords(coords))
            }
            (None, None) => Err(WeatherError::invalid("no location provided")),
        }
    }

    /// A trimmed, non-blank place name.
    pub fn name(name: &str) -> Result<Self, WeatherError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(WeatherError::invalid("place name must not be empty"));
        }
        Ok(Self::Name(trimmed.to_string()))
    }

    /// Text suitable for the search box / query field.
    pub fn query_text(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Coords(coords) => coords.to_string(),
        }
    }
}

/// Observed conditions for a single place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub name: String,
    pub country: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub wind_deg: f64,
    /// Primary condition label, e.g. "Rain".
    pub condition: String,
    pub description: String,
    pub icon: String,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub observed_at: DateTime<Utc>,
}

impl CurrentConditions {
    pub fn wind_compass(&self) -> &'static str {
        compass_point(self.wind_deg)
    }

    pub fn rounded_temperature(&self) -> i64 {
        self.temperature_c.round() as i64
    }
}

/// One 3-hourly step of the forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub time: DateTime<Utc>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub condition: String,
    pub description: String,
    pub icon: String,
}

/// City summary block attached to a forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastCity {
    pub name: String,
    pub country: String,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

/// Chronological forecast at a fixed 3-hour spacing, up to 5 days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub city: ForecastCity,
    pub samples: Vec<ForecastSample>,
}

/// One representative reading per day, picked by fixed stride.
pub type DailyForecastEntry<'a> = &'a ForecastSample;

/// A weather warning issued for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub sender: String,
    pub event: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub description: String,
}

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Eight-point compass name for a bearing in degrees.
pub fn compass_point(degrees: f64) -> &'static str {
    let index = (degrees.rem_euclid(360.0) / 45.0).round() as usize % 8;
    COMPASS[index]
}
