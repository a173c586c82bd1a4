use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::{
    error::WeatherError,
    model::{
        Coordinates, CurrentConditions, ForecastCity, ForecastSample, ForecastSeries, Location,
        WeatherAlert,
    },
};

use super::WeatherApi;

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn with_options(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// GET `/data/2.5/{endpoint}` for a location and decode the body into `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        location: &Location,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/data/2.5/{endpoint}", self.base_url);

        let mut params = location_params(location);
        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));

        debug!(endpoint, location = %location.query_text(), "requesting OpenWeather");

        let res = self.http.get(&url).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            debug!(endpoint, %status, "OpenWeather rejected request");
            return Err(WeatherError::NotFound {
                status: status.as_u16(),
                message: upstream_message(&body),
            });
        }

        let value: Value = serde_json::from_str(&body)?;
        check_cod(&value)?;

        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    async fn current_by_name(&self, name: &str) -> Result<CurrentConditions, WeatherError> {
        let location = Location::name(name)?;
        let parsed: OwCurrentResponse = self.get_json("weather", &location).await?;
        parsed.try_into()
    }

    async fn current_by_coords(
        &self,
        coords: Coordinates,
    ) -> Result<CurrentConditions, WeatherError> {
        coords.validate()?;
        let parsed: OwCurrentResponse = self.get_json("weather", &Location::Coords(coords)).await?;
        parsed.try_into()
    }

    async fn forecast_by_name(&self, name: &str) -> Result<ForecastSeries, WeatherError> {
        let location = Location::name(name)?;
        let parsed: OwForecastResponse = self.get_json("forecast", &location).await?;
        parsed.try_into()
    }

    async fn forecast_by_coords(&self, coords: Coordinates) -> Result<ForecastSeries, WeatherError> {
        coords.validate()?;
        let parsed: OwForecastResponse =
            self.get_json("forecast", &Location::Coords(coords)).await?;
        parsed.try_into()
    }

    async fn alerts(&self, location: &Location) -> Vec<WeatherAlert> {
        match self.get_json::<OwAlertsResponse>("alerts", location).await {
            Ok(parsed) => parsed.alerts.into_iter().map(Into::into).collect(),
            Err(err) => {
                debug!(error = %err, "weather alerts unavailable");
                Vec::new()
            }
        }
    }
}

fn location_params(location: &Location) -> Vec<(&'static str, String)> {
    match location {
        Location::Name(name) => vec![("q", name.clone())],
        Location::Coords(coords) => vec![
            ("lat", coords.lat.to_string()),
            ("lon", coords.lon.to_string()),
        ],
    }
}

/// OpenWeather may answer 2xx while reporting failure in `cod`, as a number or a string.
fn check_cod(value: &Value) -> Result<(), WeatherError> {
    let code = match value.get("cod") {
        None => return Ok(()),
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.parse::<u64>().ok(),
        Some(_) => None,
    };

    match code {
        Some(200) => Ok(()),
        other => Err(WeatherError::NotFound {
            status: other.and_then(|c| u16::try_from(c).ok()).unwrap_or(0),
            message: value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown location")
                .to_string(),
        }),
    }
}

fn upstream_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| truncate_body(body))
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    sunrise: Option<i64>,
    #[serde(default)]
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwAlert {
    #[serde(default)]
    sender_name: String,
    #[serde(default)]
    event: String,
    start: Option<i64>,
    end: Option<i64>,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwAlertsResponse {
    #[serde(default)]
    alerts: Vec<OwAlert>,
}

fn primary(weather: Vec<OwWeather>) -> Result<OwWeather, WeatherError> {
    weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::Parse("response contained no weather conditions".into()))
}

impl TryFrom<OwCurrentResponse> for CurrentConditions {
    type Error = WeatherError;

    fn try_from(parsed: OwCurrentResponse) -> Result<Self, Self::Error> {
        let weather = primary(parsed.weather)?;

        Ok(CurrentConditions {
            name: parsed.name,
            country: parsed.sys.country,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            temp_min_c: parsed.main.temp_min,
            temp_max_c: parsed.main.temp_max,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
            wind_deg: parsed.wind.deg,
            condition: weather.main,
            description: weather.description,
            icon: weather.icon,
            sunrise: timestamp(parsed.sys.sunrise)?,
            sunset: timestamp(parsed.sys.sunset)?,
            observed_at: timestamp(parsed.dt)?,
        })
    }
}

impl TryFrom<OwForecastEntry> for ForecastSample {
    type Error = WeatherError;

    fn try_from(entry: OwForecastEntry) -> Result<Self, Self::Error> {
        let weather = primary(entry.weather)?;

        Ok(ForecastSample {
            time: timestamp(entry.dt)?,
            temperature_c: entry.main.temp,
            feels_like_c: entry.main.feels_like,
            temp_min_c: entry.main.temp_min,
            temp_max_c: entry.main.temp_max,
            humidity_pct: entry.main.humidity,
            wind_speed_mps: entry.wind.speed,
            condition: weather.main,
            description: weather.description,
            icon: weather.icon,
        })
    }
}

impl TryFrom<OwForecastResponse> for ForecastSeries {
    type Error = WeatherError;

    fn try_from(parsed: OwForecastResponse) -> Result<Self, Self::Error> {
        let samples = parsed
            .list
            .into_iter()
            .map(ForecastSample::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ForecastSeries {
            city: ForecastCity {
                name: parsed.city.name,
                country: parsed.city.country,
                sunrise: parsed.city.sunrise.and_then(unix_to_utc),
                sunset: parsed.city.sunset.and_then(unix_to_utc),
            },
            samples,
        })
    }
}

impl From<OwAlert> for WeatherAlert {
    fn from(alert: OwAlert) -> Self {
        WeatherAlert {
            sender: alert.sender_name,
            event: alert.event,
            start: alert.start.and_then(unix_to_utc),
            end: alert.end.and_then(unix_to_utc),
            description: alert.description,
        }
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn timestamp(ts: i64) -> Result<DateTime<Utc>, WeatherError> {
    unix_to_utc(ts).ok_or_else(|| WeatherError::Parse(format!("invalid timestamp {ts}")))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
