use crate::{
    Config,
    client::openweather::OpenWeatherClient,
    error::WeatherError,
    model::{Coordinates, CurrentConditions, ForecastSeries, Location, WeatherAlert},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// The two calls a dashboard needs, for either form of location.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    async fn current_by_name(&self, name: &str) -> Result<CurrentConditions, WeatherError>;

    async fn current_by_coords(&self, coords: Coordinates)
    -> Result<CurrentConditions, WeatherError>;

    async fn forecast_by_name(&self, name: &str) -> Result<ForecastSeries, WeatherError>;

    async fn forecast_by_coords(&self, coords: Coordinates)
    -> Result<ForecastSeries, WeatherError>;

    /// Active weather alerts. Best-effort: failures yield an empty list.
    async fn alerts(&self, _location: &Location) -> Vec<WeatherAlert> {
        Vec::new()
    }

    async fn current(&self, location: &Location) -> Result<CurrentConditions, WeatherError> {
        match location {
            Location::Name(name) => self.current_by_name(name).await,
            Location::Coords(coords) => self.current_by_coords(*coords).await,
        }
    }

    async fn forecast(&self, location: &Location) -> Result<ForecastSeries, WeatherError> {
        match location {
            Location::Name(name) => self.forecast_by_name(name).await,
            Location::Coords(coords) => self.forecast_by_coords(*coords).await,
        }
    }
}

/// Construct the OpenWeather client from config.
pub fn client_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherApi>> {
    let api_key = config.api_key()?;

    let client = OpenWeatherClient::with_options(
        api_key,
        config.openweather.base_url.clone(),
        config.timeout(),
    )?;

    Ok(Box::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_from_config_works_when_key_is_set() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        let client = client_from_config(&cfg);
        assert!(client.is_ok());
    }
}
