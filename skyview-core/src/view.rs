use serde::Serialize;

use crate::{
    model::{CurrentConditions, ForecastSample, WeatherAlert},
    orchestrator::AppState,
    sampler,
    theme::{self, ConditionTheme},
};

/// Number of 3-hourly samples shown in the hourly strip.
pub const HOURLY_SAMPLES: usize = 8;

/// Everything a renderer needs to draw the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub current: Option<CurrentConditions>,
    pub theme: ConditionTheme,
    pub daily: Vec<ForecastSample>,
    pub hourly: Vec<ForecastSample>,
    pub alerts: Vec<WeatherAlert>,
    pub loading: bool,
    pub error: Option<String>,
}

impl DashboardView {
    pub fn from_state(state: &AppState) -> Self {
        let theme = state
            .weather
            .as_ref()
            .map(|w| theme::classify(&w.condition))
            .unwrap_or_default();

        let (daily, hourly) = match &state.forecast {
            Some(series) => (
                sampler::sample(&series.samples).cloned().collect(),
                sampler::next_hours(&series.samples, HOURLY_SAMPLES).to_vec(),
            ),
            None => (Vec::new(), Vec::new()),
        };

        Self {
            current: state.weather.clone(),
            theme,
            daily,
            hourly,
            alerts: state.alerts.clone(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    pub fn share_message(&self) -> Option<ShareMessage> {
        self.current.as_ref().map(ShareMessage::for_conditions)
    }
}

/// Presentation collaborator.
pub trait Renderer {
    fn render(&mut self, view: &DashboardView) -> anyhow::Result<()>;
}

/// Text handed to a platform share sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareMessage {
    pub title: String,
    pub text: String,
}

impl ShareMessage {
    pub fn for_conditions(current: &CurrentConditions) -> Self {
        Self {
            title: format!("Weather in {}", current.name),
            text: format!(
                "It's currently {}°C and {} in {}. Check it out!",
                current.rounded_temperature(),
                current.description,
                current.name
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ForecastCity, ForecastSeries};
    use chrono::{Duration, TimeZone, Utc};

    fn conditions(condition: &str, temp: f64) -> CurrentConditions {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        CurrentConditions {
            name: "Lisbon".into(),
            country: "PT".into(),
            temperature_c: temp,
            feels_like_c: temp,
            temp_min_c: temp,
            temp_max_c: temp,
            humidity_pct: 70,
            wind_speed_mps: 3.0,
            wind_deg: 90.0,
            condition: condition.into(),
            description: "light rain".into(),
            icon: "10d".into(),
            sunrise: t,
            sunset: t,
            observed_at: t,
        }
    }

    fn forecast(len: usize) -> ForecastSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ForecastSeries {
            city: ForecastCity {
                name: "Lisbon".into(),
                country: "PT".into(),
                sunrise: None,
                sunset: None,
            },
            samples: (0..len)
                .map(|i| ForecastSample {
                    time: start + Duration::hours(3 * i as i64),
                    temperature_c: 10.0,
                    feels_like_c: 9.0,
                    temp_min_c: 8.0,
                    temp_max_c: 11.0,
                    humidity_pct: 60,
                    wind_speed_mps: 2.0,
                    condition: "Clouds".into(),
                    description: "few clouds".into(),
                    icon: "02d".into(),
                })
                .collect(),
        }
    }

    #[test]
    fn empty_state_uses_default_theme() {
        let view = DashboardView::from_state(&AppState::default());

        assert_eq!(view.theme, ConditionTheme::Default);
        assert!(view.current.is_none());
        assert!(view.daily.is_empty());
        assert!(view.share_message().is_none());
    }

    #[test]
    fn view_derives_theme_and_daily_list() {
        let state = AppState {
            weather: Some(conditions("Rain", 14.6)),
            forecast: Some(forecast(40)),
            ..AppState::default()
        };

        let view = DashboardView::from_state(&state);

        assert_eq!(view.theme, ConditionTheme::Rainy);
        assert_eq!(view.daily.len(), 5);
        assert_eq!(view.hourly.len(), HOURLY_SAMPLES);
    }

    #[test]
    fn share_message_rounds_temperature() {
        let msg = ShareMessage::for_conditions(&conditions("Rain", 14.6));

        assert_eq!(msg.title, "Weather in Lisbon");
        assert_eq!(
            msg.text,
            "It's currently 15°C and light rain in Lisbon. Check it out!"
        );
    }
}
