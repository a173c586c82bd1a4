use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};
use skyview_core::{DashboardView, Renderer, theme};

/// Plain-text dashboard.
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

fn local(time: DateTime<Utc>, fmt: &str) -> String {
    time.with_timezone(&Local).format(fmt).to_string()
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, view: &DashboardView) -> anyhow::Result<()> {
        let out = &mut self.out;

        if view.loading {
            writeln!(out, "Loading…")?;
        }
        if let Some(error) = &view.error {
            writeln!(out, "! {error}")?;
        }

        let Some(current) = &view.current else {
            return Ok(());
        };

        writeln!(
            out,
            "{} {}, {}",
            view.theme.glyph(),
            current.name,
            current.country
        )?;
        writeln!(
            out,
            "  {}°C  {}  (feels like {:.0}°C)",
            current.rounded_temperature(),
            current.description,
            current.feels_like_c
        )?;
        writeln!(
            out,
            "  H {:.0}° L {:.0}°  Humidity {}%  Wind {:.1} m/s {}",
            current.temp_max_c,
            current.temp_min_c,
            current.humidity_pct,
            current.wind_speed_mps,
            current.wind_compass()
        )?;
        writeln!(
            out,
            "  Sunrise {}  Sunset {}",
            local(current.sunrise, "%H:%M"),
            local(current.sunset, "%H:%M")
        )?;

        if !view.hourly.is_empty() {
            writeln!(out, "\nNext hours")?;
            for sample in &view.hourly {
                writeln!(
                    out,
                    "  {}  {:>4.0}°  {}",
                    local(sample.time, "%H:%M"),
                    sample.temperature_c,
                    sample.condition
                )?;
            }
        }

        if !view.daily.is_empty() {
            writeln!(out, "\nForecast")?;
            for day in &view.daily {
                writeln!(
                    out,
                    "  {}  {} {:>4.0}°  {}",
                    local(day.time, "%a %d"),
                    theme::classify(&day.condition).glyph(),
                    day.temperature_c,
                    day.description
                )?;
            }
        }

        for alert in &view.alerts {
            writeln!(out, "\n⚠ {} ({})", alert.event, alert.sender)?;
            if !alert.description.is_empty() {
                writeln!(out, "  {}", alert.description)?;
            }
        }

        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use skyview_core::{ConditionTheme, CurrentConditions, ForecastSample};

    fn view() -> DashboardView {
        let t = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        DashboardView {
            current: Some(CurrentConditions {
                name: "Madrid".into(),
                country: "ES".into(),
                temperature_c: 31.4,
                feels_like_c: 30.2,
                temp_min_c: 25.0,
                temp_max_c: 33.0,
                humidity_pct: 20,
                wind_speed_mps: 2.5,
                wind_deg: 90.0,
                condition: "Clear".into(),
                description: "clear sky".into(),
                icon: "01d".into(),
                sunrise: t,
                sunset: t,
                observed_at: t,
            }),
            theme: ConditionTheme::Sunny,
            daily: vec![ForecastSample {
                time: t,
                temperature_c: 29.0,
                feels_like_c: 28.0,
                temp_min_c: 24.0,
                temp_max_c: 30.0,
                humidity_pct: 25,
                wind_speed_mps: 3.0,
                condition: "Clouds".into(),
                description: "few clouds".into(),
                icon: "02d".into(),
            }],
            hourly: Vec::new(),
            alerts: Vec::new(),
            loading: false,
            error: None,
        }
    }

    fn rendered(view: &DashboardView) -> String {
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.render(view).unwrap();
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn renders_current_conditions_and_forecast() {
        let text = rendered(&view());

        assert!(text.contains("☀ Madrid, ES"));
        assert!(text.contains("31°C  clear sky"));
        assert!(text.contains("Wind 2.5 m/s E"));
        assert!(text.contains("Forecast"));
        assert!(text.contains("☁   29°  few clouds"));
        assert!(!text.contains("Next hours"));
    }

    #[test]
    fn renders_error_without_weather() {
        let view = DashboardView {
            current: None,
            error: Some("City not found. Please try again.".into()),
            ..view()
        };

        let text = rendered(&view);
        assert_eq!(text, "! City not found. Please try again.\n");
    }
}
