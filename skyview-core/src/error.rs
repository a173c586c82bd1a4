use thiserror::Error;

/// Message shown in place of weather content when the upstream does not know a location.
pub const CITY_NOT_FOUND: &str = "City not found. Please try again.";

/// Failures produced by the weather client and surfaced by the orchestrator.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The caller broke a precondition (blank name, missing location, bad coordinates).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream rejected the location (non-2xx status or a non-200 `cod`).
    #[error("Location not found ({status}): {message}")]
    NotFound { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse weather response: {0}")]
    Parse(String),
}

impl WeatherError {
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The single string displayed to the user after a failed fetch.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { .. } => CITY_NOT_FOUND.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_location_message() {
        let err = WeatherError::NotFound {
            status: 404,
            message: "city not found".into(),
        };

        assert!(err.is_not_found());
        assert_eq!(err.user_message(), CITY_NOT_FOUND);
    }

    #[test]
    fn other_errors_use_raw_message() {
        let err = WeatherError::Parse("missing field `main`".into());

        assert!(!err.is_not_found());
        assert_eq!(
            err.user_message(),
            "Failed to parse weather response: missing field `main`"
        );
    }

    #[test]
    fn json_errors_become_parse_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = WeatherError::from(json_err);

        assert!(matches!(err, WeatherError::Parse(_)));
    }
}
