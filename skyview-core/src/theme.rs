use serde::{Deserialize, Serialize};

/// Coarse visual category derived from a condition label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConditionTheme {
    Sunny,
    Rainy,
    Cloudy,
    Snowy,
    Misty,
    #[default]
    Default,
}

/// Keyword groups in priority order; first match wins.
const KEYWORDS: [(&str, ConditionTheme); 5] = [
    ("clear", ConditionTheme::Sunny),
    ("rain", ConditionTheme::Rainy),
    ("cloud", ConditionTheme::Cloudy),
    ("snow", ConditionTheme::Snowy),
    ("mist", ConditionTheme::Misty),
];

/// Map a condition label such as "Rain" or "scattered clouds" to a theme.
pub fn classify(label: &str) -> ConditionTheme {
    let lower = label.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, theme)| *theme)
        .unwrap_or_default()
}

impl ConditionTheme {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Rainy => "rainy",
            Self::Cloudy => "cloudy",
            Self::Snowy => "snowy",
            Self::Misty => "misty",
            Self::Default => "default",
        }
    }

    /// Single-character symbol for text renderers.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Sunny => "☀",
            Self::Rainy => "☂",
            Self::Cloudy => "☁",
            Self::Snowy => "❄",
            Self::Misty => "≋",
            Self::Default => "•",
        }
    }
}

impl std::fmt::Display for ConditionTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_labels() {
        assert_eq!(classify("Clear"), ConditionTheme::Sunny);
        assert_eq!(classify("Rain"), ConditionTheme::Rainy);
        assert_eq!(classify("Clouds"), ConditionTheme::Cloudy);
        assert_eq!(classify("Snow"), ConditionTheme::Snowy);
        assert_eq!(classify("Mist"), ConditionTheme::Misty);
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        assert_eq!(classify("Clear sky"), ConditionTheme::Sunny);
        assert_eq!(classify("LIGHT RAIN"), ConditionTheme::Rainy);
        assert_eq!(classify("overcast clouds"), ConditionTheme::Cloudy);
        assert_eq!(classify("freezing rain"), ConditionTheme::Rainy);
    }

    #[test]
    fn priority_order_decides_ambiguous_labels() {
        assert_eq!(classify("clearing after rain"), ConditionTheme::Sunny);
        assert_eq!(classify("rain and snow"), ConditionTheme::Rainy);
        assert_eq!(classify("cloudy with snow"), ConditionTheme::Cloudy);
        assert_eq!(classify("snow mist"), ConditionTheme::Snowy);
    }

    #[test]
    fn rain_without_clear_is_always_rainy() {
        for label in ["Rain", "light rain", "shower rain", "rain with clouds", "Drizzle rain"] {
            assert_eq!(classify(label), ConditionTheme::Rainy, "label: {label}");
        }
    }

    #[test]
    fn every_theme_has_its_own_glyph() {
        let themes = [
            ConditionTheme::Sunny,
            ConditionTheme::Rainy,
            ConditionTheme::Cloudy,
            ConditionTheme::Snowy,
            ConditionTheme::Misty,
            ConditionTheme::Default,
        ];
        let glyphs: std::collections::HashSet<_> = themes.iter().map(|t| t.glyph()).collect();

        assert_eq!(glyphs.len(), themes.len());
        assert_eq!(classify("light rain").glyph(), "☂");
    }

    #[test]
    fn unknown_labels_fall_back_to_default() {
        assert_eq!(classify("Thunderstorm"), ConditionTheme::Default);
        assert_eq!(classify("Haze"), ConditionTheme::Default);
        assert_eq!(classify(""), ConditionTheme::Default);
    }
}
