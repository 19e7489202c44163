//! Measurement-unit selection and display suffixes.
//!
//! The unit system only changes the suffixes attached to display strings and
//! the `units` query parameter sent upstream; all numeric values are used in
//! whatever unit the API already returned them in.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl UnitSystem {
    /// Value for the OpenWeatherMap `units` query parameter. Also used as the
    /// unit component of cache keys.
    pub fn as_query(self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
            UnitSystem::Standard => "standard",
        }
    }

    /// Suffix appended to temperatures ("18°C", "64°F", "291K").
    pub fn temp_suffix(self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
            UnitSystem::Standard => "K",
        }
    }

    /// Suffix appended to wind speeds.
    pub fn wind_suffix(self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
            UnitSystem::Standard => "m/s",
        }
    }

    /// Parse a selector coming from a cookie or request body. Anything
    /// unrecognized (or absent) falls back to Metric, so downstream code
    /// never sees an invalid selector.
    pub fn from_selector(selector: Option<&str>) -> Self {
        match selector {
            Some("imperial") => UnitSystem::Imperial,
            Some("standard") => UnitSystem::Standard,
            _ => UnitSystem::Metric,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_suffixes() {
        assert_eq!(UnitSystem::Metric.temp_suffix(), "°C");
        assert_eq!(UnitSystem::Metric.wind_suffix(), "m/s");
    }

    #[test]
    fn test_imperial_suffixes() {
        assert_eq!(UnitSystem::Imperial.temp_suffix(), "°F");
        assert_eq!(UnitSystem::Imperial.wind_suffix(), "mph");
    }

    #[test]
    fn test_standard_suffixes() {
        assert_eq!(UnitSystem::Standard.temp_suffix(), "K");
        assert_eq!(UnitSystem::Standard.wind_suffix(), "m/s");
    }

    #[test]
    fn test_selector_roundtrip() {
        for unit in [
            UnitSystem::Metric,
            UnitSystem::Imperial,
            UnitSystem::Standard,
        ] {
            assert_eq!(UnitSystem::from_selector(Some(unit.as_query())), unit);
        }
    }

    #[test]
    fn test_unknown_selector_defaults_to_metric() {
        assert_eq!(UnitSystem::from_selector(Some("kelvin")), UnitSystem::Metric);
        assert_eq!(UnitSystem::from_selector(Some("")), UnitSystem::Metric);
        assert_eq!(UnitSystem::from_selector(None), UnitSystem::Metric);
    }
}
