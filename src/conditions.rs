//! Weather-condition taxonomy and icon classification.
//!
//! OpenWeatherMap reports conditions as free-text descriptions ("light rain",
//! "overcast clouds", ...). This module maps every known description to a
//! coarse [`ConditionCategory`] and a display icon, with one twist: the
//! Clouds category ignores the string and picks its icon from the cloud-cover
//! percentage instead. Everything here is a pure lookup over tables built
//! once at startup, so results are deterministic and safe to cache.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Icon used for any description the taxonomy does not know.
pub const DEFAULT_ICON: &str = "default.svg";

/// Coarse classification of a weather description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionCategory {
    Clear,
    Clouds,
    Drizzle,
    Rain,
    Thunderstorm,
    Snow,
    Mist,
    Unknown,
}

const CLOUDS: &[&str] = &[
    "few clouds",
    "scattered clouds",
    "broken clouds",
    "overcast clouds",
];

const MIST_FAMILY: &[&str] = &[
    "mist", "smoke", "haze", "fog", "sand", "dust", "ash", "squall", "tornado",
];

const DRIZZLE: &[&str] = &[
    "light intensity drizzle",
    "drizzle",
    "heavy intensity drizzle",
    "light intensity drizzle rain",
    "drizzle rain",
    "heavy intensity drizzle rain",
    "shower rain and drizzle",
    "heavy shower rain and drizzle",
    "shower drizzle",
];

const RAIN: &[&str] = &[
    "light rain",
    "moderate rain",
    "heavy intensity rain",
    "very heavy rain",
    "extreme rain",
    "freezing rain",
    "light intensity shower rain",
    "shower rain",
    "heavy intensity shower rain",
    "ragged shower rain",
];

const THUNDERSTORM: &[&str] = &[
    "thunderstorm with light rain",
    "thunderstorm with rain",
    "thunderstorm with heavy rain",
    "light thunderstorm",
    "thunderstorm",
    "heavy thunderstorm",
    "ragged thunderstorm",
    "thunderstorm with light drizzle",
    "thunderstorm with drizzle",
    "thunderstorm with heavy drizzle",
];

const SNOW: &[&str] = &[
    "light snow",
    "snow",
    "heavy snow",
    "sleet",
    "light shower sleet",
    "shower sleet",
    "light rain and snow",
    "rain and snow",
    "light shower snow",
    "shower snow",
    "heavy shower snow",
];

/// Description -> category, built once. Descriptions are matched exactly
/// against the lower-cased text the API returns.
static CATEGORY_TABLE: LazyLock<HashMap<&'static str, ConditionCategory>> = LazyLock::new(|| {
    let mut table = HashMap::new();
    table.insert("clear sky", ConditionCategory::Clear);
    for (list, category) in [
        (CLOUDS, ConditionCategory::Clouds),
        (MIST_FAMILY, ConditionCategory::Mist),
        (DRIZZLE, ConditionCategory::Drizzle),
        (RAIN, ConditionCategory::Rain),
        (THUNDERSTORM, ConditionCategory::Thunderstorm),
        (SNOW, ConditionCategory::Snow),
    ] {
        for description in list {
            table.insert(*description, category);
        }
    }
    table
});

/// Description -> icon, for every category except Clouds (whose icon comes
/// from [`cloud_icon`]). Covers a few vocabulary variants ("volcanic ash",
/// "squalls", "sand/dust whirls") that the API uses alongside the short
/// forms in the category lists.
static ICON_TABLE: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut table = HashMap::new();

    table.insert("clear sky", "clear_sky.svg");

    for description in DRIZZLE {
        table.insert(*description, "drizzle.svg");
    }
    for description in RAIN {
        table.insert(*description, "rain.svg");
    }
    // Freezing rain is visually snow.
    table.insert("freezing rain", "snow.svg");
    for description in THUNDERSTORM {
        table.insert(*description, "thunderstorm.svg");
    }
    for description in SNOW {
        table.insert(*description, "snow.svg");
    }

    for (description, icon) in [
        ("mist", "mist.svg"),
        ("smoke", "mist.svg"),
        ("haze", "haze.svg"),
        ("fog", "mist.svg"),
        ("sand/dust whirls", "dust.svg"),
        ("sand", "dust.svg"),
        ("dust", "dust.svg"),
        ("ash", "dust.svg"),
        ("volcanic ash", "dust.svg"),
        ("squall", "tornado.svg"),
        ("squalls", "tornado.svg"),
        ("tornado", "tornado.svg"),
    ] {
        table.insert(description, icon);
    }

    table
});

/// Classify a raw description. Total: unmatched strings are `Unknown`.
pub fn category_of(description: &str) -> ConditionCategory {
    CATEGORY_TABLE
        .get(description)
        .copied()
        .unwrap_or(ConditionCategory::Unknown)
}

/// Icon for a cloud-cover percentage. Bounds are inclusive on the upper end,
/// first band wins. Input is accepted as-is: negative values land in the
/// clear-sky band and values above 100 in the overcast band, which keeps the
/// function total without clamping.
pub fn cloud_icon(percent: f64) -> &'static str {
    if percent <= 10.0 {
        "clear_sky.svg"
    } else if percent <= 25.0 {
        "few_clouds.svg"
    } else if percent <= 50.0 {
        "scattered_clouds.svg"
    } else if percent <= 75.0 {
        "broken_clouds.svg"
    } else {
        "overcast_clouds.svg"
    }
}

/// Resolve the icon for a description. Clouds delegate to [`cloud_icon`];
/// everything else is a flat table lookup falling back to [`DEFAULT_ICON`].
pub fn icon_for(description: &str, cloud_percent: f64) -> &'static str {
    if category_of(description) == ConditionCategory::Clouds {
        cloud_icon(cloud_percent)
    } else {
        ICON_TABLE
            .get(description)
            .copied()
            .unwrap_or(DEFAULT_ICON)
    }
}

/// Display label and icon for one observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classified {
    pub label: String,
    pub icon: String,
}

/// Turn a raw description plus cloud cover into a display label and icon.
///
/// The label is the raw description passed through unchanged, except for
/// "clear sky" which is rewritten to "Sunny". Pure function of its inputs.
pub fn classify(description: &str, cloud_percent: f64) -> Classified {
    let icon = icon_for(description, cloud_percent);
    let label = if description == "clear sky" {
        "Sunny".to_string()
    } else {
        description.to_string()
    };
    Classified {
        label,
        icon: icon.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "clear_sky.svg")]
    #[case(10.0, "clear_sky.svg")]
    #[case(11.0, "few_clouds.svg")]
    #[case(25.0, "few_clouds.svg")]
    #[case(26.0, "scattered_clouds.svg")]
    #[case(50.0, "scattered_clouds.svg")]
    #[case(51.0, "broken_clouds.svg")]
    #[case(75.0, "broken_clouds.svg")]
    #[case(76.0, "overcast_clouds.svg")]
    #[case(100.0, "overcast_clouds.svg")]
    fn test_cloud_icon_breakpoints(#[case] percent: f64, #[case] expected: &str) {
        assert_eq!(cloud_icon(percent), expected);
    }

    #[test]
    fn test_cloud_icon_out_of_range_does_not_panic() {
        assert_eq!(cloud_icon(-5.0), "clear_sky.svg");
        assert_eq!(cloud_icon(140.0), "overcast_clouds.svg");
    }

    #[test]
    fn test_clear_sky_is_sunny() {
        for percent in [0.0, 42.0, 100.0] {
            let classified = classify("clear sky", percent);
            assert_eq!(classified.label, "Sunny");
            assert_eq!(classified.icon, "clear_sky.svg");
        }
    }

    #[test]
    fn test_cloud_descriptions_ignore_the_string() {
        // Every clouds-category description yields the same icon for the
        // same percentage; only the percentage matters.
        for description in CLOUDS {
            assert_eq!(classify(description, 5.0).icon, "clear_sky.svg");
            assert_eq!(classify(description, 60.0).icon, "broken_clouds.svg");
            assert_eq!(classify(description, 90.0).icon, "overcast_clouds.svg");
        }
    }

    #[test]
    fn test_unknown_description_degrades_to_default() {
        let classified = classify("raining frogs", 30.0);
        assert_eq!(classified.label, "raining frogs");
        assert_eq!(classified.icon, DEFAULT_ICON);
        assert_eq!(category_of("raining frogs"), ConditionCategory::Unknown);
    }

    #[test]
    fn test_known_categories() {
        assert_eq!(category_of("light rain"), ConditionCategory::Rain);
        assert_eq!(category_of("shower drizzle"), ConditionCategory::Drizzle);
        assert_eq!(category_of("heavy thunderstorm"), ConditionCategory::Thunderstorm);
        assert_eq!(category_of("sleet"), ConditionCategory::Snow);
        assert_eq!(category_of("haze"), ConditionCategory::Mist);
        assert_eq!(category_of("overcast clouds"), ConditionCategory::Clouds);
        assert_eq!(category_of("clear sky"), ConditionCategory::Clear);
    }

    #[test]
    fn test_every_listed_description_has_an_icon() {
        // Clouds resolve by percentage, every other listed description must
        // have a row in the icon table so it never hits the default.
        for list in [MIST_FAMILY, DRIZZLE, RAIN, THUNDERSTORM, SNOW] {
            for description in list {
                assert!(
                    ICON_TABLE.contains_key(description),
                    "missing icon for {description}"
                );
            }
        }
        assert!(ICON_TABLE.contains_key("clear sky"));
    }

    #[test]
    fn test_classify_is_deterministic() {
        let first = classify("light snow", 33.0);
        let second = classify("light snow", 33.0);
        assert_eq!(first, second);
    }
}
