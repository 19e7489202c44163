//! Domain models: upstream observations and the display records handed to
//! templates.
//!
//! Display records carry pre-formatted, unit-suffixed strings so templates
//! interpolate them directly. They are serializable so whole pages round-trip
//! through the cache.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One upstream weather sample. Immutable once decoded; every display record
/// is derived from these, never the other way around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// Timestamp in the upstream-reported local representation.
    pub timestamp: NaiveDateTime,
    /// Temperature in the unit the API was queried with.
    pub temp: f64,
    /// Feels-like temperature, same unit as `temp`.
    pub feels_like: f64,
    /// Relative humidity percentage.
    pub humidity: u32,
    /// Atmospheric pressure in hPa.
    pub pressure: u32,
    /// Wind speed in the queried unit (m/s or mph).
    pub wind_speed: f64,
    /// Cloud cover percentage (0-100).
    pub cloud_percent: f64,
    /// Free-text condition description, lower-cased by the API.
    pub description: String,
}

/// Current conditions decoded from the current-weather endpoint, still
/// numeric; formatting into [`CurrentConditions`] happens in `forecast`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentObservation {
    pub city_name: String,
    /// ISO country code.
    pub country: String,
    /// Unix timestamp of the observation.
    pub observed_at: i64,
    /// City offset from UTC in seconds.
    pub timezone_offset_secs: i32,
    pub sunrise: i64,
    pub sunset: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u32,
    pub pressure: u32,
    pub wind_speed: f64,
    /// Visibility in meters.
    pub visibility_m: u32,
    pub cloud_percent: f64,
    pub description: String,
}

/// Current-conditions panel for the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// "CC,City" as reported upstream.
    pub location: String,
    /// "UTC+n" / "UTC-n" offset label.
    pub timezone: String,
    /// Local time at the city, "%I:%M %p".
    pub time: String,
    pub sunrise: String,
    pub sunset: String,
    pub temp: String,
    pub feels: String,
    pub description: String,
    pub icon: String,
    pub humidity: String,
    pub pressure: String,
    pub wind_speed: String,
    pub visibility: String,
    pub cloud: String,
}

/// One of the eight upcoming three-hour slots shown on the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlySlot {
    /// "%I %p" label, e.g. "03 PM".
    pub time: String,
    pub temp: String,
    pub feels: String,
    pub description: String,
    pub icon: String,
}

/// One forecast day, aggregated from its three-hour entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    /// City name used to build the day-detail link.
    pub city: String,
    /// "Today", "Tomorrow", or "{day} {weekday}".
    pub date_label: String,
    /// ISO date for the day-detail route.
    pub link_date: String,
    pub avg_temp: String,
    pub max_temp: String,
    pub min_temp: String,
    /// Mean relative humidity, rounded.
    pub humidity: u32,
    /// Mean pressure in hPa, rounded.
    pub pressure: u32,
    pub wind_speed: String,
    pub description: String,
    pub icon: String,
}

/// One row of the per-day detail table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayDetail {
    /// "%I %p" label for the three-hour slot.
    pub hour: String,
    /// Weekday name of the detailed date.
    pub day: String,
    pub temp: String,
    pub feels: String,
    pub description: String,
    pub icon: String,
    pub humidity: u32,
    pub pressure: u32,
    pub wind_speed: String,
}

/// Everything the home page needs, cacheable as one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageData {
    pub current: CurrentConditions,
    pub hours: Vec<HourlySlot>,
    pub daily: Vec<DailySummary>,
}
