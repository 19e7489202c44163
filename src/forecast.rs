//! Forecast transformation: day-grouping, daily aggregation, and the hourly
//! and per-day display records.
//!
//! Everything here is a pure function over already-fetched observations;
//! identical inputs always produce identical records, which is what makes
//! caching whole pages by `{city}_{unit}` key safe.

use chrono::{Datelike, Duration, NaiveDate};

use crate::conditions::classify;
use crate::models::{
    CurrentConditions, CurrentObservation, DailySummary, DayDetail, HourlySlot, WeatherObservation,
};
use crate::openweather::local_time_label;
use crate::units::UnitSystem;

/// Number of three-hour slots shown on the home page.
const HOURLY_SLOTS: usize = 8;

/// Group observations by calendar date, preserving the order in which dates
/// first appear in the payload (the API returns entries chronologically, so
/// this keeps days in forecast order).
pub fn group_by_date(
    observations: &[WeatherObservation],
) -> Vec<(NaiveDate, Vec<&WeatherObservation>)> {
    let mut groups: Vec<(NaiveDate, Vec<&WeatherObservation>)> = Vec::new();
    for observation in observations {
        let date = observation.timestamp.date();
        match groups.iter_mut().find(|(d, _)| *d == date) {
            Some((_, entries)) => entries.push(observation),
            None => groups.push((date, vec![observation])),
        }
    }
    groups
}

/// Most frequent description among the entries. Ties go to the description
/// that appears first in entry order (stable mode).
fn dominant_description<'a>(entries: &[&'a WeatherObservation]) -> &'a str {
    let mut counted: Vec<(&str, usize)> = Vec::new();
    for entry in entries {
        match counted.iter_mut().find(|(d, _)| *d == entry.description) {
            Some((_, count)) => *count += 1,
            None => counted.push((entry.description.as_str(), 1)),
        }
    }
    // Strictly-greater scan over first-encountered order, so ties keep the
    // earliest description.
    let mut best: (&str, usize) = ("", 0);
    for (description, count) in counted {
        if count > best.1 {
            best = (description, count);
        }
    }
    best.0
}

/// Human-readable label for a forecast date: "Today", "Tomorrow", or
/// "{day-of-month} {weekday}" with no leading zero ("5 Tuesday").
pub fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if date == today + Duration::days(1) {
        "Tomorrow".to_string()
    } else {
        format!("{} {}", date.day(), date.format("%A"))
    }
}

/// Aggregate one day-group into its summary record.
///
/// Returns `None` for an empty group; grouping real observations never
/// produces one. The average temperature is the rounded mean of the raw
/// sub-daily temperatures, rounded independently from max and min.
pub fn aggregate(
    city: &str,
    date: NaiveDate,
    entries: &[&WeatherObservation],
    units: UnitSystem,
    today: NaiveDate,
) -> Option<DailySummary> {
    if entries.is_empty() {
        return None;
    }
    let count = entries.len() as f64;
    let temp_suffix = units.temp_suffix();

    let temp_sum: f64 = entries.iter().map(|e| e.temp).sum();
    let temp_max = entries.iter().map(|e| e.temp).fold(f64::MIN, f64::max);
    let temp_min = entries.iter().map(|e| e.temp).fold(f64::MAX, f64::min);

    let humidity: f64 = entries.iter().map(|e| f64::from(e.humidity)).sum::<f64>() / count;
    let pressure: f64 = entries.iter().map(|e| f64::from(e.pressure)).sum::<f64>() / count;
    let wind: f64 = entries.iter().map(|e| e.wind_speed).sum::<f64>() / count;

    // The mean cloud cover stays unrounded here: icon bands are resolved on
    // the real number, and any displayed percentage is rounded separately.
    let cloud: f64 = entries.iter().map(|e| e.cloud_percent).sum::<f64>() / count;

    let dominant = dominant_description(entries);
    let classified = classify(dominant, cloud);

    Some(DailySummary {
        city: city.to_string(),
        date_label: date_label(date, today),
        link_date: date.format("%Y-%m-%d").to_string(),
        avg_temp: format!("{}{}", (temp_sum / count).round() as i64, temp_suffix),
        max_temp: format!("{}{}", temp_max.round() as i64, temp_suffix),
        min_temp: format!("{}{}", temp_min.round() as i64, temp_suffix),
        humidity: humidity.round() as u32,
        pressure: pressure.round() as u32,
        wind_speed: format!("{:.1}{}", wind, units.wind_suffix()),
        description: classified.label,
        icon: classified.icon,
    })
}

/// Format the current-conditions observation into its display record.
pub fn current_conditions(
    observation: &CurrentObservation,
    units: UnitSystem,
) -> CurrentConditions {
    let temp_suffix = units.temp_suffix();
    let offset = observation.timezone_offset_secs;

    let zone_hours = f64::from(offset) / 3600.0;
    let timezone = if zone_hours >= 0.0 {
        format!("UTC+{zone_hours:.0}")
    } else {
        format!("UTC{zone_hours:.0}")
    };

    let classified = classify(&observation.description, observation.cloud_percent);

    CurrentConditions {
        location: format!("{},{}", observation.country, observation.city_name),
        timezone,
        time: local_time_label(observation.observed_at, offset, "%I:%M %p"),
        sunrise: local_time_label(observation.sunrise, offset, "%I:%M %p"),
        sunset: local_time_label(observation.sunset, offset, "%I:%M %p"),
        temp: format!("{}{}", observation.temp.round() as i64, temp_suffix),
        feels: format!("{}{}", observation.feels_like.round() as i64, temp_suffix),
        description: classified.label,
        icon: classified.icon,
        humidity: format!("{}%", observation.humidity),
        pressure: format!("{}hPa", observation.pressure),
        wind_speed: format!("{}{}", observation.wind_speed, units.wind_suffix()),
        visibility: format!(
            "{}km",
            (f64::from(observation.visibility_m) / 1000.0).round() as i64
        ),
        cloud: format!("{}%", observation.cloud_percent.round() as i64),
    }
}

/// The first eight three-hour slots of the forecast, as display records.
pub fn hourly_slots(observations: &[WeatherObservation], units: UnitSystem) -> Vec<HourlySlot> {
    let temp_suffix = units.temp_suffix();
    observations
        .iter()
        .take(HOURLY_SLOTS)
        .map(|observation| {
            let classified = classify(&observation.description, observation.cloud_percent);
            HourlySlot {
                time: observation.timestamp.format("%I %p").to_string(),
                temp: format!("{}{}", observation.temp.round() as i64, temp_suffix),
                feels: format!("{}{}", observation.feels_like.round() as i64, temp_suffix),
                description: classified.label,
                icon: classified.icon,
            }
        })
        .collect()
}

/// Every three-hour entry of one calendar date, as detail-table rows.
pub fn day_details(
    observations: &[WeatherObservation],
    date: NaiveDate,
    units: UnitSystem,
) -> Vec<DayDetail> {
    let temp_suffix = units.temp_suffix();
    observations
        .iter()
        .filter(|observation| observation.timestamp.date() == date)
        .map(|observation| {
            let classified = classify(&observation.description, observation.cloud_percent);
            DayDetail {
                hour: observation.timestamp.format("%I %p").to_string(),
                day: observation.timestamp.format("%A").to_string(),
                temp: format!("{}{}", observation.temp.round() as i64, temp_suffix),
                feels: format!("{}{}", observation.feels_like.round() as i64, temp_suffix),
                description: classified.label,
                icon: classified.icon,
                humidity: observation.humidity,
                pressure: observation.pressure,
                wind_speed: format!("{}{}", observation.wind_speed, units.wind_suffix()),
            }
        })
        .collect()
}
