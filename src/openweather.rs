//! OpenWeatherMap API client.
//!
//! Single best-effort calls with a fixed timeout; no retries. HTTP 404 from
//! the current-weather endpoint means the city is unknown, every other
//! failure surfaces as an upstream error. Also hosts the GeoIP lookup used
//! to pick a city for first-time visitors.

use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, NaiveDateTime};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::Result;
use crate::error::SkycastError;
use crate::models::{CurrentObservation, WeatherObservation};
use crate::units::UnitSystem;

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const GEOIP_URL: &str = "http://ip-api.com/json/";

/// Upstream fetch timeout. One best-effort call; failures degrade to the
/// last-good snapshot at the web layer.
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
const GEOIP_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| SkycastError::upstream(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { api_key, http })
    }

    /// Current conditions for a city.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn fetch_current(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<CurrentObservation> {
        let url = format!("{BASE_URL}/weather");
        let response = self
            .http
            .get(url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", units.as_query()),
            ])
            .send()
            .await
            .map_err(|e| SkycastError::upstream(format!("current-weather request failed: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SkycastError::CityNotFound {
                city: city.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(SkycastError::upstream(format!(
                "current-weather request returned status {}",
                response.status()
            )));
        }

        let parsed: dto::CurrentResponse = response
            .json()
            .await
            .map_err(|e| SkycastError::upstream(format!("invalid current-weather JSON: {e}")))?;

        Ok(parsed.into_observation())
    }

    /// Five-day forecast in three-hour steps.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn fetch_forecast(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<dto::ForecastResponse> {
        let url = format!("{BASE_URL}/forecast");
        let response = self
            .http
            .get(url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", units.as_query()),
            ])
            .send()
            .await
            .map_err(|e| SkycastError::upstream(format!("forecast request failed: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SkycastError::CityNotFound {
                city: city.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(SkycastError::upstream(format!(
                "forecast request returned status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SkycastError::upstream(format!("invalid forecast JSON: {e}")))
    }

    /// Best-effort GeoIP city detection for visitors who haven't searched
    /// yet. `None` on any failure; the caller falls back to the configured
    /// default city.
    pub async fn detect_city(&self) -> Option<String> {
        let result = async {
            let response = self
                .http
                .get(GEOIP_URL)
                .timeout(GEOIP_TIMEOUT)
                .send()
                .await
                .context("GeoIP request failed")?;
            let parsed: dto::GeoIpResponse =
                response.json().await.context("invalid GeoIP JSON")?;
            anyhow::Ok(parsed.city)
        }
        .await;

        match result {
            Ok(Some(city)) => {
                debug!("GeoIP resolved visitor city: {city}");
                Some(city)
            }
            Ok(None) => None,
            Err(e) => {
                debug!("GeoIP lookup failed: {e:#}");
                None
            }
        }
    }
}

/// OpenWeatherMap 2.5 response structures and conversions.
pub mod dto {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Deserialize)]
    pub struct CurrentResponse {
        pub name: String,
        pub dt: i64,
        /// Offset from UTC in seconds.
        pub timezone: i32,
        pub sys: SysBlock,
        pub main: MainBlock,
        pub wind: WindBlock,
        pub clouds: CloudsBlock,
        pub weather: Vec<WeatherBlock>,
        /// Meters; the API omits it in rare cases.
        #[serde(default = "default_visibility")]
        pub visibility: u32,
    }

    fn default_visibility() -> u32 {
        10_000
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct SysBlock {
        pub country: String,
        pub sunrise: i64,
        pub sunset: i64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MainBlock {
        pub temp: f64,
        pub feels_like: f64,
        pub humidity: u32,
        pub pressure: u32,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct WindBlock {
        pub speed: f64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct CloudsBlock {
        pub all: f64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct WeatherBlock {
        pub description: String,
    }

    /// Forecast payloads are cached whole for the day-detail route, hence
    /// `Serialize` on the forecast types.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ForecastResponse {
        pub city: CityBlock,
        pub list: Vec<ForecastEntry>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct CityBlock {
        pub name: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ForecastEntry {
        /// City-local timestamp, "YYYY-MM-DD HH:MM:SS".
        pub dt_txt: String,
        pub main: MainBlock,
        pub wind: WindBlock,
        pub clouds: CloudsBlock,
        pub weather: Vec<WeatherBlock>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeoIpResponse {
        pub city: Option<String>,
    }

    impl CurrentResponse {
        pub fn into_observation(self) -> CurrentObservation {
            let description = self
                .weather
                .first()
                .map(|w| w.description.clone())
                .unwrap_or_default();
            CurrentObservation {
                city_name: self.name,
                country: self.sys.country,
                observed_at: self.dt,
                timezone_offset_secs: self.timezone,
                sunrise: self.sys.sunrise,
                sunset: self.sys.sunset,
                temp: self.main.temp,
                feels_like: self.main.feels_like,
                humidity: self.main.humidity,
                pressure: self.main.pressure,
                wind_speed: self.wind.speed,
                visibility_m: self.visibility,
                cloud_percent: self.clouds.all,
                description,
            }
        }
    }

    impl ForecastResponse {
        /// Decode the three-hour entries into observations. Entries with a
        /// malformed timestamp or an empty weather block are skipped rather
        /// than failing the whole page.
        pub fn observations(&self) -> Vec<WeatherObservation> {
            self.list
                .iter()
                .filter_map(|entry| {
                    let timestamp =
                        NaiveDateTime::parse_from_str(&entry.dt_txt, "%Y-%m-%d %H:%M:%S")
                            .map_err(|e| {
                                warn!("skipping forecast entry with bad dt_txt {:?}: {e}", entry.dt_txt);
                            })
                            .ok()?;
                    let description = entry.weather.first()?.description.clone();
                    Some(WeatherObservation {
                        timestamp,
                        temp: entry.main.temp,
                        feels_like: entry.main.feels_like,
                        humidity: entry.main.humidity,
                        pressure: entry.main.pressure,
                        wind_speed: entry.wind.speed,
                        cloud_percent: entry.clouds.all,
                        description,
                    })
                })
                .collect()
        }
    }
}

/// Format a unix timestamp shifted into the city's own UTC offset.
pub fn local_time_label(unix_secs: i64, offset_secs: i32, format: &str) -> String {
    DateTime::from_timestamp(unix_secs + i64::from(offset_secs), 0)
        .map(|dt| dt.naive_utc().format(format).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORECAST_JSON: &str = r#"{
        "city": {"name": "London"},
        "list": [
            {
                "dt_txt": "2024-06-10 12:00:00",
                "main": {"temp": 18.3, "feels_like": 17.9, "humidity": 60, "pressure": 1012},
                "wind": {"speed": 3.6},
                "clouds": {"all": 40},
                "weather": [{"description": "scattered clouds"}]
            },
            {
                "dt_txt": "not a timestamp",
                "main": {"temp": 18.3, "feels_like": 17.9, "humidity": 60, "pressure": 1012},
                "wind": {"speed": 3.6},
                "clouds": {"all": 40},
                "weather": [{"description": "scattered clouds"}]
            }
        ]
    }"#;

    #[test]
    fn test_forecast_decoding_skips_bad_entries() {
        let parsed: dto::ForecastResponse =
            serde_json::from_str(FORECAST_JSON).expect("valid JSON");
        let observations = parsed.observations();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].description, "scattered clouds");
        assert_eq!(observations[0].humidity, 60);
    }

    #[test]
    fn test_current_response_conversion() {
        let json = r#"{
            "name": "London",
            "dt": 1718020800,
            "timezone": 3600,
            "sys": {"country": "GB", "sunrise": 1717990000, "sunset": 1718049000},
            "main": {"temp": 17.6, "feels_like": 17.1, "humidity": 62, "pressure": 1014},
            "wind": {"speed": 4.1},
            "clouds": {"all": 75},
            "weather": [{"description": "broken clouds"}],
            "visibility": 10000
        }"#;
        let parsed: dto::CurrentResponse = serde_json::from_str(json).expect("valid JSON");
        let observation = parsed.into_observation();
        assert_eq!(observation.city_name, "London");
        assert_eq!(observation.country, "GB");
        assert_eq!(observation.timezone_offset_secs, 3600);
        assert_eq!(observation.description, "broken clouds");
    }

    #[test]
    fn test_local_time_label() {
        // 2024-06-10 12:00:00 UTC, shifted one hour east.
        assert_eq!(local_time_label(1718020800, 3600, "%I:%M %p"), "01:00 PM");
        assert_eq!(local_time_label(1718020800, 0, "%I %p"), "12 PM");
    }
}
