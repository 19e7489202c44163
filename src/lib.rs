//! Skycast - server-rendered weather site backed by the OpenWeatherMap API
//!
//! This library provides the classification and aggregation core (condition
//! taxonomy, cloud-intensity icons, daily summaries, unit suffixes) plus the
//! web layer, upstream client, and page cache around it.

pub mod cache;
pub mod conditions;
pub mod config;
pub mod error;
pub mod forecast;
pub mod models;
pub mod openweather;
pub mod units;
pub mod web;

// Re-export core types for public API
pub use conditions::{Classified, ConditionCategory, classify, cloud_icon};
pub use config::SkycastConfig;
pub use error::SkycastError;
pub use models::{DailySummary, PageData, WeatherObservation};
pub use units::UnitSystem;

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SkycastError>;
