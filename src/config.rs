//! Configuration management for the Skycast application
//!
//! Settings come from environment variables (a `.env` file is loaded at
//! startup), with defaults for everything except the OpenWeatherMap API key.

use std::env;

use anyhow::{Context, Result};

use crate::SkycastError;

fn default_port() -> u16 {
    8080
}

fn default_cache_dir() -> String {
    ".skycast-cache".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    600
}

fn default_city() -> String {
    "London".to_string()
}

/// Runtime configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct SkycastConfig {
    /// OpenWeatherMap API key.
    pub api_key: String,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Directory for the persistent page cache.
    pub cache_dir: String,
    /// How long cached pages stay fresh.
    pub cache_ttl_secs: u64,
    /// City used when GeoIP detection fails.
    pub default_city: String,
}

impl SkycastConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENWEATHER_API_KEY")
            .context("Missing OPENWEATHER_API_KEY env var")?;

        let port = match env::var("SKYCAST_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("SKYCAST_PORT is not a valid port: {raw}"))?,
            Err(_) => default_port(),
        };

        let cache_ttl_secs = match env::var("SKYCAST_CACHE_TTL_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("SKYCAST_CACHE_TTL_SECS is not a number: {raw}"))?,
            Err(_) => default_cache_ttl_secs(),
        };

        let config = Self {
            api_key,
            port,
            cache_dir: env::var("SKYCAST_CACHE_DIR").unwrap_or_else(|_| default_cache_dir()),
            cache_ttl_secs,
            default_city: env::var("SKYCAST_DEFAULT_CITY").unwrap_or_else(|_| default_city()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(SkycastError::config(
                "OpenWeatherMap API key cannot be empty. Please check OPENWEATHER_API_KEY.",
            )
            .into());
        }

        if self.cache_ttl_secs == 0 {
            return Err(SkycastError::config("Cache TTL must be at least 1 second").into());
        }

        if self.default_city.trim().is_empty() {
            return Err(SkycastError::config("Default city cannot be empty").into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SkycastConfig {
        SkycastConfig {
            api_key: "test-key".to_string(),
            port: default_port(),
            cache_dir: default_cache_dir(),
            cache_ttl_secs: default_cache_ttl_secs(),
            default_city: default_city(),
        }
    }

    #[test]
    fn test_defaults_are_sane() {
        let config = valid_config();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cache_ttl_secs, 600);
        assert_eq!(config.default_city, "London");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        let mut config = valid_config();
        config.api_key = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let mut config = valid_config();
        config.cache_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_default_city_is_rejected() {
        let mut config = valid_config();
        config.default_city = "   ".to_string();
        assert!(config.validate().is_err());
    }
}
