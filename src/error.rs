//! Error types and handling for the Skycast application

use thiserror::Error;

/// Main error type for the Skycast application
#[derive(Error, Debug)]
pub enum SkycastError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream weather API communication errors
    #[error("Upstream error: {message}")]
    Upstream { message: String },

    /// The upstream API does not know the requested city
    #[error("City not found: {city}")]
    CityNotFound { city: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl SkycastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new upstream error
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Message shown to visitors in the page error banner
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SkycastError::Config { .. } => {
                "Configuration error. Please check your API key setup.".to_string()
            }
            SkycastError::Upstream { .. } => "Weather service not responding".to_string(),
            SkycastError::CityNotFound { .. } => "City not found".to_string(),
            SkycastError::Cache { .. } => "Cache operation failed.".to_string(),
            SkycastError::Io { .. } => "File operation failed.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = SkycastError::config("missing API key");
        assert!(matches!(config_err, SkycastError::Config { .. }));

        let upstream_err = SkycastError::upstream("connection failed");
        assert!(matches!(upstream_err, SkycastError::Upstream { .. }));

        let cache_err = SkycastError::cache("pages keyspace unavailable");
        assert!(matches!(cache_err, SkycastError::Cache { .. }));
    }

    #[test]
    fn test_user_messages() {
        let upstream_err = SkycastError::upstream("timeout");
        assert_eq!(upstream_err.user_message(), "Weather service not responding");

        let not_found = SkycastError::CityNotFound {
            city: "Atlantis".to_string(),
        };
        assert_eq!(not_found.user_message(), "City not found");

        let cache_err = SkycastError::cache("failed to decode entry");
        assert_eq!(cache_err.user_message(), "Cache operation failed.");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let skycast_err: SkycastError = io_err.into();
        assert!(matches!(skycast_err, SkycastError::Io { .. }));
    }
}
