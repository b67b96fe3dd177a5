//! API server configuration.

use std::env;

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Allowed CORS origins. A `*` entry allows any origin without
    /// credentials.
    pub cors_origins: Vec<String>,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Deployment environment (development, production).
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 1024 * 1024,
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("API_HOST").unwrap_or(defaults.host),
            port: env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_size: env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.cors_origins, vec!["*"]);
        assert!(!config.is_production());
    }

    #[test]
    fn test_bind_addr() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
    }
}
