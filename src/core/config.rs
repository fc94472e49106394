use crate::core::errors::ConfigError;
use std::env;
use tracing::Level;

// Deployment defaults for the two external providers. The hosting key is a
// fixed deployment literal, not a per-user secret.
const DEFAULT_HOSTING_UPLOAD_URL: &str = "https://api.imgbb.com/1/upload";
const DEFAULT_HOSTING_API_KEY: &str = "5f1df84c72e6ed2483b54305f83c7440";
const DEFAULT_TRANSFORM_URL: &str = "https://cryyy.itz-ashlynn.workers.dev/img2img";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: Level,
}

/// Image-hosting provider configuration
#[derive(Debug, Clone)]
pub struct HostingConfig {
    pub upload_url: String,
    pub api_key: String,
}

/// Transformation provider configuration
#[derive(Debug, Clone)]
pub struct TransformConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub max_attempts: u32,
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub hosting: HostingConfig,
    pub transform: TransformConfig,
}

impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let config = Self::load_from_env();
        config.validate()?;
        Ok(config)
    }

    fn load_from_env() -> Self {
        let log_level = env::var("LOG_LEVEL")
            .ok()
            .and_then(|s| match s.to_lowercase().as_str() {
                "trace" => Some(Level::TRACE),
                "debug" => Some(Level::DEBUG),
                "info" => Some(Level::INFO),
                "warn" | "warning" => Some(Level::WARN),
                "error" => Some(Level::ERROR),
                _ => None,
            })
            .unwrap_or(Level::INFO);

        Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5000),
                log_level,
            },
            hosting: HostingConfig {
                upload_url: env::var("HOSTING_UPLOAD_URL")
                    .unwrap_or_else(|_| DEFAULT_HOSTING_UPLOAD_URL.to_string()),
                api_key: env::var("HOSTING_API_KEY")
                    .unwrap_or_else(|_| DEFAULT_HOSTING_API_KEY.to_string()),
            },
            transform: TransformConfig {
                endpoint: env::var("TRANSFORM_URL")
                    .unwrap_or_else(|_| DEFAULT_TRANSFORM_URL.to_string()),
                timeout_seconds: env::var("TRANSFORM_TIMEOUT_SECONDS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(20),
                max_attempts: env::var("MAX_RETRY_ATTEMPTS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3),
            },
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.hosting.upload_url.trim().is_empty() {
            return Err(ConfigError::MissingHostingUrl);
        }
        if self.hosting.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.transform.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingTransformUrl);
        }
        if self.transform.timeout_seconds == 0 {
            return Err(ConfigError::InvalidTimeout(self.transform.timeout_seconds));
        }
        if self.transform.max_attempts == 0 {
            return Err(ConfigError::InvalidRetryAttempts(self.transform.max_attempts));
        }
        Ok(())
    }

    pub fn server_host(&self) -> &str {
        &self.server.host
    }

    pub fn server_port(&self) -> u16 {
        self.server.port
    }

    pub fn log_level(&self) -> Level {
        self.server.log_level
    }

    pub fn hosting_upload_url(&self) -> &str {
        &self.hosting.upload_url
    }

    pub fn hosting_api_key(&self) -> &str {
        &self.hosting.api_key
    }

    pub fn transform_url(&self) -> &str {
        &self.transform.endpoint
    }

    pub fn transform_timeout_seconds(&self) -> u64 {
        self.transform.timeout_seconds
    }

    pub fn max_retry_attempts(&self) -> u32 {
        self.transform.max_attempts
    }
}

// Note: No Default implementation because Config::new() can fail
// Users should explicitly call Config::new()? and handle errors

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                log_level: Level::INFO,
            },
            hosting: HostingConfig {
                upload_url: DEFAULT_HOSTING_UPLOAD_URL.to_string(),
                api_key: "key".to_string(),
            },
            transform: TransformConfig {
                endpoint: DEFAULT_TRANSFORM_URL.to_string(),
                timeout_seconds: 20,
                max_attempts: 3,
            },
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = base_config();
        config.transform.timeout_seconds = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout(0))
        ));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let mut config = base_config();
        config.transform.max_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRetryAttempts(0))
        ));
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let mut config = base_config();
        config.hosting.api_key = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::MissingApiKey)));
    }
}
