use crate::error::BreedMatchError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// BreedMatch application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Breed dataset CSV path
    pub dataset_path: PathBuf,

    /// Model artifact bundle directory
    pub models_dir: PathBuf,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,

    /// Number of recommendations returned when the request does not say
    pub default_top_n: usize,

    /// Upper bound on requested recommendations
    pub max_top_n: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("./data/dog_breeds_dataset.csv"),
            models_dir: PathBuf::from("./models"),
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            log_dir: PathBuf::from("./log"),
            log_level: "info".to_string(),
            default_top_n: 5,
            max_top_n: 50,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, BreedMatchError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();
        let config = Self {
            dataset_path: Self::get_env_path("DATASET_PATH").unwrap_or(defaults.dataset_path),
            models_dir: Self::get_env_path("MODELS_DIR").unwrap_or(defaults.models_dir),
            server_host: std::env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: Self::get_env_parsed("SERVER_PORT").unwrap_or(defaults.server_port),
            log_dir: Self::get_env_path("LOG_DIR").unwrap_or(defaults.log_dir),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            default_top_n: Self::get_env_parsed("DEFAULT_TOP_N").unwrap_or(defaults.default_top_n),
            max_top_n: Self::get_env_parsed("MAX_TOP_N").unwrap_or(defaults.max_top_n),
        };

        // Ensure required directories exist
        config.ensure_directories()?;

        Ok(config)
    }

    /// Get PathBuf from environment variable
    fn get_env_path(key: &str) -> Option<PathBuf> {
        std::env::var(key).ok().map(PathBuf::from)
    }

    /// Parse an environment variable, ignoring unparsable values
    fn get_env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
        std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
    }

    /// Ensure required directories exist, create if not
    pub fn ensure_directories(&self) -> Result<(), BreedMatchError> {
        if !self.log_dir.exists() {
            std::fs::create_dir_all(&self.log_dir).map_err(|e| {
                BreedMatchError::config(format!(
                    "Failed to create directory {}: {}",
                    self.log_dir.display(),
                    e
                ))
            })?;
        }

        Ok(())
    }

    /// Get path of a file inside the model bundle directory
    pub fn get_model_path(&self, filename: &str) -> PathBuf {
        self.models_dir.join(filename)
    }

    /// Get log file path
    pub fn get_log_path(&self, filename: &str) -> PathBuf {
        self.log_dir.join(filename)
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Clamp a requested recommendation count into the configured range
    pub fn resolve_top_n(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_top_n).min(self.max_top_n)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), BreedMatchError> {
        if self.dataset_path.as_os_str().is_empty() {
            return Err(BreedMatchError::config("Dataset path cannot be empty"));
        }

        if self.models_dir.as_os_str().is_empty() {
            return Err(BreedMatchError::config("Models directory cannot be empty"));
        }

        // Validate port range
        if self.server_port == 0 {
            return Err(BreedMatchError::config("Server port cannot be 0"));
        }

        if self.default_top_n == 0 {
            return Err(BreedMatchError::config("DEFAULT_TOP_N must be at least 1"));
        }

        if self.default_top_n > self.max_top_n {
            return Err(BreedMatchError::config(format!(
                "DEFAULT_TOP_N ({}) cannot exceed MAX_TOP_N ({})",
                self.default_top_n, self.max_top_n
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.default_top_n, 5);
        assert_eq!(config.get_model_path("scaler.json"), PathBuf::from("./models/scaler.json"));
    }

    #[test]
    fn test_server_bind_address() {
        let config = AppConfig::default();
        assert_eq!(config.server_bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_resolve_top_n() {
        let config = AppConfig::default();
        assert_eq!(config.resolve_top_n(None), 5);
        assert_eq!(config.resolve_top_n(Some(3)), 3);
        assert_eq!(config.resolve_top_n(Some(500)), 50);
    }

    #[test]
    fn test_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid_config = AppConfig::default();
        invalid_config.server_port = 0;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.default_top_n = 80;
        assert!(invalid_config.validate().is_err());
    }
}
