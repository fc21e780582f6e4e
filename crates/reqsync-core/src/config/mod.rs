//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Default API origin when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Reqsync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Origin of the requirements-management service
    pub base_url: String,
    /// Per-request timeout for ordinary API calls
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Wall-clock deadline for a document-generation request
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_secs: 30,
            },
            generation: GenerationConfig { timeout_secs: 120 },
        }
    }
}

impl ApiConfig {
    /// Base URL with the `REQSYNC_API_URL` environment override applied
    pub fn resolved_base_url(&self) -> String {
        env::var("REQSYNC_API_URL").unwrap_or_else(|_| self.base_url.clone())
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("REQSYNC_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("reqsync")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            // Return default config without creating file
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(anyhow!("api.base_url must not be empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(anyhow!("api.timeout_secs must be greater than zero"));
        }
        if self.generation.timeout_secs == 0 {
            return Err(anyhow!("generation.timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "api.base_url" => Ok(self.api.resolved_base_url()),
            "api.timeout_secs" => Ok(self.api.timeout_secs.to_string()),
            "generation.timeout_secs" => Ok(self.generation.timeout_secs.to_string()),
            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `reqsync config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "api.base_url" => {
                if value.trim().is_empty() {
                    return Err(anyhow!("api.base_url must not be empty"));
                }
                self.api.base_url = value.trim_end_matches('/').to_string();
            }
            "api.timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
                if secs == 0 {
                    return Err(anyhow!("api.timeout_secs must be greater than zero"));
                }
                self.api.timeout_secs = secs;
            }
            "generation.timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
                if secs == 0 {
                    return Err(anyhow!("generation.timeout_secs must be greater than zero"));
                }
                self.generation.timeout_secs = secs;
            }
            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `reqsync config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = vec!["api.base_url", "api.timeout_secs", "generation.timeout_secs"];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.generation.timeout_secs, 120);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_get_set_round_trip() {
        let mut config = Config::default();

        config.set("api.base_url", "https://reqs.example.com/").unwrap();
        assert_eq!(config.api.base_url, "https://reqs.example.com");

        config.set("api.timeout_secs", "45").unwrap();
        assert_eq!(config.get("api.timeout_secs").unwrap(), "45");

        config.set("generation.timeout_secs", "300").unwrap();
        assert_eq!(config.get("generation.timeout_secs").unwrap(), "300");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut config = Config::default();
        assert!(config.get("nope").is_err());
        assert!(config.set("nope", "1").is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        assert!(config.set("api.timeout_secs", "0").is_err());
        assert!(config.set("api.timeout_secs", "abc").is_err());
        assert!(config.set("generation.timeout_secs", "0").is_err());
        assert!(config.set("api.base_url", "  ").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.set("api.base_url", "http://10.0.0.2:8000").unwrap();
        config.set("generation.timeout_secs", "60").unwrap();

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.api.base_url, "http://10.0.0.2:8000");
        assert_eq!(parsed.generation.timeout_secs, 60);
    }

    #[test]
    fn test_list_covers_every_key() {
        let config = Config::default();
        let items = config.list().unwrap();
        assert_eq!(items.len(), 3);
        assert!(items.iter().any(|(k, _)| k == "api.base_url"));
    }
}
