//! Server connection settings

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;

/// Connection settings for the model-storage server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5555/api".into(),
            timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, IntegrationError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            IntegrationError::Serialization(format!(
                "failed to read config '{}': {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&text).map_err(|e| {
            IntegrationError::Serialization(format!(
                "failed to parse config '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: ServerConfig = toml::from_str("base_url = \"https://paint.example/api\"").unwrap();
        assert_eq!(config.base_url, "https://paint.example/api");
        assert_eq!(config.timeout_secs, ServerConfig::default().timeout_secs);
    }
}
