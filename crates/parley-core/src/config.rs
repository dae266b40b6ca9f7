use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

/// Backend used when neither the command line nor the config file names one
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5328/api/chatbot";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub endpoint: Option<String>,
    pub storage_path: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {:?}: {}", config_path, e))?;
        Ok(config)
    }

    #[cfg(test)]
    fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Command-line value wins, then the config file, then the default
    pub fn resolve_endpoint(&self, cli_endpoint: Option<&str>) -> String {
        cli_endpoint
            .or(self.endpoint.as_deref())
            .unwrap_or(DEFAULT_ENDPOINT)
            .to_string()
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("parley").join("config.json"))
    }

    /// `<data_dir>/parley/parley.log`
    pub fn get_log_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;

        Ok(data_dir.join("parley").join("parley.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.resolve_endpoint(None), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("parley").join("config.json");
        let config = Config {
            endpoint: Some("http://example.test/api/chatbot".to_string()),
            storage_path: Some(PathBuf::from("/tmp/storage.json")),
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_endpoint_precedence() {
        let config = Config {
            endpoint: Some("http://from-file".to_string()),
            storage_path: None,
        };
        assert_eq!(config.resolve_endpoint(Some("http://from-cli")), "http://from-cli");
        assert_eq!(config.resolve_endpoint(None), "http://from-file");
    }

    #[test]
    fn test_log_path_is_under_data_dir() {
        if let Some(data_dir) = dirs::data_dir() {
            assert_eq!(Config::get_log_path().unwrap(), data_dir.join("parley").join("parley.log"));
        }
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ endpoint: ").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
