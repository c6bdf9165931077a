//! Seekmark configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Base URL of the API serving episode pages
    pub series_api_url: String,
    /// Timeout for series lookups
    pub series_timeout_ms: u64,
    /// Upper bound for one message round trip to a content script
    pub message_timeout_ms: u64,
    /// Attempts made to seek a freshly opened bookmark tab
    pub resume_attempts: u32,
    /// Pause between resume attempts
    pub resume_retry_interval_ms: u64,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("seekmark.db"),
            series_api_url: "http://localhost:5000".to_string(),
            series_timeout_ms: 12_000,
            message_timeout_ms: 5_000,
            resume_attempts: 10,
            resume_retry_interval_ms: 500,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Seekmark"))
            .unwrap_or_else(|| PathBuf::from(".seekmark"))
    }

    /// Read a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;

        tracing::info!(path = %path.display(), "Loaded config");

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.series_api_url()?;

        if self.resume_attempts == 0 {
            return Err(CoreError::Config(
                "resume_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn series_api_url(&self) -> Result<Url> {
        Url::parse(&self.series_api_url)
            .map_err(|e| CoreError::Config(format!("series_api_url: {}", e)))
    }

    pub fn series_timeout(&self) -> Duration {
        Duration::from_millis(self.series_timeout_ms)
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.message_timeout_ms)
    }

    pub fn resume_retry_interval(&self) -> Duration {
        Duration::from_millis(self.resume_retry_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_places_database_in_data_dir() {
        let config = Config::new(PathBuf::from("/tmp/seekmark"));
        assert_eq!(config.database_path, PathBuf::from("/tmp/seekmark/seekmark.db"));
        assert_eq!(config.message_timeout(), Duration::from_secs(5));
        assert!(config.series_api_url().is_ok());
    }

    #[test]
    fn test_default_database_lives_in_data_dir() {
        let data_dir = Config::data_dir();
        match dirs::data_local_dir() {
            Some(base) => assert_eq!(data_dir, base.join("Seekmark")),
            None => assert_eq!(data_dir, PathBuf::from(".seekmark")),
        }
        assert_eq!(Config::default().database_path, data_dir.join("seekmark.db"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("missing.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "series_api_url": "http://localhost:5000/api", "resume_attempts": 3 }"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.resume_attempts, 3);
        assert_eq!(
            config.series_api_url().unwrap().as_str(),
            "http://localhost:5000/api"
        );
        assert_eq!(config.resume_retry_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, r#"{ "series_api_url": "not a url" }"#).unwrap();
        assert!(matches!(Config::load(&path), Err(CoreError::Config(_))));

        std::fs::write(&path, r#"{ "resume_attempts": 0 }"#).unwrap();
        assert!(matches!(Config::load(&path), Err(CoreError::Config(_))));

        std::fs::write(&path, "{").unwrap();
        assert!(matches!(Config::load(&path), Err(CoreError::Serialization(_))));
    }
}
