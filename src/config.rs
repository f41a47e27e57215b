use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::time::Duration;
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use thiserror::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error {0} when reading config")]
    IoError(#[from] std::io::Error),
    #[error("cannot open config file '{0}' : {1}")]
    OpeningError(PathBuf, std::io::Error),
    #[error("UTF8 format error when reading config")]
    Utf8Error,
    #[error("format error {0} when reading config")]
    FormatError(#[from] serde_yaml::Error),
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub token: Option<String>,
    #[serde(default = "default_timeout_millis")]
    pub timeout_millis: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_millis: default_timeout_millis(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct DashboardConfig {
    /// Quiet period after the last search keystroke before the task list is
    /// refetched, e.g. `300ms`.
    #[serde(
        default = "default_search_debounce",
        deserialize_with = "deserialize_duration"
    )]
    pub search_debounce: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            search_debounce: default_search_debounce(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    pub log: Option<crate::log::Log>,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout_millis() -> u64 {
    10_000
}

fn default_search_debounce() -> Duration {
    Duration::from_millis(300)
}

fn deserialize_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(&s).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_str(s: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(s)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let p = path.as_ref();
        let mut file = File::open(p).map_err(|e| ConfigError::OpeningError(p.to_owned(), e))?;
        let mut contents = vec![];
        file.read_to_end(&mut contents)?;
        let contents = String::from_utf8(contents).map_err(|_| ConfigError::Utf8Error)?;
        let config = Config::from_str(&contents)?;
        Ok(config)
    }

    /// Like [`Config::from_file`], but a missing file yields the defaults.
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

pub mod testdata {
    use super::Config;

    #[allow(dead_code)]
    pub fn test_config() -> Config {
        Config::from_str(
            r#"
        log:
            level: debug
            backend:
                type: File
                path: /tmp/taskboard.log
            structured: false
        api:
            base_url: http://127.0.0.1:5000/api
            token: secret
            timeout_millis: 3000
        dashboard:
            search_debounce: 250ms
        "#,
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogType;

    #[test]
    fn test_full_config() {
        let config = testdata::test_config();
        assert_eq!(config.api.base_url, "http://127.0.0.1:5000/api");
        assert_eq!(config.api.token.as_deref(), Some("secret"));
        assert_eq!(config.api.timeout(), Duration::from_secs(3));
        assert_eq!(config.dashboard.search_debounce, Duration::from_millis(250));
        let log = config.log.unwrap();
        assert_eq!(log.level, "debug");
        assert!(matches!(log.backend, LogType::File { .. }));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_str("api:\n    token: abc\n").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        assert_eq!(config.api.timeout_millis, 10_000);
        assert_eq!(config.dashboard.search_debounce, Duration::from_millis(300));
        assert!(config.log.is_none());
    }

    #[test]
    fn test_bad_duration() {
        assert!(Config::from_str("dashboard:\n    search_debounce: soon\n").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/taskboard.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::OpeningError(_, _)));
        let config = Config::from_file_or_default("/nonexistent/taskboard.yaml").unwrap();
        assert!(config.api.token.is_none());
    }
}
