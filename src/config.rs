use chrono::Duration;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::predict::{GroundObserver, PredictError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid duration {value:?}: {message}")]
    Duration { value: String, message: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub station: StationConfig,
    #[serde(default)]
    pub predict: PredictConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    /// `"lat, lng"` in degrees
    pub coordinates: String,
    #[serde(default)]
    pub altitude_km: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictConfig {
    pub tle_folder: Option<PathBuf>,
    #[serde(default = "default_step")]
    pub step: String,
    #[serde(default = "default_min_pass_duration")]
    pub min_pass_duration: String,
    #[serde(default = "default_window")]
    pub window: String,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            tle_folder: None,
            step: default_step(),
            min_pass_duration: default_min_pass_duration(),
            window: default_window(),
        }
    }
}

fn default_step() -> String {
    "30s".to_string()
}

fn default_min_pass_duration() -> String {
    "60s".to_string()
}

fn default_window() -> String {
    "24h".to_string()
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn observer(&self) -> Result<GroundObserver, PredictError> {
        GroundObserver::from_coordinates(&self.station.coordinates, Some(self.station.altitude_km))
    }
}

impl PredictConfig {
    pub fn step(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.step)
    }

    pub fn min_pass_duration(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.min_pass_duration)
    }

    pub fn window(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.window)
    }
}

/// Human duration such as `"30s"`, `"1h 30m"` or `"2days"`.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let err = |message: String| ConfigError::Duration {
        value: s.to_string(),
        message,
    };
    humantime::parse_duration(s.trim())
        .map_err(|e| err(e.to_string()))
        .and_then(|d| Duration::from_std(d).map_err(|e| err(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_predict_section() {
        let config = Config::from_yaml("station:\n  coordinates: \"52.5, 13.4\"\n").unwrap();
        assert_eq!(config.station.altitude_km, 0.0);
        assert!(config.predict.tle_folder.is_none());
        assert_eq!(config.predict.step().unwrap(), Duration::seconds(30));
        assert_eq!(config.predict.min_pass_duration().unwrap(), Duration::seconds(60));
        assert_eq!(config.predict.window().unwrap(), Duration::hours(24));

        let observer = config.observer().unwrap();
        assert_eq!(observer.latitude_deg(), 52.5);
    }

    #[test]
    fn full_config() {
        let yaml = r#"
station:
  name: Rooftop
  coordinates: "-33.9, 151.2"
  altitude_km: 0.05
predict:
  tle_folder: /var/lib/tle
  step: 10s
  min_pass_duration: 2m
  window: 3days
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.station.name.as_deref(), Some("Rooftop"));
        assert_eq!(config.predict.tle_folder, Some(PathBuf::from("/var/lib/tle")));
        assert_eq!(config.predict.step().unwrap(), Duration::seconds(10));
        assert_eq!(config.predict.min_pass_duration().unwrap(), Duration::minutes(2));
        assert_eq!(config.predict.window().unwrap(), Duration::days(3));
    }

    #[test]
    fn bad_values_are_reported() {
        let config =
            Config::from_yaml("station:\n  coordinates: \"95, 0\"\npredict:\n  step: soon\n")
                .unwrap();
        assert!(matches!(config.observer(), Err(PredictError::InvalidObserver(_))));
        assert!(matches!(config.predict.step(), Err(ConfigError::Duration { .. })));
        assert!(Config::from_yaml("predict: {}\n").is_err());
    }
}
