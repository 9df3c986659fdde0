use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{DEFAULT_BIND, DEFAULT_DELAY_MS, DEFAULT_TIMEOUT_SECONDS, DEFAULT_USER_AGENT};
use crate::error::{IntegrationError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub pipeline: PipelineConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pause between consecutive sources.
    pub delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

impl PipelineConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub metrics_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            metrics_port: None,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| IntegrationError::Config(format!("invalid bind address '{}': {}", self.bind, e)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for daily-rolling JSON logs. Console only when unset.
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file, then apply `FEEDS_*` environment
    /// overrides. A missing default file is fine; a missing explicit file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            IntegrationError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("FEEDS_TIMEOUT_SECONDS") {
            self.fetch.timeout_seconds = parse_env("FEEDS_TIMEOUT_SECONDS", &v)?;
        }
        if let Some(v) = lookup("FEEDS_DELAY_MS") {
            self.pipeline.delay_ms = parse_env("FEEDS_DELAY_MS", &v)?;
        }
        if let Some(v) = lookup("FEEDS_BIND") {
            self.server.bind = v;
        }
        if let Some(v) = lookup("FEEDS_METRICS_PORT") {
            self.server.metrics_port = Some(parse_env("FEEDS_METRICS_PORT", &v)?);
        }
        if let Some(v) = lookup("FEEDS_LOG_DIR") {
            if !v.trim().is_empty() {
                self.logging.dir = Some(PathBuf::from(v));
            }
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| IntegrationError::Config(format!("{key}={value}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.fetch.timeout_seconds, 60);
        assert_eq!(config.pipeline.delay(), Duration::from_secs(1));
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert!(config.server.metrics_port.is_none());
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("[pipeline]\ndelay_ms = 250\n").unwrap();
        assert_eq!(config.pipeline.delay_ms, 250);
        assert_eq!(config.fetch.timeout_seconds, 60);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("FEEDS_TIMEOUT_SECONDS", "15"),
            ("FEEDS_DELAY_MS", "0"),
            ("FEEDS_BIND", "127.0.0.1:9000"),
            ("FEEDS_METRICS_PORT", "9898"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config
            .apply_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.fetch.timeout_seconds, 15);
        assert_eq!(config.pipeline.delay_ms, 0);
        assert_eq!(config.server.bind_addr().unwrap().port(), 9000);
        assert_eq!(config.server.metrics_port, Some(9898));
    }

    #[test]
    fn test_bad_env_value_is_config_error() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(|k| {
            (k == "FEEDS_DELAY_MS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(IntegrationError::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = Config::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(IntegrationError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[fetch]\ntimeout_seconds = 5\n[server]\nbind = \"127.0.0.1:1\"\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.fetch.timeout(), Duration::from_secs(5));
        assert_eq!(config.server.bind, "127.0.0.1:1");
    }
}
