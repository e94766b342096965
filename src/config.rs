//! Configuration for the arcade and the portfolio service.
//!
//! Loaded from TOML; every field has a default so a partial (or missing)
//! file is fine. `SPACECADE_*` environment variables win over the file.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::input::DEFAULT_KEY_RELEASE_TIMEOUT_MS;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "spacecade.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeConfig {
    pub arcade: ArcadeSettings,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeSettings {
    pub tick_rate_ms: u64,
    pub key_release_timeout_ms: u64,
    /// The TUI owns the terminal, so its log goes here.
    pub log_file: PathBuf,
}

impl Default for ArcadeSettings {
    fn default() -> Self {
        Self {
            tick_rate_ms: 16,
            key_release_timeout_ms: DEFAULT_KEY_RELEASE_TIMEOUT_MS,
            log_file: PathBuf::from("spacecade.log"),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub resume_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            resume_path: PathBuf::from("assets/resume.pdf"),
        }
    }
}

impl ArcadeConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Explicit path, else `spacecade.toml` if present, else defaults; then
    /// environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load_from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SPACECADE_HOST").map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup("SPACECADE_PORT").and_then(|s| s.trim().parse().ok()) {
            self.server.port = port;
        }
        if let Some(resume) = lookup("SPACECADE_RESUME").map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            self.server.resume_path = PathBuf::from(resume);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ArcadeConfig::from_toml("").unwrap();
        assert_eq!(config, ArcadeConfig::default());
        assert_eq!(config.arcade.tick_rate_ms, 16);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = ArcadeConfig::from_toml(
            r#"
            [server]
            port = 8080

            [arcade]
            key_release_timeout_ms = 90
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.arcade.key_release_timeout_ms, 90);
        assert_eq!(config.arcade.tick_rate_ms, 16);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = ArcadeConfig::from_toml("[server\nport = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_explicit_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArcadeConfig::load_from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nresume_path = \"cv.pdf\"").unwrap();
        let config = ArcadeConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.server.resume_path, PathBuf::from("cv.pdf"));
    }

    #[test]
    fn env_overrides_win() {
        let vars: HashMap<&str, &str> = [
            ("SPACECADE_HOST", "0.0.0.0"),
            ("SPACECADE_PORT", "9001"),
            ("SPACECADE_RESUME", "/srv/resume.pdf"),
        ]
        .into_iter()
        .collect();
        let mut config = ArcadeConfig::default();
        config.apply_env_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.resume_path, PathBuf::from("/srv/resume.pdf"));
    }

    #[test]
    fn unparseable_port_override_is_ignored() {
        let mut config = ArcadeConfig::default();
        config.apply_env_overrides(|k| (k == "SPACECADE_PORT").then(|| "http".to_string()));
        assert_eq!(config.server.port, 5000);
    }
}
