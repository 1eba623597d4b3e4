//! Configuration loading for the PPM service
//!
//! Resolution priority for the config file path:
//! 1. Explicit path (command-line argument)
//! 2. `PPM_CONFIG` environment variable
//! 3. Platform config directory (e.g. `~/.config/ppm/config.toml`)
//! 4. Compiled defaults (no file)
//!
//! Individual fields can additionally be overridden through `PPM_*`
//! environment variables after the file is loaded.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Top-level service configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub engine: EngineConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file path
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_data_dir().join("ppm.db"),
        }
    }
}

/// Analysis engine invocation configuration
///
/// Read once at startup and immutable thereafter. The save toggles are
/// forwarded to the engine as command-line flags; the service does not
/// interpret their effects.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Interpreter executable used to run the engine script
    pub interpreter: PathBuf,
    /// Path to the engine script
    pub script: PathBuf,
    /// Directory the engine writes its output files into
    pub data_catalog: PathBuf,
    /// Ask the engine to save result plots
    pub save_plots: bool,
    /// Ask the engine to save the raw sample dump
    pub save_raw_file: bool,
    /// Ask the engine to save the analysis summary
    pub save_summary_file: bool,
    /// Ask the engine to save its error log
    pub save_error_file: bool,
    /// Hard deadline for one engine invocation, in seconds
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interpreter: PathBuf::from("python3"),
            script: PathBuf::from("ppm_server.py"),
            data_catalog: default_data_dir().join("data"),
            save_plots: false,
            save_raw_file: false,
            save_summary_file: false,
            save_error_file: false,
            timeout_secs: 30,
        }
    }
}

impl EngineConfig {
    /// Invocation deadline as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration following the documented resolution priority
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match resolve_config_path(explicit) {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                let config = toml::from_str(&content).map_err(|e| {
                    Error::Config(format!("Failed to parse {}: {}", path.display(), e))
                })?;
                info!("Configuration loaded from {}", path.display());
                config
            }
            None => {
                info!("No config file found, using compiled defaults");
                AppConfig::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `PPM_*` environment-variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(bind) = std::env::var("PPM_BIND") {
            self.server.bind = bind;
        }
        if let Ok(path) = std::env::var("PPM_DATABASE") {
            self.database.path = PathBuf::from(path);
        }
        if let Ok(interpreter) = std::env::var("PPM_ENGINE_INTERPRETER") {
            self.engine.interpreter = PathBuf::from(interpreter);
        }
        if let Ok(script) = std::env::var("PPM_ENGINE_SCRIPT") {
            self.engine.script = PathBuf::from(script);
        }
        if let Ok(catalog) = std::env::var("PPM_DATA_CATALOG") {
            self.engine.data_catalog = PathBuf::from(catalog);
        }
    }
}

/// Locate the config file, if any
fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var("PPM_CONFIG") {
        return Some(PathBuf::from(path));
    }

    let user_config = dirs::config_dir().map(|d| d.join("ppm").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/ppm/config.toml");
    if system_config.exists() {
        return Some(system_config);
    }

    None
}

/// OS-dependent default data folder
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("ppm"))
        .unwrap_or_else(|| PathBuf::from("./ppm_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind, "127.0.0.1:5000");
        assert_eq!(config.engine.interpreter, PathBuf::from("python3"));
        assert_eq!(config.engine.timeout(), Duration::from_secs(30));
        assert!(!config.engine.save_plots);
    }

    #[test]
    fn parses_full_toml() {
        let content = r#"
            [server]
            bind = "0.0.0.0:8080"

            [database]
            path = "/var/lib/ppm/ppm.db"

            [engine]
            interpreter = "python3"
            script = "/opt/ppm/ppm_server.py"
            data_catalog = "/var/lib/ppm/data"
            save_plots = true
            save_raw_file = true
            save_summary_file = false
            save_error_file = true
            timeout_secs = 60
        "#;

        let config: AppConfig = toml::from_str(content).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.database.path, PathBuf::from("/var/lib/ppm/ppm.db"));
        assert!(config.engine.save_plots);
        assert!(!config.engine.save_summary_file);
        assert_eq!(config.engine.timeout_secs, 60);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let content = r#"
            [engine]
            script = "/opt/ppm/ppm_server.py"
        "#;

        let config: AppConfig = toml::from_str(content).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:5000");
        assert_eq!(config.engine.script, PathBuf::from("/opt/ppm/ppm_server.py"));
        assert_eq!(config.engine.interpreter, PathBuf::from("python3"));
    }

    #[test]
    fn load_reads_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nbind = \"127.0.0.1:9999\"\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9999");
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nbind =").unwrap();

        let result = AppConfig::load(Some(&path));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
