//! Analyzer configuration
//!
//! Loaded from `.dtanalyze.yaml` in the working directory (or a path given
//! on the command line). Every field is optional:
//!
//! ```yaml
//! version: 1
//! detect_duplicates: true
//! detect_subsumption: true
//! detect_conflicts: false
//! logging:
//!   level: debug
//!   json: true
//! ```

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE: &str = ".dtanalyze.yaml";

/// Which cross-row checks run, plus logging settings
///
/// Impossible-match detection is always on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzerConfig {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    /// Flag rows with identical conditions
    #[serde(default = "default_true")]
    pub detect_duplicates: bool,

    /// Flag rows whose conditions are strictly narrower than another row's
    #[serde(default = "default_true")]
    pub detect_subsumption: bool,

    /// Flag rows with identical conditions but different actions
    #[serde(default = "default_true")]
    pub detect_conflicts: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_version() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            detect_duplicates: true,
            detect_subsumption: true,
            detect_conflicts: true,
            logging: LoggingConfig::default(),
        }
    }
}

/// Log output settings for the command-line tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `warn` or `dtanalyze=debug`; `RUST_LOG` wins when set
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AnalyzerConfig = serde_norway::from_str(yaml)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", CONFIG_FILE, e)))?;

        if config.version != 1 {
            return Err(Error::Config(format!(
                "Unsupported config version: {}",
                config.version
            )));
        }

        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        Self::from_yaml(&content)
    }

    /// Load `.dtanalyze.yaml` from a directory, if present
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_file = dir.join(CONFIG_FILE);
        if !config_file.exists() {
            return Ok(None);
        }
        Self::load(&config_file).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::from_yaml("{}").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_partial_override() {
        let config = AnalyzerConfig::from_yaml(
            "detect_conflicts: false\nlogging:\n  json: true\n",
        )
        .unwrap();
        assert!(!config.detect_conflicts);
        assert!(config.detect_duplicates);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_unsupported_version() {
        let err = AnalyzerConfig::from_yaml("version: 2").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_from_dir() {
        let dir = TempDir::new().unwrap();
        assert!(AnalyzerConfig::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CONFIG_FILE), "detect_subsumption: false\n").unwrap();
        let config = AnalyzerConfig::load_from_dir(dir.path()).unwrap().unwrap();
        assert!(!config.detect_subsumption);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(AnalyzerConfig::from_yaml("detect_duplicates: [1, 2]").is_err());
    }
}
