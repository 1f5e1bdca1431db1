// Configuration loading and parsing (pickem.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
const CONFIG_FILE: &str = "pickem.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire pickem.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    database: DatabaseSection,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

/// The assembled application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: "pickem.db".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from a specific file path.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;

    let file: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = Config {
        db_path: file.database.path,
    };
    validate(&config)?;
    Ok(config)
}

/// Convenience wrapper: loads `pickem.toml` from the current working
/// directory, falling back to defaults when the file does not exist so the
/// binary runs out of the box.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = Path::new(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    load_config_from(path)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.db_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Helper: write `content` to a unique temp file and return its path.
    fn temp_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("pickem_{}_{}.toml", name, std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_valid_config() {
        let path = temp_config("valid", "[database]\npath = \"tournaments.db\"\n");

        let config = load_config_from(&path).expect("should load valid config");
        assert_eq!(config.db_path, "tournaments.db");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn default_config_when_file_missing() {
        let config = Config::default();
        assert_eq!(config.db_path, "pickem.db");
    }

    #[test]
    fn file_not_found_for_missing_path() {
        let err = load_config_from(Path::new("/nonexistent/pickem.toml")).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => {
                assert!(path.ends_with("pickem.toml"));
            }
            other => panic!("expected FileNotFound, got: {other}"),
        }
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let path = temp_config("invalid", "this is not valid [[[ toml");

        let err = load_config_from(&path).unwrap_err();
        match &err {
            ConfigError::ParseError { .. } => {}
            other => panic!("expected ParseError, got: {other}"),
        }

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn rejects_empty_database_path() {
        let path = temp_config("empty_path", "[database]\npath = \"\"\n");

        let err = load_config_from(&path).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "database.path");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_file(&path);
    }
}
