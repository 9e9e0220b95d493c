//! Configuration management for catchlog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::validate::CatchLimits;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "catchlog";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "catchlog.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `CATCHLOG_`, sections split on `__`)
/// 2. TOML config file at `~/.config/catchlog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Catch form configuration.
    pub catch: CatchConfig,
    /// Display configuration.
    pub display: DisplayConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/catchlog/catchlog.db`
    pub database_path: Option<PathBuf>,
}

/// Catch form configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchConfig {
    /// Species offered by the catch form.
    pub species: Vec<String>,
    /// Heaviest accepted catch, in pounds.
    pub max_weight_lbs: f64,
    /// Longest accepted catch, in inches.
    pub max_length_in: f64,
}

/// Display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// `strftime` pattern used for trip dates.
    pub date_format: String,
}

impl Default for CatchConfig {
    fn default() -> Self {
        let limits = CatchLimits::default();
        Self {
            species: default_species(),
            max_weight_lbs: limits.max_weight,
            max_length_in: limits.max_length,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: "%B %-d, %Y".to_string(),
        }
    }
}

/// Species offered when no list is configured.
fn default_species() -> Vec<String> {
    vec![
        "Yellowfin".to_string(),
        "Bluefin".to_string(),
        "Salmon".to_string(),
        "Halibut".to_string(),
    ]
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("CATCHLOG_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.catch.species.is_empty() {
            return Err(Error::ConfigValidation {
                message: "catch.species must list at least one species".to_string(),
            });
        }

        if self.catch.species.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::ConfigValidation {
                message: "catch.species cannot contain blank entries".to_string(),
            });
        }

        for (name, value) in [
            ("max_weight_lbs", self.catch.max_weight_lbs),
            ("max_length_in", self.catch.max_length_in),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::ConfigValidation {
                    message: format!("catch.{name} must be a positive number, got {value}"),
                });
            }
        }

        if StrftimeItems::new(&self.display.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::ConfigValidation {
                message: format!("invalid date format: {}", self.display.date_format),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Bounds applied by the catch validator.
    #[must_use]
    pub fn catch_limits(&self) -> CatchLimits {
        CatchLimits {
            max_weight: self.catch.max_weight_lbs,
            max_length: self.catch.max_length_in,
        }
    }

    /// Whether `species` is one of the configured species (case-insensitive).
    #[must_use]
    pub fn is_known_species(&self, species: &str) -> bool {
        let species = species.trim();
        self.catch
            .species
            .iter()
            .any(|known| known.eq_ignore_ascii_case(species))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert_eq!(config.catch.species.len(), 4);
        assert!((config.catch.max_weight_lbs - 1000.0).abs() < f64::EPSILON);
        assert!((config.catch.max_length_in - 500.0).abs() < f64::EPSILON);
        assert_eq!(config.display.date_format, "%B %-d, %Y");
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_species() {
        let mut config = Config::default();
        config.catch.species.clear();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("at least one species"));
    }

    #[test]
    fn test_validate_blank_species() {
        let mut config = Config::default();
        config.catch.species.push("  ".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("blank"));
    }

    #[test]
    fn test_validate_non_positive_bounds() {
        let mut config = Config::default();
        config.catch.max_weight_lbs = 0.0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_weight_lbs"));

        let mut config = Config::default();
        config.catch.max_length_in = f64::NAN;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_length_in"));
    }

    #[test]
    fn test_validate_invalid_date_format() {
        let mut config = Config::default();
        config.display.date_format = "%Q".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("invalid date format"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config.database_path().to_string_lossy().contains("catchlog.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/trips.db"));

        assert_eq!(config.database_path(), PathBuf::from("/custom/path/trips.db"));
    }

    #[test]
    fn test_catch_limits_follow_config() {
        let mut config = Config::default();
        config.catch.max_weight_lbs = 250.0;

        let limits = config.catch_limits();
        assert!((limits.max_weight - 250.0).abs() < f64::EPSILON);
        assert!((limits.max_length - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_is_known_species() {
        let config = Config::default();
        assert!(config.is_known_species("Halibut"));
        assert!(config.is_known_species(" salmon "));
        assert!(!config.is_known_species("Tuna"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("catchlog"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!("catchlog_config_{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[catch]\nspecies = [\"Cod\", \"Tuna\"]\nmax_weight_lbs = 300.0\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(config.catch.species, vec!["Cod".to_string(), "Tuna".to_string()]);
        assert!((config.catch.max_weight_lbs - 300.0).abs() < f64::EPSILON);
        assert!((config.catch.max_length_in - 500.0).abs() < f64::EPSILON);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_catch_config_deserialize() {
        let json = r#"{"species": ["Cod"]}"#;
        let catch: CatchConfig = serde_json::from_str(json).unwrap();
        assert_eq!(catch.species, vec!["Cod".to_string()]);
        assert!((catch.max_length_in - 500.0).abs() < f64::EPSILON);
    }
}
