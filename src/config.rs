//! Configuration loading for Lexis.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.lexis/config.toml`)
//! 3. User config (`~/.lexis/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The defaults are the standard SM-2
//! constants and a data directory under the Lexis home.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{DEFAULT_EASE_FACTOR, DEFAULT_EASE_FLOOR};
use crate::error::{LexisError, Result};
use crate::storage::DEFAULT_HISTORY_LIMIT;

/// Main configuration struct for Lexis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Scheduling algorithm constants.
    pub srs: SrsConfig,
    /// Reference store configuration.
    pub storage: StorageConfig,
}

/// Scheduling constants for the SM-2 strategy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SrsConfig {
    /// Lowest ease factor an item can reach.
    pub ease_floor: f64,
    /// Ease factor for items without one.
    pub default_ease: f64,
    /// Interval (days) at which a successful item leaves Learning for Review.
    pub graduation_interval_days: u32,
    /// `interval × ease` above which an item counts as Mastered.
    pub mastery_threshold: f64,
    /// Upper bound on any computed interval.
    pub maximum_interval_days: u32,
}

impl Default for SrsConfig {
    fn default() -> Self {
        Self {
            ease_floor: DEFAULT_EASE_FLOOR,
            default_ease: DEFAULT_EASE_FACTOR,
            graduation_interval_days: 6,
            mastery_threshold: 30.0,
            maximum_interval_days: 36_500,
        }
    }
}

impl SrsConfig {
    /// Check the constants are usable together.
    pub fn validate(&self) -> Result<()> {
        if !self.ease_floor.is_finite() || self.ease_floor <= 0.0 {
            return Err(LexisError::invalid_input(format!(
                "srs.ease_floor must be a positive number, got {}",
                self.ease_floor
            )));
        }
        if !self.default_ease.is_finite() || self.default_ease < self.ease_floor {
            return Err(LexisError::invalid_input(format!(
                "srs.default_ease ({}) must be >= srs.ease_floor ({})",
                self.default_ease, self.ease_floor
            )));
        }
        if !self.mastery_threshold.is_finite() || self.mastery_threshold <= 0.0 {
            return Err(LexisError::invalid_input(format!(
                "srs.mastery_threshold must be a positive number, got {}",
                self.mastery_threshold
            )));
        }
        if self.graduation_interval_days == 0 {
            return Err(LexisError::invalid_input(
                "srs.graduation_interval_days must be >= 1",
            ));
        }
        if self.maximum_interval_days < self.graduation_interval_days {
            return Err(LexisError::invalid_input(format!(
                "srs.maximum_interval_days ({}) must be >= srs.graduation_interval_days ({})",
                self.maximum_interval_days, self.graduation_interval_days
            )));
        }
        Ok(())
    }
}

/// Reference store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the file store. Defaults to `<lexis_home>/items`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Review log entries kept per item.
    pub history_limit: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.lexis/config.toml` in cwd)
    /// 3. User config (`~/.lexis/config.toml`)
    /// 4. Defaults
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.lexis/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = lexis_home()?;
        Self::load_layer(&home.join("config.toml"))
    }

    /// Load project config from `.lexis/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        Self::load_layer(&cwd.join(".lexis").join("config.toml"))
    }

    /// Load one optional layer; a missing file is silent, a broken one warns.
    fn load_layer(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| LexisError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| LexisError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("LEXIS_DATA_DIR") {
            if val.is_empty() {
                tracing::warn!("LEXIS_DATA_DIR is empty, ignoring");
            } else {
                self.storage.data_dir = Some(PathBuf::from(val));
            }
        }

        if let Some(n) = parse_env::<u32>("LEXIS_GRADUATION_DAYS") {
            if n >= 1 {
                self.srs.graduation_interval_days = n;
            } else {
                tracing::warn!(
                    value = n,
                    default = self.srs.graduation_interval_days,
                    "LEXIS_GRADUATION_DAYS must be >= 1, keeping current value"
                );
            }
        }

        if let Some(n) = parse_env::<f64>("LEXIS_MASTERY_THRESHOLD") {
            if n.is_finite() && n > 0.0 {
                self.srs.mastery_threshold = n;
            } else {
                tracing::warn!(
                    value = n,
                    default = self.srs.mastery_threshold,
                    "LEXIS_MASTERY_THRESHOLD must be positive, keeping current value"
                );
            }
        }

        if let Some(n) = parse_env::<u32>("LEXIS_MAX_INTERVAL_DAYS") {
            self.srs.maximum_interval_days = n;
        }

        if let Some(n) = parse_env::<usize>("LEXIS_HISTORY_LIMIT") {
            self.storage.history_limit = n;
        }
    }

    /// Merge another config into this one.
    ///
    /// The `other` config takes precedence field by field: every value in
    /// `other` that differs from the default replaces the value in `self`.
    ///
    /// # Limitation
    ///
    /// A higher layer cannot set a value back to its default once a lower
    /// layer changed it, because "unset" and "explicitly default" look the
    /// same after deserialization.
    fn merge(mut self, other: Config) -> Self {
        let default_srs = SrsConfig::default();
        if other.srs.ease_floor != default_srs.ease_floor {
            self.srs.ease_floor = other.srs.ease_floor;
        }
        if other.srs.default_ease != default_srs.default_ease {
            self.srs.default_ease = other.srs.default_ease;
        }
        if other.srs.graduation_interval_days != default_srs.graduation_interval_days {
            self.srs.graduation_interval_days = other.srs.graduation_interval_days;
        }
        if other.srs.mastery_threshold != default_srs.mastery_threshold {
            self.srs.mastery_threshold = other.srs.mastery_threshold;
        }
        if other.srs.maximum_interval_days != default_srs.maximum_interval_days {
            self.srs.maximum_interval_days = other.srs.maximum_interval_days;
        }

        if other.storage.data_dir.is_some() {
            self.storage.data_dir = other.storage.data_dir;
        }
        if other.storage.history_limit != StorageConfig::default().history_limit {
            self.storage.history_limit = other.storage.history_limit;
        }

        self
    }

    /// Validate the loaded configuration.
    pub fn validate(&self) -> Result<()> {
        self.srs.validate()
    }

    /// Directory for the file store.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.storage.data_dir.clone().or_else(items_dir)
    }
}

/// Parse an environment variable, warning on garbage.
fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let val = env::var(name).ok()?;
    match val.parse::<T>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(variable = name, value = %val, "invalid value, ignoring");
            None
        }
    }
}

/// Get the Lexis home directory.
///
/// Checks `LEXIS_HOME` first, then falls back to `~/.lexis`.
pub fn lexis_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("LEXIS_HOME") {
        if home.is_empty() {
            tracing::warn!("LEXIS_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("LEXIS_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    dirs::home_dir().map(|home| home.join(".lexis"))
}

/// Get the default item directory.
///
/// Returns `<lexis_home>/items/`.
pub fn items_dir() -> Option<PathBuf> {
    lexis_home().map(|h| h.join("items"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!((config.srs.ease_floor - 1.3).abs() < f64::EPSILON);
        assert!((config.srs.default_ease - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.srs.graduation_interval_days, 6);
        assert!((config.srs.mastery_threshold - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.srs.maximum_interval_days, 36_500);

        assert!(config.storage.data_dir.is_none());
        assert_eq!(config.storage.history_limit, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        let toml_content = r#"
[srs]
mastery_threshold = 45.0
graduation_interval_days = 7

[storage]
history_limit = 20
"#;
        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_file(&config_path).unwrap();

        assert!((config.srs.mastery_threshold - 45.0).abs() < f64::EPSILON);
        assert_eq!(config.srs.graduation_interval_days, 7);
        assert_eq!(config.storage.history_limit, 20);
        // Untouched fields keep defaults
        assert!((config.srs.ease_floor - 1.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_from_file_missing() {
        let result = Config::load_from_file(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "this is not valid toml [[[").unwrap();

        let result = Config::load_from_file(&config_path);
        assert!(matches!(result, Err(LexisError::Config { .. })));
    }

    #[test]
    #[serial]
    fn test_project_config_precedence() {
        let home = TempDir::new().unwrap();
        env::set_var("LEXIS_HOME", home.path());

        let dir = TempDir::new().unwrap();
        let lexis_dir = dir.path().join(".lexis");
        fs::create_dir_all(&lexis_dir).unwrap();
        fs::write(
            lexis_dir.join("config.toml"),
            "[srs]\ngraduation_interval_days = 9\n",
        )
        .unwrap();

        let config = Config::load_from_cwd(dir.path());

        assert_eq!(config.srs.graduation_interval_days, 9);
        assert!((config.srs.mastery_threshold - 30.0).abs() < f64::EPSILON);

        env::remove_var("LEXIS_HOME");
    }

    #[test]
    #[serial]
    fn test_user_then_project_layering() {
        let home = TempDir::new().unwrap();
        fs::write(
            home.path().join("config.toml"),
            "[srs]\nmastery_threshold = 50.0\ngraduation_interval_days = 8\n",
        )
        .unwrap();
        env::set_var("LEXIS_HOME", home.path());

        let dir = TempDir::new().unwrap();
        let lexis_dir = dir.path().join(".lexis");
        fs::create_dir_all(&lexis_dir).unwrap();
        fs::write(
            lexis_dir.join("config.toml"),
            "[srs]\ngraduation_interval_days = 10\n",
        )
        .unwrap();

        let config = Config::load_from_cwd(dir.path());

        // Project wins where it speaks, user fills the rest
        assert_eq!(config.srs.graduation_interval_days, 10);
        assert!((config.srs.mastery_threshold - 50.0).abs() < f64::EPSILON);

        env::remove_var("LEXIS_HOME");
    }

    #[test]
    #[serial]
    fn test_env_var_precedence() {
        let home = TempDir::new().unwrap();
        env::set_var("LEXIS_HOME", home.path());

        let dir = TempDir::new().unwrap();
        let lexis_dir = dir.path().join(".lexis");
        fs::create_dir_all(&lexis_dir).unwrap();
        fs::write(
            lexis_dir.join("config.toml"),
            "[srs]\ngraduation_interval_days = 9\n",
        )
        .unwrap();

        env::set_var("LEXIS_GRADUATION_DAYS", "12");

        let config = Config::load_from_cwd(dir.path());
        assert_eq!(config.srs.graduation_interval_days, 12);

        env::remove_var("LEXIS_GRADUATION_DAYS");
        env::remove_var("LEXIS_HOME");
    }

    #[test]
    #[serial]
    fn test_env_var_overrides() {
        env::set_var("LEXIS_DATA_DIR", "/tmp/lexis-items");
        env::set_var("LEXIS_GRADUATION_DAYS", "4");
        env::set_var("LEXIS_MASTERY_THRESHOLD", "60.5");
        env::set_var("LEXIS_MAX_INTERVAL_DAYS", "365");
        env::set_var("LEXIS_HISTORY_LIMIT", "5");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(
            config.storage.data_dir,
            Some(PathBuf::from("/tmp/lexis-items"))
        );
        assert_eq!(config.srs.graduation_interval_days, 4);
        assert!((config.srs.mastery_threshold - 60.5).abs() < f64::EPSILON);
        assert_eq!(config.srs.maximum_interval_days, 365);
        assert_eq!(config.storage.history_limit, 5);

        env::remove_var("LEXIS_DATA_DIR");
        env::remove_var("LEXIS_GRADUATION_DAYS");
        env::remove_var("LEXIS_MASTERY_THRESHOLD");
        env::remove_var("LEXIS_MAX_INTERVAL_DAYS");
        env::remove_var("LEXIS_HISTORY_LIMIT");
    }

    #[test]
    #[serial]
    fn test_env_var_invalid_values_ignored() {
        env::set_var("LEXIS_GRADUATION_DAYS", "0");
        env::set_var("LEXIS_MASTERY_THRESHOLD", "not-a-number");
        env::set_var("LEXIS_HISTORY_LIMIT", "-3");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.srs.graduation_interval_days, 6);
        assert!((config.srs.mastery_threshold - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.storage.history_limit, 100);

        env::remove_var("LEXIS_GRADUATION_DAYS");
        env::remove_var("LEXIS_MASTERY_THRESHOLD");
        env::remove_var("LEXIS_HISTORY_LIMIT");
    }

    #[test]
    fn test_merge_field_by_field() {
        let base = Config {
            srs: SrsConfig {
                mastery_threshold: 40.0,
                ..SrsConfig::default()
            },
            ..Config::default()
        };
        let other = Config {
            srs: SrsConfig {
                graduation_interval_days: 8,
                ..SrsConfig::default()
            },
            storage: StorageConfig {
                data_dir: Some(PathBuf::from("/data")),
                history_limit: 100,
            },
        };

        let merged = base.merge(other);

        assert!((merged.srs.mastery_threshold - 40.0).abs() < f64::EPSILON);
        assert_eq!(merged.srs.graduation_interval_days, 8);
        assert_eq!(merged.storage.data_dir, Some(PathBuf::from("/data")));
    }

    #[test]
    fn test_validate_rejects_inconsistent_constants() {
        let mut srs = SrsConfig {
            ease_floor: 0.0,
            ..SrsConfig::default()
        };
        assert!(srs.validate().is_err());

        srs = SrsConfig {
            default_ease: 1.0,
            ..SrsConfig::default()
        };
        assert!(srs.validate().is_err());

        srs = SrsConfig {
            graduation_interval_days: 0,
            ..SrsConfig::default()
        };
        assert!(srs.validate().is_err());

        srs = SrsConfig {
            maximum_interval_days: 3,
            ..SrsConfig::default()
        };
        assert!(srs.validate().is_err());

        srs = SrsConfig {
            mastery_threshold: f64::NAN,
            ..SrsConfig::default()
        };
        assert!(srs.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_lexis_home_with_env() {
        let dir = TempDir::new().unwrap();
        env::set_var("LEXIS_HOME", dir.path());

        assert_eq!(lexis_home(), Some(dir.path().to_path_buf()));
        assert_eq!(items_dir(), Some(dir.path().join("items")));

        env::remove_var("LEXIS_HOME");
    }

    #[test]
    #[serial]
    fn test_lexis_home_empty_env_falls_back() {
        env::set_var("LEXIS_HOME", "");

        let home = lexis_home();
        if let Some(path) = home {
            assert!(path.ends_with(".lexis"));
        }

        env::remove_var("LEXIS_HOME");
    }

    #[test]
    #[serial]
    fn test_data_dir_prefers_explicit_setting() {
        let config = Config {
            storage: StorageConfig {
                data_dir: Some(PathBuf::from("/explicit")),
                ..StorageConfig::default()
            },
            ..Config::default()
        };
        assert_eq!(config.data_dir(), Some(PathBuf::from("/explicit")));
    }

    #[test]
    fn test_full_toml_roundtrip() {
        let config = Config {
            srs: SrsConfig {
                mastery_threshold: 42.0,
                ..SrsConfig::default()
            },
            storage: StorageConfig {
                data_dir: Some(PathBuf::from("/var/lib/lexis")),
                history_limit: 7,
            },
        };

        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
