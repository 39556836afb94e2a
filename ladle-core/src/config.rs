//! Configuration types
//!
//! Configuration is read from a TOML file located via `--config <path>` or
//! the `LADLE_CONFIG` environment variable. Every section has defaults so a
//! partial file is valid; a handful of cache settings can be overridden from
//! the environment afterwards.

use crate::{ConfigError, MealType, DEFAULT_PLAN_DAYS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Memory-tier capacity used when none is configured.
pub const DEFAULT_MEMORY_CAPACITY: usize = 100;

/// Lifetime of cached search results.
pub const SEARCH_RESULTS_TTL: Duration = Duration::from_secs(60 * 60);

/// Lifetime of cached single-recipe details.
pub const RECIPE_DETAIL_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Name of the cache directory under the platform cache root.
pub const CACHE_DIR_NAME: &str = "RecipeCache";

/// How disk-tier file names are derived from cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheFileNaming {
    /// The raw key string. Keys with path separators cannot be persisted.
    #[default]
    Raw,
    /// Lowercase hex SHA-256 of the key.
    Hashed,
}

impl std::str::FromStr for CacheFileNaming {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "hashed" => Ok(Self::Hashed),
            other => Err(ConfigError::InvalidValue {
                field: "cache.file_naming",
                reason: format!("expected 'raw' or 'hashed', got '{}'", other),
            }),
        }
    }
}

/// Two-tier cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSettings {
    /// Disk-tier directory. `None` resolves to the platform cache root.
    pub directory: Option<PathBuf>,
    pub memory_capacity: usize,
    pub search_ttl_secs: u64,
    pub detail_ttl_secs: u64,
    pub file_naming: CacheFileNaming,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            directory: None,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            search_ttl_secs: SEARCH_RESULTS_TTL.as_secs(),
            detail_ttl_secs: RECIPE_DETAIL_TTL.as_secs(),
            file_naming: CacheFileNaming::Raw,
        }
    }
}

impl CacheSettings {
    pub fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.search_ttl_secs)
    }

    pub fn detail_ttl(&self) -> Duration {
        Duration::from_secs(self.detail_ttl_secs)
    }

    /// The directory the disk tier writes to.
    ///
    /// Falls back to `$XDG_CACHE_HOME`, then `$HOME/.cache`, then the
    /// working directory.
    pub fn resolved_directory(&self) -> PathBuf {
        if let Some(dir) = &self.directory {
            return dir.clone();
        }
        let root = std::env::var_os("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))
            .unwrap_or_else(|| PathBuf::from(".ladle-cache"));
        root.join(CACHE_DIR_NAME)
    }
}

/// Plan construction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerSettings {
    pub default_days: u32,
    pub default_meal_types: Vec<MealType>,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            default_days: DEFAULT_PLAN_DAYS,
            default_meal_types: MealType::DEFAULT_DAY.to_vec(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetrySettings {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_filter: "ladle_planner=info,ladle_storage=info,warn".to_string(),
        }
    }
}

/// Master configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LadleConfig {
    pub cache: CacheSettings,
    pub planner: PlannerSettings,
    pub telemetry: TelemetrySettings,
}

impl LadleConfig {
    /// Locate, parse, override and validate the configuration.
    ///
    /// `explicit` is the `--config` argument; without it `LADLE_CONFIG` is
    /// consulted. Returns the default configuration (with environment
    /// overrides) when neither names a file.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = explicit.or_else(config_path_from_env);
        Self::load_from(path.as_deref())
    }

    /// Like [`LadleConfig::load`], with the file path already resolved.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: LadleConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Apply `LADLE_CACHE_DIR`, `LADLE_CACHE_CAPACITY` and
    /// `LADLE_CACHE_FILE_NAMING`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(dir) = std::env::var("LADLE_CACHE_DIR") {
            if !dir.trim().is_empty() {
                self.cache.directory = Some(PathBuf::from(dir));
            }
        }
        if let Ok(capacity) = std::env::var("LADLE_CACHE_CAPACITY") {
            self.cache.memory_capacity =
                capacity
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        field: "cache.memory_capacity",
                        reason: format!("'{}' is not a number", capacity),
                    })?;
        }
        if let Ok(naming) = std::env::var("LADLE_CACHE_FILE_NAMING") {
            self.cache.file_naming = naming.parse()?;
        }
        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - cache.memory_capacity > 0
    /// - cache TTLs > 0
    /// - planner.default_days > 0
    /// - planner.default_meal_types is non-empty and has no duplicates
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.memory_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.memory_capacity",
                reason: "must be > 0".to_string(),
            });
        }
        if self.cache.search_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.search_ttl_secs",
                reason: "must be > 0".to_string(),
            });
        }
        if self.cache.detail_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.detail_ttl_secs",
                reason: "must be > 0".to_string(),
            });
        }
        if let Some(dir) = &self.cache.directory {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "cache.directory",
                    reason: "must not be empty".to_string(),
                });
            }
        }
        if self.planner.default_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "planner.default_days",
                reason: "must be > 0".to_string(),
            });
        }
        if self.planner.default_meal_types.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "planner.default_meal_types",
                reason: "must not be empty".to_string(),
            });
        }
        let mut seen = std::collections::HashSet::new();
        for meal_type in &self.planner.default_meal_types {
            if !seen.insert(meal_type) {
                return Err(ConfigError::InvalidValue {
                    field: "planner.default_meal_types",
                    reason: format!("'{}' listed twice", meal_type),
                });
            }
        }
        if self.telemetry.log_filter.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "telemetry.log_filter",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// The config file named by `LADLE_CONFIG`, if set and non-empty.
pub fn config_path_from_env() -> Option<PathBuf> {
    std::env::var_os("LADLE_CONFIG")
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
