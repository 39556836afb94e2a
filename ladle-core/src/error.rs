//! Error types for LADLE operations

use crate::{EntityId, MealType};
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Recipe source (remote API) errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Recipe source rejected credentials")]
    Unauthorized,

    #[error("Recipe source rate limit exceeded")]
    RateLimited,

    #[error("Recipe source returned server error {0}")]
    ServerError(u16),

    #[error("Network error: {reason}")]
    Network { reason: String },

    #[error("Failed to decode recipe source response: {reason}")]
    Decode { reason: String },
}

impl SourceError {
    /// Map a non-success HTTP status to a source error.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            429 => Self::RateLimited,
            other => Self::ServerError(other),
        }
    }

    /// Returns true for failures a caller might resolve by waiting and retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited | Self::Network { .. } => true,
            Self::ServerError(status) => *status >= 500,
            Self::Unauthorized | Self::Decode { .. } => false,
        }
    }
}

/// Cache errors. These never leave the cache: they are logged and degrade to
/// a miss or a no-op.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache I/O error on {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Cache codec error: {reason}")]
    Codec { reason: String },
}

/// Plan generation and plan mutation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("Meal plan not found: {plan_id}")]
    NotFound { plan_id: EntityId },

    #[error("Generation already running for meal plan {plan_id}")]
    AlreadyRunning { plan_id: EntityId },

    #[error("Recipe selection failed for {meal_type} on {date}: {source}")]
    SlotFailed {
        date: NaiveDate,
        meal_type: MealType,
        source: SourceError,
    },

    #[error("Meal slot not found: {slot_id}")]
    SlotNotFound { slot_id: EntityId },

    #[error("Selection task aborted: {reason}")]
    TaskAborted { reason: String },
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Meal plan not found: {id}")]
    NotFound { id: EntityId },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Duplicate date {date} in meal plan")]
    DuplicateDate { date: NaiveDate },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Master error type for all LADLE errors.
#[derive(Debug, Error)]
pub enum LadleError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for LADLE operations.
pub type LadleResult<T> = Result<T, LadleError>;

// =============================================================================
// TESTS
// =============================================================================
