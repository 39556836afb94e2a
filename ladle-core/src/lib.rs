//! LADLE Core - Entity Types
//!
//! Data structures shared by every LADLE crate: recipes, meal plans,
//! shopping lists, preferences, request fingerprints, the recipe source
//! boundary, the error taxonomy and configuration. No I/O lives here apart
//! from reading the config file.

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod plan;
pub mod preferences;
pub mod recipe;
pub mod shopping;
pub mod source;

pub use config::{
    CacheFileNaming, CacheSettings, LadleConfig, PlannerSettings, TelemetrySettings,
    CACHE_DIR_NAME, DEFAULT_MEMORY_CAPACITY, RECIPE_DETAIL_TTL, SEARCH_RESULTS_TTL,
};
pub use error::{
    CacheError, ConfigError, LadleError, LadleResult, PlanError, SourceError, StorageError,
    ValidationError,
};
pub use fingerprint::{Fingerprint, DEFAULT_SEARCH_NUMBER};
pub use plan::{MealPlan, MealSlot, MealType, PlanDay, SlotPosition, DEFAULT_PLAN_DAYS};
pub use preferences::{DietaryRestriction, NutritionalGoals, UserPreferences};
pub use recipe::{Ingredient, IngredientId, IngredientQuantity, Recipe, RecipeId, SearchResults};
pub use shopping::{ShoppingItem, ShoppingList};
pub use source::RecipeSource;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Local entity identifier using UUIDv7 for timestamp-sortable IDs.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}

// ============================================================================
// TESTS
// ============================================================================
