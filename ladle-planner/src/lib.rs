//! LADLE Planner - Recipe Sources, Plan Generation and Shopping Lists
//!
//! Wires the recipe source boundary to the cache, fills meal plans
//! concurrently, and turns finished plans into shopping lists.

pub mod aggregator;
pub mod generator;
pub mod source;
pub mod telemetry;

pub use aggregator::{aggregate, aggregate_quantities};
pub use generator::{fingerprint_for, GenerationReport, PlanGenerator, RunState};
pub use source::{CachedRecipeSource, CatalogRecipeSource, RecipeSource};
pub use telemetry::init_tracing;
