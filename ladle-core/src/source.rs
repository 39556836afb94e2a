//! The recipe source boundary.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Fingerprint, Recipe, RecipeId, SourceError};

/// Anything that can answer recipe searches and detail lookups.
///
/// The remote recipe API, the offline catalog and the caching decorator all
/// sit behind this trait; the plan generator only sees the trait.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Recipes matching `fingerprint`, in the source's ranking order.
    async fn search(&self, fingerprint: &Fingerprint) -> Result<Vec<Recipe>, SourceError>;

    /// Full details of one recipe.
    async fn recipe(&self, id: RecipeId) -> Result<Recipe, SourceError>;
}

#[async_trait]
impl<S: RecipeSource + ?Sized> RecipeSource for Arc<S> {
    async fn search(&self, fingerprint: &Fingerprint) -> Result<Vec<Recipe>, SourceError> {
        (**self).search(fingerprint).await
    }

    async fn recipe(&self, id: RecipeId) -> Result<Recipe, SourceError> {
        (**self).recipe(id).await
    }
}
