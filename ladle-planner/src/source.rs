//! Recipe source implementations.
//!
//! [`CachedRecipeSource`] wraps any source with the two-tier cache.
//! [`CatalogRecipeSource`] answers from a local JSON catalog and stands in
//! for the remote API offline and in tests.

use std::sync::Arc;

use async_trait::async_trait;
use ladle_core::{Fingerprint, Recipe, RecipeId, SearchResults, SourceError};
use ladle_storage::{CacheKey, TtlPolicy, TwoTierCache};
use serde::Deserialize;

pub use ladle_core::RecipeSource;

// ============================================================================
// CACHING DECORATOR
// ============================================================================

/// Read-through cache in front of another recipe source.
///
/// Searches are cached under the fingerprint's key, recipe details under
/// `recipe_{id}`. Failures are passed through and never cached.
#[derive(Debug)]
pub struct CachedRecipeSource<S> {
    inner: S,
    cache: Arc<TwoTierCache>,
    ttl: TtlPolicy,
}

impl<S> CachedRecipeSource<S> {
    pub fn new(inner: S, cache: Arc<TwoTierCache>) -> Self {
        Self::with_ttl(inner, cache, TtlPolicy::default())
    }

    pub fn with_ttl(inner: S, cache: Arc<TwoTierCache>, ttl: TtlPolicy) -> Self {
        Self { inner, cache, ttl }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn cache(&self) -> &Arc<TwoTierCache> {
        &self.cache
    }
}

#[async_trait]
impl<S: RecipeSource> RecipeSource for CachedRecipeSource<S> {
    async fn search(&self, fingerprint: &Fingerprint) -> Result<Vec<Recipe>, SourceError> {
        let key = CacheKey::search(fingerprint);
        if let Some(recipes) = self.cache.get::<Vec<Recipe>>(&key).await {
            tracing::debug!(key = %key, count = recipes.len(), "search served from cache");
            return Ok(recipes);
        }

        let recipes = self.inner.search(fingerprint).await?;
        self.cache.put(&key, &recipes, self.ttl.search).await;
        Ok(recipes)
    }

    async fn recipe(&self, id: RecipeId) -> Result<Recipe, SourceError> {
        let key = CacheKey::recipe(id);
        if let Some(recipe) = self.cache.get::<Recipe>(&key).await {
            tracing::debug!(recipe_id = id, "recipe served from cache");
            return Ok(recipe);
        }

        let recipe = self.inner.recipe(id).await?;
        self.cache.put(&key, &recipe, self.ttl.detail).await;
        Ok(recipe)
    }
}

// ============================================================================
// OFFLINE CATALOG
// ============================================================================

/// Catalog files are either a bare array of recipes or a saved search page.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Recipes(Vec<Recipe>),
    Page(SearchResults),
}

/// A recipe source over a fixed list of recipes.
#[derive(Debug, Clone, Default)]
pub struct CatalogRecipeSource {
    recipes: Vec<Recipe>,
}

impl CatalogRecipeSource {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    /// Parse a catalog from JSON.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let file: CatalogFile = serde_json::from_str(json).map_err(|e| SourceError::Decode {
            reason: e.to_string(),
        })?;
        let recipes = match file {
            CatalogFile::Recipes(recipes) => recipes,
            CatalogFile::Page(page) => page.results,
        };
        Ok(Self { recipes })
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    fn matches(recipe: &Recipe, fingerprint: &Fingerprint) -> bool {
        let query = fingerprint.query.trim().to_lowercase();
        if !query.is_empty() && !recipe.title.to_lowercase().contains(&query) {
            return false;
        }
        if let Some(max) = fingerprint.max_ready_time {
            if recipe.ready_in_minutes > max {
                return false;
            }
        }
        let required = fingerprint
            .tags
            .iter()
            .chain(fingerprint.cuisine.iter())
            .chain(fingerprint.diet.iter());
        for tag in required {
            if !has_normalized_tag(recipe, tag) {
                return false;
            }
        }
        !fingerprint
            .intolerance_list()
            .iter()
            .any(|intolerance| recipe.mentions_ingredient(intolerance))
    }
}

/// Tag match that treats `gluten-free` and `gluten free` as the same tag.
fn has_normalized_tag(recipe: &Recipe, tag: &str) -> bool {
    recipe.has_tag(tag) || recipe.has_tag(&tag.replace('-', " "))
}

#[async_trait]
impl RecipeSource for CatalogRecipeSource {
    async fn search(&self, fingerprint: &Fingerprint) -> Result<Vec<Recipe>, SourceError> {
        Ok(self
            .recipes
            .iter()
            .filter(|recipe| Self::matches(recipe, fingerprint))
            .skip(fingerprint.offset as usize)
            .take(fingerprint.number as usize)
            .cloned()
            .collect())
    }

    async fn recipe(&self, id: RecipeId) -> Result<Recipe, SourceError> {
        self.recipes
            .iter()
            .find(|recipe| recipe.id == id)
            .cloned()
            .ok_or_else(|| SourceError::from_status(404))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ladle_core::CacheFileNaming;
    use ladle_storage::FsTier;
    use ladle_test_utils::{fixtures, MockRecipeSource};
    use tempfile::TempDir;

    fn catalog() -> CatalogRecipeSource {
        let mut oats = fixtures::recipe(1, "Overnight Oats", vec![fixtures::ingredient(10, "oats", 1.0, "cup")]);
        oats.dish_types = vec!["breakfast".to_string()];
        oats.diets = vec!["vegan".to_string(), "gluten free".to_string()];
        oats.ready_in_minutes = 5;

        let mut satay = fixtures::recipe(
            2,
            "Chicken Satay",
            vec![fixtures::ingredient(20, "peanut butter", 2.0, "tbsp")],
        );
        satay.dish_types = vec!["dinner".to_string()];
        satay.cuisines = vec!["Thai".to_string()];
        satay.ready_in_minutes = 40;

        let mut soup = fixtures::recipe(3, "Lentil Soup", vec![fixtures::ingredient(30, "lentils", 1.0, "cup")]);
        soup.dish_types = vec!["lunch".to_string(), "dinner".to_string()];
        soup.diets = vec!["vegan".to_string()];
        soup.ready_in_minutes = 30;

        CatalogRecipeSource::new(vec![oats, satay, soup])
    }

    fn ids(recipes: &[Recipe]) -> Vec<RecipeId> {
        recipes.iter().map(|r| r.id).collect()
    }

    fn cache(dir: &TempDir) -> Arc<TwoTierCache> {
        Arc::new(TwoTierCache::new(
            100,
            Arc::new(FsTier::new(dir.path(), CacheFileNaming::Raw)),
        ))
    }

    #[tokio::test]
    async fn test_catalog_filters_by_tags() {
        let source = catalog();
        let fp = Fingerprint::default().with_tag("dinner");
        assert_eq!(ids(&source.search(&fp).await.unwrap()), vec![2, 3]);

        let fp = Fingerprint::default().with_tag("vegan").with_tag("dinner");
        assert_eq!(ids(&source.search(&fp).await.unwrap()), vec![3]);

        let fp = Fingerprint::default().with_tag("gluten-free");
        assert_eq!(ids(&source.search(&fp).await.unwrap()), vec![1]);
    }

    #[tokio::test]
    async fn test_catalog_excludes_intolerances_and_slow_recipes() {
        let source = catalog();
        let fp = Fingerprint::default().with_tag("dinner").with_intolerances("peanut");
        assert_eq!(ids(&source.search(&fp).await.unwrap()), vec![3]);

        let fp = Fingerprint::default().with_max_ready_time(10);
        assert_eq!(ids(&source.search(&fp).await.unwrap()), vec![1]);
    }

    #[tokio::test]
    async fn test_catalog_query_cuisine_and_paging() {
        let source = catalog();
        let fp = Fingerprint::query("soup");
        assert_eq!(ids(&source.search(&fp).await.unwrap()), vec![3]);

        let fp = Fingerprint::default().with_cuisine("thai");
        assert_eq!(ids(&source.search(&fp).await.unwrap()), vec![2]);

        let fp = Fingerprint::default().with_page(1, 1);
        assert_eq!(ids(&source.search(&fp).await.unwrap()), vec![2]);
    }

    #[tokio::test]
    async fn test_catalog_recipe_lookup() {
        let source = catalog();
        assert_eq!(source.recipe(3).await.unwrap().title, "Lentil Soup");
        assert_eq!(
            source.recipe(99).await.unwrap_err(),
            SourceError::ServerError(404)
        );
    }

    #[test]
    fn test_catalog_from_json_shapes() {
        let list = r#"[{"id":1,"title":"Toast","readyInMinutes":5,"servings":1}]"#;
        assert_eq!(CatalogRecipeSource::from_json(list).unwrap().len(), 1);

        let page = r#"{"results":[{"id":1,"title":"Toast","readyInMinutes":5,"servings":1}],
                       "offset":0,"number":1,"totalResults":1}"#;
        assert_eq!(CatalogRecipeSource::from_json(page).unwrap().len(), 1);

        assert!(matches!(
            CatalogRecipeSource::from_json("{\"nope\":true}"),
            Err(SourceError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_cached_search_hits_inner_once() {
        let dir = TempDir::new().unwrap();
        let inner = MockRecipeSource::new(vec![fixtures::simple_recipe(1)]);
        let source = CachedRecipeSource::new(inner, cache(&dir));
        let fp = Fingerprint::default().with_tag("dinner").with_page(1, 0);

        let first = source.search(&fp).await.unwrap();
        let second = source.search(&fp).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(source.inner().search_calls(), 1);
        assert!(dir.path().join(fp.cache_key()).is_file());
    }

    #[tokio::test]
    async fn test_cached_recipe_detail() {
        let dir = TempDir::new().unwrap();
        let inner = MockRecipeSource::new(vec![fixtures::simple_recipe(7)]);
        let source = CachedRecipeSource::new(inner, cache(&dir));

        assert_eq!(source.recipe(7).await.unwrap().id, 7);
        assert_eq!(source.recipe(7).await.unwrap().id, 7);
        assert_eq!(source.inner().recipe_calls(), 1);
        assert!(dir.path().join("recipe_7").is_file());
    }

    #[tokio::test]
    async fn test_cached_source_does_not_cache_errors() {
        let dir = TempDir::new().unwrap();
        let inner = MockRecipeSource::new(vec![fixtures::simple_recipe(1)])
            .fail_on_tag("lunch", SourceError::RateLimited);
        let source = CachedRecipeSource::new(inner, cache(&dir));
        let fp = Fingerprint::default().with_tag("lunch");

        assert_eq!(source.search(&fp).await.unwrap_err(), SourceError::RateLimited);
        assert_eq!(source.search(&fp).await.unwrap_err(), SourceError::RateLimited);
        assert_eq!(source.inner().search_calls(), 2);
        assert_eq!(source.cache().memory_len(), 0);
    }
}
