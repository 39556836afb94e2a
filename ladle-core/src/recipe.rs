//! Recipe and ingredient types as returned by the recipe API.

use serde::{Deserialize, Serialize};

/// Recipe identifier assigned by the recipe API.
pub type RecipeId = i64;

/// Ingredient identifier assigned by the recipe API.
pub type IngredientId = i64;

/// A single ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub amount: f64,
    pub unit: String,
    /// The ingredient line as written in the source recipe.
    #[serde(default)]
    pub original: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Ingredient {
    /// Project this ingredient onto a shopping quantity.
    pub fn quantity(&self) -> IngredientQuantity {
        IngredientQuantity {
            ingredient_id: self.id,
            name: self.name.clone(),
            unit: self.unit.clone(),
            amount: self.amount,
        }
    }
}

/// A recipe as delivered by the recipe API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub ready_in_minutes: u32,
    pub servings: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, rename = "extendedIngredients")]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub diets: Vec<String>,
    #[serde(default)]
    pub dish_types: Vec<String>,
    #[serde(default)]
    pub cuisines: Vec<String>,
}

impl Recipe {
    /// Returns true if any ingredient name contains `needle` (case-insensitive).
    pub fn mentions_ingredient(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.ingredients
            .iter()
            .any(|ingredient| ingredient.name.to_lowercase().contains(&needle))
    }

    /// Returns true if `tag` matches one of the recipe's diets, dish types or
    /// cuisines (case-insensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.diets
            .iter()
            .chain(self.dish_types.iter())
            .chain(self.cuisines.iter())
            .any(|value| value.eq_ignore_ascii_case(tag))
    }
}

/// An amount of one ingredient, the unit of shopping-list aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientQuantity {
    pub ingredient_id: IngredientId,
    pub name: String,
    pub unit: String,
    pub amount: f64,
}

/// Wire shape of a paginated search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub results: Vec<Recipe>,
    pub offset: u32,
    pub number: u32,
    pub total_results: u32,
}
