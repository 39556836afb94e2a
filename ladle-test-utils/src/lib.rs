//! LADLE Test Utilities
//!
//! Centralized test infrastructure for the LADLE workspace:
//! - A scripted mock recipe source
//! - Test fixtures for recipes and plans
//! - Proptest generators for domain types
//! - Custom assertions for shopping list contents

pub use ladle_storage::InMemoryPlanStore;

pub use ladle_core::{
    DietaryRestriction, EntityId, Fingerprint, Ingredient, IngredientQuantity, LadleError,
    LadleResult, MealPlan, MealType, Recipe, RecipeId, RecipeSource, ShoppingList, SourceError,
    UserPreferences,
};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

// ============================================================================
// MOCK RECIPE SOURCE
// ============================================================================

/// Recipe source with scripted behaviour.
///
/// Each successful search returns one recipe, rotating through the
/// configured list, so N calls over N recipes hand out each recipe exactly
/// once regardless of call order. Searches whose tags include the failure
/// tag fail immediately; searches with the empty tag return nothing. All
/// other searches wait for the configured delay first.
#[derive(Debug, Default)]
pub struct MockRecipeSource {
    recipes: Vec<Recipe>,
    fail_on: Option<(String, SourceError)>,
    empty_on: Option<String>,
    delay: Option<Duration>,
    search_calls: AtomicUsize,
    completed_searches: AtomicUsize,
    recipe_calls: AtomicUsize,
    next: AtomicUsize,
}

impl MockRecipeSource {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self {
            recipes,
            ..Self::default()
        }
    }

    pub fn fail_on_tag(mut self, tag: impl Into<String>, error: SourceError) -> Self {
        self.fail_on = Some((tag.into(), error));
        self
    }

    pub fn empty_on_tag(mut self, tag: impl Into<String>) -> Self {
        self.empty_on = Some(tag.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Searches started.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Searches that ran to completion and returned a recipe list.
    pub fn completed_searches(&self) -> usize {
        self.completed_searches.load(Ordering::SeqCst)
    }

    pub fn recipe_calls(&self) -> usize {
        self.recipe_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecipeSource for MockRecipeSource {
    async fn search(&self, fingerprint: &Fingerprint) -> Result<Vec<Recipe>, SourceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let has_tag = |tag: &str| fingerprint.tags.iter().any(|t| t == tag);

        if let Some((tag, error)) = &self.fail_on {
            if has_tag(tag) {
                return Err(error.clone());
            }
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let result = match &self.empty_on {
            Some(tag) if has_tag(tag) => Vec::new(),
            _ if self.recipes.is_empty() => Vec::new(),
            _ => {
                let index = self.next.fetch_add(1, Ordering::SeqCst) % self.recipes.len();
                vec![self.recipes[index].clone()]
            }
        };
        self.completed_searches.fetch_add(1, Ordering::SeqCst);
        Ok(result)
    }

    async fn recipe(&self, id: RecipeId) -> Result<Recipe, SourceError> {
        self.recipe_calls.fetch_add(1, Ordering::SeqCst);
        self.recipes
            .iter()
            .find(|recipe| recipe.id == id)
            .cloned()
            .ok_or(SourceError::ServerError(404))
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating LADLE domain types.

    use super::*;
    use proptest::prelude::*;

    /// Generate a MealType variant.
    pub fn arb_meal_type() -> impl Strategy<Value = MealType> {
        prop_oneof![
            Just(MealType::Breakfast),
            Just(MealType::Lunch),
            Just(MealType::Dinner),
            Just(MealType::Snack),
        ]
    }

    /// Generate a DietaryRestriction variant.
    pub fn arb_dietary_restriction() -> impl Strategy<Value = DietaryRestriction> {
        prop::sample::select(DietaryRestriction::ALL.to_vec())
    }

    /// Generate an ingredient from a small id space so recipes share ids.
    pub fn arb_ingredient() -> impl Strategy<Value = Ingredient> {
        (1i64..20, 0.25f64..10.0, prop::sample::select(vec!["cup", "g", "tbsp", ""]))
            .prop_map(|(id, amount, unit)| {
                super::fixtures::ingredient(id, &format!("ingredient {}", id), amount, unit)
            })
    }

    /// Generate a recipe with up to eight ingredients.
    pub fn arb_recipe() -> impl Strategy<Value = Recipe> {
        (
            1i64..10_000,
            "[A-Z][a-z]{2,12}",
            prop::collection::vec(arb_ingredient(), 0..8),
        )
            .prop_map(|(id, title, ingredients)| super::fixtures::recipe(id, &title, ingredients))
    }

    /// Generate user preferences.
    pub fn arb_preferences() -> impl Strategy<Value = UserPreferences> {
        (
            prop::collection::vec(arb_dietary_restriction(), 0..3),
            prop::collection::vec("[a-z]{3,10}", 0..3),
            prop::option::of(5u32..120),
        )
            .prop_map(|(dietary_restrictions, allergies, max_cooking_time)| UserPreferences {
                dietary_restrictions,
                allergies,
                max_cooking_time,
                ..UserPreferences::default()
            })
    }

    /// Generate a plan of one to five days where each slot may hold a recipe.
    pub fn arb_filled_plan() -> impl Strategy<Value = MealPlan> {
        (1u32..6)
            .prop_flat_map(|days| {
                let slots = days as usize * MealType::DEFAULT_DAY.len();
                (
                    Just(days),
                    prop::collection::vec(prop::option::of(arb_recipe()), slots),
                )
            })
            .prop_map(|(days, recipes)| {
                let mut plan = super::fixtures::empty_plan(days);
                let slot_ids: Vec<EntityId> =
                    plan.slots().map(|(_, _, slot)| slot.slot_id).collect();
                for (slot_id, recipe) in slot_ids.into_iter().zip(recipes) {
                    if let Some(recipe) = recipe {
                        let _ = plan.assign_recipe(slot_id, recipe);
                    }
                }
                plan
            })
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;
    use chrono::NaiveDate;

    /// Create an ingredient line.
    pub fn ingredient(id: i64, name: &str, amount: f64, unit: &str) -> Ingredient {
        Ingredient {
            id,
            name: name.to_string(),
            amount,
            unit: unit.to_string(),
            original: format!("{} {} {}", amount, unit, name),
            image: None,
        }
    }

    /// Create a recipe with the given ingredients and no tags.
    pub fn recipe(id: RecipeId, title: &str, ingredients: Vec<Ingredient>) -> Recipe {
        Recipe {
            id,
            title: title.to_string(),
            summary: String::new(),
            ready_in_minutes: 20,
            servings: 2,
            source_url: None,
            image: None,
            instructions: None,
            ingredients,
            diets: Vec::new(),
            dish_types: Vec::new(),
            cuisines: Vec::new(),
        }
    }

    /// Create a recipe with one ingredient whose id matches the recipe id.
    pub fn simple_recipe(id: RecipeId) -> Recipe {
        recipe(
            id,
            &format!("Recipe {}", id),
            vec![ingredient(id, &format!("ingredient {}", id), 1.0, "cup")],
        )
    }

    /// `count` recipes with ids 1..=count. Recipe `n` uses ingredient `n`
    /// plus the shared ingredient 1000 (salt), so the distinct ingredient
    /// count is `count + 1`.
    pub fn distinct_recipes(count: usize) -> Vec<Recipe> {
        (1..=count as i64)
            .map(|id| {
                let mut recipe = simple_recipe(id);
                recipe.ingredients.push(ingredient(1000, "salt", 0.5, "tsp"));
                recipe
            })
            .collect()
    }

    /// Monday 2024-03-04, the start date used by fixture plans.
    pub fn start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap_or(NaiveDate::MIN)
    }

    /// An empty plan of `days` days with breakfast, lunch and dinner slots.
    pub fn empty_plan(days: u32) -> MealPlan {
        match MealPlan::new("Test Plan", start_date(), days, &MealType::DEFAULT_DAY) {
            Ok(plan) => plan,
            Err(e) => panic!("fixture plan invalid: {}", e),
        }
    }

    /// Default preferences with one restriction and one allergy.
    pub fn vegan_preferences() -> UserPreferences {
        UserPreferences {
            dietary_restrictions: vec![DietaryRestriction::Vegan],
            allergies: vec!["peanut".to_string()],
            ..UserPreferences::default()
        }
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for LADLE-specific validation.

    use super::*;

    /// Assert that a LadleResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &LadleResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a shopping list holds `amount` `unit` of `ingredient_id`.
    #[track_caller]
    pub fn assert_item_amount(list: &ShoppingList, ingredient_id: i64, amount: f64, unit: &str) {
        let item = list
            .items
            .iter()
            .find(|item| item.quantity.ingredient_id == ingredient_id);
        match item {
            Some(item) => {
                assert!(
                    (item.quantity.amount - amount).abs() < 1e-9,
                    "ingredient {} amount: expected {}, got {}",
                    ingredient_id,
                    amount,
                    item.quantity.amount
                );
                assert_eq!(item.quantity.unit, unit, "ingredient {} unit", ingredient_id);
            }
            None => panic!("ingredient {} not in shopping list", ingredient_id),
        }
    }

    /// Assert that no two items share an ingredient id.
    #[track_caller]
    pub fn assert_no_duplicate_ingredients(list: &ShoppingList) {
        let mut seen = std::collections::HashSet::new();
        for item in &list.items {
            assert!(
                seen.insert(item.quantity.ingredient_id),
                "ingredient {} listed twice",
                item.quantity.ingredient_id
            );
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
