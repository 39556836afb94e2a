//! Shopping list aggregation.

use std::collections::BTreeMap;

use ladle_core::{IngredientId, IngredientQuantity, MealPlan, ShoppingList};

/// Sum the ingredients of every assigned recipe in `plan`, one record per
/// ingredient id, ordered by id.
///
/// Name and unit come from the first occurrence. Units are not converted.
pub fn aggregate_quantities(plan: &MealPlan) -> Vec<IngredientQuantity> {
    let mut totals: BTreeMap<IngredientId, IngredientQuantity> = BTreeMap::new();
    for ingredient in plan.recipes().flat_map(|recipe| recipe.ingredients.iter()) {
        totals
            .entry(ingredient.id)
            .and_modify(|total| total.amount += ingredient.amount)
            .or_insert_with(|| ingredient.quantity());
    }
    totals.into_values().collect()
}

/// Build a fresh shopping list for `plan`.
pub fn aggregate(plan: &MealPlan) -> ShoppingList {
    let mut list = ShoppingList::new(
        format!("Shopping List for {}", plan.name),
        Some(plan.plan_id),
    );
    for quantity in aggregate_quantities(plan) {
        list.add_item(quantity, None);
    }
    list
}
