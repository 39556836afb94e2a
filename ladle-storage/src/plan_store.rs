//! Meal plan persistence.
//!
//! Plan generation reads a plan, selects recipes against that snapshot, and
//! commits them with a single [`PlanStore::assign_recipes`]. The commit is
//! applied to the plan as stored at that moment, so edits made while
//! generation ran survive. Stores make `save` and `assign_recipes` atomic
//! per plan.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use ladle_core::{EntityId, MealPlan, Recipe, StorageError};

/// Storage for meal plans.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Fetch a plan by id.
    async fn get(&self, plan_id: EntityId) -> Result<Option<MealPlan>, StorageError>;

    /// Insert or replace a plan.
    async fn save(&self, plan: &MealPlan) -> Result<(), StorageError>;

    /// Set the recipe of each listed slot in the stored plan, in one step.
    ///
    /// Every other field of the plan is left as stored. Slots that no longer
    /// exist are skipped. Returns the number of slots assigned.
    async fn assign_recipes(
        &self,
        plan_id: EntityId,
        assignments: Vec<(EntityId, Recipe)>,
    ) -> Result<usize, StorageError>;

    /// Delete a plan. Fails with `NotFound` if it does not exist.
    async fn delete(&self, plan_id: EntityId) -> Result<(), StorageError>;

    /// All plans, newest first.
    async fn list(&self) -> Result<Vec<MealPlan>, StorageError>;
}

/// Plan store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPlanStore {
    plans: RwLock<HashMap<EntityId, MealPlan>>,
}

impl InMemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `plans`.
    pub fn with_plans(plans: impl IntoIterator<Item = MealPlan>) -> Self {
        let plans = plans.into_iter().map(|p| (p.plan_id, p)).collect();
        Self {
            plans: RwLock::new(plans),
        }
    }
}

#[async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn get(&self, plan_id: EntityId) -> Result<Option<MealPlan>, StorageError> {
        let plans = self.plans.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(plans.get(&plan_id).cloned())
    }

    async fn save(&self, plan: &MealPlan) -> Result<(), StorageError> {
        let mut plans = self.plans.write().map_err(|_| StorageError::LockPoisoned)?;
        plans.insert(plan.plan_id, plan.clone());
        Ok(())
    }

    async fn assign_recipes(
        &self,
        plan_id: EntityId,
        assignments: Vec<(EntityId, Recipe)>,
    ) -> Result<usize, StorageError> {
        let mut plans = self.plans.write().map_err(|_| StorageError::LockPoisoned)?;
        let plan = plans
            .get_mut(&plan_id)
            .ok_or(StorageError::NotFound { id: plan_id })?;

        let mut assigned = 0;
        for (slot_id, recipe) in assignments {
            match plan.assign_recipe(slot_id, recipe) {
                Ok(()) => assigned += 1,
                Err(e) => tracing::debug!(%plan_id, error = %e, "skipping assignment"),
            }
        }
        Ok(assigned)
    }

    async fn delete(&self, plan_id: EntityId) -> Result<(), StorageError> {
        let mut plans = self.plans.write().map_err(|_| StorageError::LockPoisoned)?;
        plans
            .remove(&plan_id)
            .map(|_| ())
            .ok_or(StorageError::NotFound { id: plan_id })
    }

    async fn list(&self) -> Result<Vec<MealPlan>, StorageError> {
        let plans = self.plans.read().map_err(|_| StorageError::LockPoisoned)?;
        let mut all: Vec<MealPlan> = plans.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use ladle_core::MealType;

    fn recipe(id: i64) -> Recipe {
        Recipe {
            id,
            title: format!("Recipe {}", id),
            summary: String::new(),
            ready_in_minutes: 10,
            servings: 2,
            source_url: None,
            image: None,
            instructions: None,
            ingredients: vec![],
            diets: vec![],
            dish_types: vec![],
            cuisines: vec![],
        }
    }

    fn plan(name: &str) -> MealPlan {
        let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        MealPlan::new(name, start, 2, &MealType::DEFAULT_DAY).unwrap()
    }

    #[tokio::test]
    async fn test_save_get_delete() {
        let store = InMemoryPlanStore::new();
        let p = plan("Week");

        store.save(&p).await.unwrap();
        assert_eq!(store.get(p.plan_id).await.unwrap(), Some(p.clone()));

        store.delete(p.plan_id).await.unwrap();
        assert!(store.get(p.plan_id).await.unwrap().is_none());
        assert!(matches!(
            store.delete(p.plan_id).await,
            Err(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_save_replaces() {
        let mut p = plan("Week");
        let store = InMemoryPlanStore::with_plans([p.clone()]);
        p.name = "Renamed".to_string();
        store.save(&p).await.unwrap();
        assert_eq!(store.get(p.plan_id).await.unwrap().unwrap().name, "Renamed");
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_assign_recipes_keeps_other_edits() {
        let p = plan("Week");
        let lunch = p.days[0].slots[1].slot_id;
        let dinner = p.days[1].slots[2].slot_id;
        let store = InMemoryPlanStore::with_plans([p.clone()]);

        let mut edited = p.clone();
        edited.name = "Renamed".to_string();
        edited.assign_recipe(lunch, recipe(5)).unwrap();
        store.save(&edited).await.unwrap();

        let assigned = store
            .assign_recipes(
                p.plan_id,
                vec![(dinner, recipe(9)), (ladle_core::new_entity_id(), recipe(10))],
            )
            .await
            .unwrap();
        assert_eq!(assigned, 1);

        let stored = store.get(p.plan_id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.days[0].slots[1].recipe.as_ref().map(|r| r.id), Some(5));
        assert_eq!(stored.days[1].slots[2].recipe.as_ref().map(|r| r.id), Some(9));
        assert_eq!(stored.filled_slot_count(), 2);
    }

    #[tokio::test]
    async fn test_assign_recipes_missing_plan() {
        let store = InMemoryPlanStore::new();
        let result = store
            .assign_recipes(ladle_core::new_entity_id(), vec![])
            .await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let mut older = plan("Older");
        older.created_at -= Duration::days(1);
        let newer = plan("Newer");
        let store = InMemoryPlanStore::with_plans([older, newer]);

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Newer", "Older"]);
    }
}
