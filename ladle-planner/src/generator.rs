//! Concurrent meal plan generation.
//!
//! One selection task runs per meal slot. Tasks share nothing; each hands
//! its outcome back to a single collector loop. The first failure aborts the
//! remaining tasks and the stored plan is left untouched. When every task
//! succeeds the selected recipes are committed with one store call, applied
//! to the plan as stored at commit time, so readers see either none or all
//! of them and edits made during the run are kept.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use ladle_core::{
    EntityId, Fingerprint, LadleResult, MealType, PlanError, Recipe, RecipeSource, SourceError,
    UserPreferences,
};
use ladle_storage::PlanStore;
use tokio::task::JoinSet;

/// Lifecycle of a generation run for one plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// No run has been started for the plan.
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub plan_id: EntityId,
    /// Selection tasks spawned, one per slot.
    pub slots_total: usize,
    /// Slots that received a recipe in this run.
    pub slots_assigned: usize,
    /// Slots whose search came back empty and were left as they were.
    pub slots_unmatched: usize,
}

/// The search issued for one slot.
///
/// Tags are the dietary restriction tags followed by the meal type tag;
/// allergies become the comma-separated intolerance list. Exactly one
/// candidate is requested.
pub fn fingerprint_for(meal_type: MealType, preferences: &UserPreferences) -> Fingerprint {
    let mut fingerprint = Fingerprint::default().with_page(1, 0);
    for restriction in &preferences.dietary_restrictions {
        fingerprint = fingerprint.with_tag(restriction.as_tag());
    }
    fingerprint = fingerprint.with_tag(meal_type.as_tag());
    if !preferences.allergies.is_empty() {
        fingerprint = fingerprint.with_intolerances(preferences.allergies.join(","));
    }
    if let Some(minutes) = preferences.max_cooking_time {
        fingerprint = fingerprint.with_max_ready_time(minutes);
    }
    fingerprint
}

struct SlotOutcome {
    slot_id: EntityId,
    date: NaiveDate,
    meal_type: MealType,
    result: Result<Option<Recipe>, SourceError>,
}

type RunTable = Mutex<HashMap<EntityId, RunState>>;

/// Marks a plan as running for as long as it lives. Dropping it without
/// calling [`RunGuard::succeed`] records the run as failed.
struct RunGuard<'a> {
    runs: &'a RunTable,
    plan_id: EntityId,
    outcome: RunState,
}

impl<'a> RunGuard<'a> {
    fn begin(runs: &'a RunTable, plan_id: EntityId) -> Result<Self, PlanError> {
        let mut table = runs.lock().unwrap_or_else(PoisonError::into_inner);
        if table.get(&plan_id) == Some(&RunState::Running) {
            return Err(PlanError::AlreadyRunning { plan_id });
        }
        table.insert(plan_id, RunState::Running);
        Ok(Self {
            runs,
            plan_id,
            outcome: RunState::Failed,
        })
    }

    fn succeed(mut self) {
        self.outcome = RunState::Succeeded;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut table = self.runs.lock().unwrap_or_else(PoisonError::into_inner);
        table.insert(self.plan_id, self.outcome);
    }
}

/// Fills meal plans from a recipe source.
pub struct PlanGenerator<S> {
    source: Arc<S>,
    store: Arc<dyn PlanStore>,
    runs: RunTable,
}

impl<S: RecipeSource + 'static> PlanGenerator<S> {
    pub fn new(source: Arc<S>, store: Arc<dyn PlanStore>) -> Self {
        Self {
            source,
            store,
            runs: Mutex::new(HashMap::new()),
        }
    }

    /// State of the most recent run for `plan_id`.
    pub fn state(&self, plan_id: EntityId) -> RunState {
        self.runs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&plan_id)
            .copied()
            .unwrap_or(RunState::Idle)
    }

    /// Fill every slot of the stored plan `plan_id`.
    ///
    /// Slots whose search returns nothing keep their current recipe. Any
    /// source failure fails the whole run with [`PlanError::SlotFailed`] and
    /// nothing is written.
    pub async fn generate(
        &self,
        plan_id: EntityId,
        preferences: &UserPreferences,
    ) -> LadleResult<GenerationReport> {
        let plan = self
            .store
            .get(plan_id)
            .await?
            .ok_or(PlanError::NotFound { plan_id })?;
        plan.validate()?;

        let guard = RunGuard::begin(&self.runs, plan_id)?;
        let slots_total = plan.slot_count();
        tracing::info!(%plan_id, slots = slots_total, "meal plan generation started");

        let mut tasks = JoinSet::new();
        for (_, date, slot) in plan.slots() {
            let source = Arc::clone(&self.source);
            let fingerprint = fingerprint_for(slot.meal_type, preferences);
            let slot_id = slot.slot_id;
            let meal_type = slot.meal_type;
            tasks.spawn(async move {
                let result = source
                    .search(&fingerprint)
                    .await
                    .map(|recipes| recipes.into_iter().next());
                SlotOutcome {
                    slot_id,
                    date,
                    meal_type,
                    result,
                }
            });
        }

        let mut assignments = Vec::with_capacity(slots_total);
        let mut slots_unmatched = 0;
        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    tasks.abort_all();
                    tracing::warn!(%plan_id, error = %e, "selection task did not complete");
                    return Err(PlanError::TaskAborted {
                        reason: e.to_string(),
                    }
                    .into());
                }
            };

            match outcome.result {
                Ok(Some(recipe)) => assignments.push((outcome.slot_id, recipe)),
                Ok(None) => {
                    tracing::debug!(
                        %plan_id,
                        date = %outcome.date,
                        meal_type = %outcome.meal_type,
                        "no recipe matched, slot left unchanged"
                    );
                    slots_unmatched += 1;
                }
                Err(source) => {
                    tasks.abort_all();
                    tracing::warn!(
                        %plan_id,
                        date = %outcome.date,
                        meal_type = %outcome.meal_type,
                        error = %source,
                        "recipe selection failed, discarding run"
                    );
                    return Err(PlanError::SlotFailed {
                        date: outcome.date,
                        meal_type: outcome.meal_type,
                        source,
                    }
                    .into());
                }
            }
        }

        let slots_assigned = self.store.assign_recipes(plan_id, assignments).await?;
        guard.succeed();

        tracing::info!(
            %plan_id,
            assigned = slots_assigned,
            unmatched = slots_unmatched,
            "meal plan generation succeeded"
        );
        Ok(GenerationReport {
            plan_id,
            slots_total,
            slots_assigned,
            slots_unmatched,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod prop_tests {
    use super::*;
    use ladle_test_utils::generators::{arb_meal_type, arb_preferences};
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Equal inputs always produce the same search, ending in the meal tag.
        #[test]
        fn prop_fingerprint_is_deterministic(
            meal_type in arb_meal_type(),
            preferences in arb_preferences(),
        ) {
            let first = fingerprint_for(meal_type, &preferences);
            let second = fingerprint_for(meal_type, &preferences.clone());
            prop_assert_eq!(first.cache_key(), second.cache_key());
            prop_assert_eq!(&first, &second);

            prop_assert_eq!(first.tags.last().map(String::as_str), Some(meal_type.as_tag()));
            prop_assert_eq!(first.tags.len(), preferences.dietary_restrictions.len() + 1);
            prop_assert_eq!(first.number, 1);
            prop_assert_eq!(first.max_ready_time, preferences.max_cooking_time);
            prop_assert_eq!(first.intolerances.is_some(), !preferences.allergies.is_empty());
        }
    }
}
