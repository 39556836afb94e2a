//! Meal plan structure: plans, days and meal slots.
//!
//! A plan is created empty by the caller and later filled by the plan
//! generator. Generation only ever touches `MealSlot::recipe`; the set of
//! days and slots is fixed when the plan is built.

use crate::{new_entity_id, EntityId, PlanError, Recipe, Timestamp, ValidationError};
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Days in a plan built without an explicit length.
pub const DEFAULT_PLAN_DAYS: u32 = 7;

/// Meal positions within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    /// Slots a day gets when none are requested explicitly.
    pub const DEFAULT_DAY: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    /// The tag used when asking the recipe source for this meal.
    pub fn as_tag(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// One (day, meal type) position awaiting a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSlot {
    pub slot_id: EntityId,
    pub meal_type: MealType,
    pub recipe: Option<Recipe>,
}

impl MealSlot {
    pub fn new(meal_type: MealType) -> Self {
        Self {
            slot_id: new_entity_id(),
            meal_type,
            recipe: None,
        }
    }
}

/// A dated day of a plan with its ordered slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDay {
    pub day_id: EntityId,
    pub date: NaiveDate,
    pub slots: Vec<MealSlot>,
}

impl PlanDay {
    pub fn new(date: NaiveDate, meal_types: &[MealType]) -> Self {
        Self {
            day_id: new_entity_id(),
            date,
            slots: meal_types.iter().copied().map(MealSlot::new).collect(),
        }
    }
}

/// Position of a slot inside a plan, stable for the plan's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotPosition {
    pub day_index: usize,
    pub slot_index: usize,
}

/// A multi-day meal plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub plan_id: EntityId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<PlanDay>,
    pub created_at: Timestamp,
}

impl MealPlan {
    /// Build a plan of `day_count` consecutive empty days starting at
    /// `start_date`, each holding one empty slot per entry in `meal_types`.
    pub fn new(
        name: impl Into<String>,
        start_date: NaiveDate,
        day_count: u32,
        meal_types: &[MealType],
    ) -> Result<Self, ValidationError> {
        if day_count == 0 {
            return Err(ValidationError::InvalidValue {
                field: "day_count".to_string(),
                reason: "a plan needs at least one day".to_string(),
            });
        }

        let mut days = Vec::with_capacity(day_count as usize);
        for offset in 0..day_count {
            let date = start_date
                .checked_add_days(Days::new(u64::from(offset)))
                .ok_or_else(|| ValidationError::InvalidValue {
                    field: "start_date".to_string(),
                    reason: format!("{} + {} days is out of range", start_date, offset),
                })?;
            days.push(PlanDay::new(date, meal_types));
        }

        let end_date = days.last().map(|day| day.date).unwrap_or(start_date);

        Ok(Self {
            plan_id: new_entity_id(),
            name: name.into(),
            start_date,
            end_date,
            days,
            created_at: Utc::now(),
        })
    }

    /// Check the structural invariants of the plan.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "name".to_string(),
            });
        }

        let mut seen = HashSet::with_capacity(self.days.len());
        for day in &self.days {
            if !seen.insert(day.date) {
                return Err(ValidationError::DuplicateDate { date: day.date });
            }
        }
        Ok(())
    }

    /// Total number of slots across all days.
    pub fn slot_count(&self) -> usize {
        self.days.iter().map(|day| day.slots.len()).sum()
    }

    /// Number of slots that currently hold a recipe.
    pub fn filled_slot_count(&self) -> usize {
        self.slots().filter(|(_, _, slot)| slot.recipe.is_some()).count()
    }

    /// Iterate every slot with its position and the date of its day.
    pub fn slots(&self) -> impl Iterator<Item = (SlotPosition, NaiveDate, &MealSlot)> + '_ {
        self.days.iter().enumerate().flat_map(|(day_index, day)| {
            day.slots.iter().enumerate().map(move |(slot_index, slot)| {
                (
                    SlotPosition {
                        day_index,
                        slot_index,
                    },
                    day.date,
                    slot,
                )
            })
        })
    }

    /// Replace the recipe of one slot by id.
    pub fn assign_recipe(&mut self, slot_id: EntityId, recipe: Recipe) -> Result<(), PlanError> {
        let slot = self
            .days
            .iter_mut()
            .flat_map(|day| day.slots.iter_mut())
            .find(|slot| slot.slot_id == slot_id)
            .ok_or(PlanError::SlotNotFound { slot_id })?;
        slot.recipe = Some(recipe);
        Ok(())
    }

    /// Iterate the recipes currently assigned, in plan order.
    pub fn recipes(&self) -> impl Iterator<Item = &Recipe> + '_ {
        self.days
            .iter()
            .flat_map(|day| day.slots.iter())
            .filter_map(|slot| slot.recipe.as_ref())
    }
}
