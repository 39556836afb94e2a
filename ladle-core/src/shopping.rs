//! Shopping lists derived from meal plans.

use crate::{new_entity_id, EntityId, IngredientQuantity, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// One line of a shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub item_id: EntityId,
    pub quantity: IngredientQuantity,
    pub is_completed: bool,
    pub notes: Option<String>,
}

impl ShoppingItem {
    pub fn new(quantity: IngredientQuantity) -> Self {
        Self {
            item_id: new_entity_id(),
            quantity,
            is_completed: false,
            notes: None,
        }
    }
}

/// A named shopping list, optionally tied to the plan it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub list_id: EntityId,
    pub name: String,
    pub items: Vec<ShoppingItem>,
    pub source_plan: Option<EntityId>,
    pub created_at: Timestamp,
}

impl ShoppingList {
    pub fn new(name: impl Into<String>, source_plan: Option<EntityId>) -> Self {
        Self {
            list_id: new_entity_id(),
            name: name.into(),
            items: Vec::new(),
            source_plan,
            created_at: Utc::now(),
        }
    }

    /// Append an item and return its id.
    pub fn add_item(&mut self, quantity: IngredientQuantity, notes: Option<String>) -> EntityId {
        let mut item = ShoppingItem::new(quantity);
        item.notes = notes;
        let item_id = item.item_id;
        self.items.push(item);
        item_id
    }

    /// Remove an item; returns the removed item if it existed.
    pub fn remove_item(&mut self, item_id: EntityId) -> Option<ShoppingItem> {
        let index = self.items.iter().position(|item| item.item_id == item_id)?;
        Some(self.items.remove(index))
    }

    /// Flip the completion flag; returns the new state.
    pub fn toggle_completed(&mut self, item_id: EntityId) -> Option<bool> {
        let item = self.item_mut(item_id)?;
        item.is_completed = !item.is_completed;
        Some(item.is_completed)
    }

    pub fn set_quantity(&mut self, item_id: EntityId, amount: f64) -> bool {
        match self.item_mut(item_id) {
            Some(item) => {
                item.quantity.amount = amount;
                true
            }
            None => false,
        }
    }

    pub fn set_notes(&mut self, item_id: EntityId, notes: Option<String>) -> bool {
        match self.item_mut(item_id) {
            Some(item) => {
                item.notes = notes;
                true
            }
            None => false,
        }
    }

    fn item_mut(&mut self, item_id: EntityId) -> Option<&mut ShoppingItem> {
        self.items.iter_mut().find(|item| item.item_id == item_id)
    }

    /// Render the list as plain text, items sorted by ingredient name.
    /// Amounts always carry a decimal point.
    ///
    /// ```text
    /// Shopping List for Week 12
    ///
    /// ☐ flour - 3.0 cup
    /// ☑ milk - 1.5 l
    ///    Note: oat milk is fine
    /// ```
    pub fn export_text(&self) -> String {
        let mut text = format!("{}\n\n", self.name);

        let mut items: Vec<&ShoppingItem> = self.items.iter().collect();
        items.sort_by(|a, b| a.quantity.name.cmp(&b.quantity.name));

        for item in items {
            let checkmark = if item.is_completed { "☑ " } else { "☐ " };
            // Writing to a String cannot fail.
            let _ = writeln!(
                text,
                "{}{} - {:?} {}",
                checkmark, item.quantity.name, item.quantity.amount, item.quantity.unit
            );
            if let Some(notes) = item.notes.as_deref().filter(|n| !n.is_empty()) {
                let _ = writeln!(text, "   Note: {}", notes);
            }
        }

        text
    }
}
