//! User dietary preferences consumed by plan generation.

use serde::{Deserialize, Serialize};

/// Dietary restrictions understood by the recipe API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietaryRestriction {
    Vegan,
    Vegetarian,
    GlutenFree,
    Ketogenic,
    Paleo,
    Pescetarian,
    Whole30,
    DairyFree,
}

impl DietaryRestriction {
    pub const ALL: [DietaryRestriction; 8] = [
        DietaryRestriction::Vegan,
        DietaryRestriction::Vegetarian,
        DietaryRestriction::GlutenFree,
        DietaryRestriction::Ketogenic,
        DietaryRestriction::Paleo,
        DietaryRestriction::Pescetarian,
        DietaryRestriction::Whole30,
        DietaryRestriction::DairyFree,
    ];

    /// API tag for this restriction.
    pub fn as_tag(&self) -> &'static str {
        match self {
            DietaryRestriction::Vegan => "vegan",
            DietaryRestriction::Vegetarian => "vegetarian",
            DietaryRestriction::GlutenFree => "gluten-free",
            DietaryRestriction::Ketogenic => "ketogenic",
            DietaryRestriction::Paleo => "paleo",
            DietaryRestriction::Pescetarian => "pescetarian",
            DietaryRestriction::Whole30 => "whole30",
            DietaryRestriction::DairyFree => "dairy-free",
        }
    }
}

/// Daily nutrition targets. Informational only; not used for selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionalGoals {
    pub calories_per_day: Option<u32>,
    pub protein_percentage: Option<u8>,
    pub carb_percentage: Option<u8>,
    pub fat_percentage: Option<u8>,
}

/// Preferences that shape which recipes the generator asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub dietary_restrictions: Vec<DietaryRestriction>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub cuisine_preferences: Vec<String>,
    /// Upper bound on preparation time in minutes.
    #[serde(default)]
    pub max_cooking_time: Option<u32>,
    #[serde(default = "default_serving_size")]
    pub serving_size: u32,
    #[serde(default)]
    pub nutritional_goals: Option<NutritionalGoals>,
}

fn default_serving_size() -> u32 {
    2
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            dietary_restrictions: Vec::new(),
            allergies: Vec::new(),
            cuisine_preferences: Vec::new(),
            max_cooking_time: None,
            serving_size: default_serving_size(),
            nutritional_goals: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restriction_tags_match_serde_names() {
        for restriction in DietaryRestriction::ALL {
            let json = serde_json::to_string(&restriction).unwrap();
            assert_eq!(json, format!("\"{}\"", restriction.as_tag()));
        }
    }

    #[test]
    fn test_preferences_defaults_from_empty_json() {
        let prefs: UserPreferences = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs, UserPreferences::default());
        assert_eq!(prefs.serving_size, 2);
    }
}
