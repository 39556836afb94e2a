//! Request fingerprints: the semantic parameters of one recipe search.

use serde::{Deserialize, Serialize};

/// Result count used when a fingerprint does not ask for one.
pub const DEFAULT_SEARCH_NUMBER: u32 = 20;

/// The deterministic description of a recipe search.
///
/// Two fingerprints that compare equal always produce the same cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub query: String,
    pub cuisine: Option<String>,
    pub diet: Option<String>,
    /// Comma-separated intolerances, as the API expects them.
    pub intolerances: Option<String>,
    pub max_ready_time: Option<u32>,
    pub tags: Vec<String>,
    pub number: u32,
    pub offset: u32,
}

impl Default for Fingerprint {
    fn default() -> Self {
        Self {
            query: String::new(),
            cuisine: None,
            diet: None,
            intolerances: None,
            max_ready_time: None,
            tags: Vec::new(),
            number: DEFAULT_SEARCH_NUMBER,
            offset: 0,
        }
    }
}

impl Fingerprint {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = Some(cuisine.into());
        self
    }

    pub fn with_diet(mut self, diet: impl Into<String>) -> Self {
        self.diet = Some(diet.into());
        self
    }

    pub fn with_intolerances(mut self, intolerances: impl Into<String>) -> Self {
        self.intolerances = Some(intolerances.into());
        self
    }

    pub fn with_max_ready_time(mut self, minutes: u32) -> Self {
        self.max_ready_time = Some(minutes);
        self
    }

    pub fn with_page(mut self, number: u32, offset: u32) -> Self {
        self.number = number;
        self.offset = offset;
        self
    }

    /// Individual intolerances, trimmed and without empties.
    pub fn intolerance_list(&self) -> Vec<&str> {
        self.intolerances
            .as_deref()
            .map(|s| s.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    /// Cache key for the search this fingerprint describes.
    ///
    /// Fields are joined with `_` in a fixed order; absent options render as
    /// empty strings. The key is not escaped, so free-text queries containing
    /// `_` or path separators can collide or produce unusable file names.
    pub fn cache_key(&self) -> String {
        format!(
            "search_{}_{}_{}_{}_{}_{}_{}_{}",
            self.query,
            self.cuisine.as_deref().unwrap_or(""),
            self.diet.as_deref().unwrap_or(""),
            self.intolerances.as_deref().unwrap_or(""),
            self.max_ready_time.map(|m| m.to_string()).unwrap_or_default(),
            self.tags.join(","),
            self.number,
            self.offset,
        )
    }
}
