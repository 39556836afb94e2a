//! Cache keys and their on-disk file names.

use std::fmt;

use ladle_core::{CacheFileNaming, Fingerprint, RecipeId};
use sha2::{Digest, Sha256};

/// A string cache key.
///
/// Keys are opaque to the cache. The constructors here produce the keys the
/// recipe layer uses; anything else goes through [`CacheKey::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for the results of a search.
    pub fn search(fingerprint: &Fingerprint) -> Self {
        Self(fingerprint.cache_key())
    }

    /// Key for a single recipe's details.
    pub fn recipe(id: RecipeId) -> Self {
        Self(format!("recipe_{}", id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name for this key under the given naming scheme.
    ///
    /// Raw names are the key itself and are `None` when the key cannot be
    /// a single path component. Hashed names always exist.
    pub fn file_name(&self, naming: CacheFileNaming) -> Option<String> {
        match naming {
            CacheFileNaming::Raw => {
                let key = self.0.as_str();
                let unusable = key.is_empty()
                    || key == "."
                    || key == ".."
                    || key.contains(['/', '\\', '\0']);
                if unusable {
                    None
                } else {
                    Some(key.to_string())
                }
            }
            CacheFileNaming::Hashed => Some(hex::encode(Sha256::digest(self.0.as_bytes()))),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}
