//! File-per-entry persistent tier.
//!
//! Each entry lives in its own file under the cache directory. The file holds
//! the codec encoding of a [`CacheEntry`]. Writes go to a temporary sibling
//! first and are renamed into place, so readers never observe a partial file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ladle_core::{CacheError, CacheFileNaming};
use tokio::fs;

use super::{CacheEntry, CacheKey, PersistentTier};
use crate::codec;

/// Prefix of in-flight temporary files.
const TEMP_PREFIX: &str = ".ladle-tmp-";

/// Persistent tier backed by one file per key.
#[derive(Debug, Clone)]
pub struct FsTier {
    root: PathBuf,
    naming: CacheFileNaming,
}

impl FsTier {
    /// Create a tier rooted at `root`, creating the directory if needed.
    ///
    /// A directory that cannot be created is logged; the tier still exists
    /// and every operation on it reports the failure.
    pub fn new(root: impl Into<PathBuf>, naming: CacheFileNaming) -> Self {
        let root = root.into();
        if let Err(e) = std::fs::create_dir_all(&root) {
            tracing::warn!(path = %root.display(), error = %e, "failed to create cache directory");
        }
        Self { root, naming }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn naming(&self) -> CacheFileNaming {
        self.naming
    }

    /// Path of the file for `key`.
    pub fn path_for(&self, key: &CacheKey) -> Result<PathBuf, CacheError> {
        key.file_name(self.naming)
            .map(|name| self.root.join(name))
            .ok_or_else(|| CacheError::Io {
                path: self.root.clone(),
                reason: format!("key {:?} is not a usable file name", key.as_str()),
            })
    }

    fn io_error(path: &Path, err: std::io::Error) -> CacheError {
        CacheError::Io {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl PersistentTier for FsTier {
    async fn read(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error(&path, e)),
        };
        let entry: CacheEntry = codec::decode(&bytes)?;
        Ok(Some(entry))
    }

    async fn write(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        let bytes = codec::encode(entry)?;

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| Self::io_error(&self.root, e))?;

        let temp = self
            .root
            .join(format!("{}{}", TEMP_PREFIX, uuid::Uuid::now_v7().simple()));
        if let Err(e) = fs::write(&temp, &bytes).await {
            let _ = fs::remove_file(&temp).await;
            return Err(Self::io_error(&temp, e));
        }
        if let Err(e) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(Self::io_error(&path, e));
        }
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    async fn clear(&self) -> Result<u64, CacheError> {
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(Self::io_error(&self.root, e)),
        };

        let mut removed = 0;
        while let Some(item) = dir
            .next_entry()
            .await
            .map_err(|e| Self::io_error(&self.root, e))?
        {
            let path = item.path();
            let file_type = item
                .file_type()
                .await
                .map_err(|e| Self::io_error(&path, e))?;
            if !file_type.is_file() {
                continue;
            }
            fs::remove_file(&path)
                .await
                .map_err(|e| Self::io_error(&path, e))?;
            removed += 1;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn entry(bytes: &[u8]) -> CacheEntry {
        CacheEntry::new(bytes.to_vec(), Duration::from_secs(60), Utc::now())
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let tier = FsTier::new(dir.path(), CacheFileNaming::Raw);
        let key = CacheKey::recipe(7);

        tier.write(&key, &entry(b"[1,2]")).await.unwrap();
        assert!(dir.path().join("recipe_7").is_file());

        let read = tier.read(&key).await.unwrap().unwrap();
        assert_eq!(read.value_bytes, b"[1,2]".to_vec());
    }

    #[tokio::test]
    async fn test_missing_key_reads_none() {
        let dir = TempDir::new().unwrap();
        let tier = FsTier::new(dir.path(), CacheFileNaming::Raw);
        assert!(tier.read(&CacheKey::new("nope")).await.unwrap().is_none());
        tier.delete(&CacheKey::new("nope")).await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_is_codec_error() {
        let dir = TempDir::new().unwrap();
        let tier = FsTier::new(dir.path(), CacheFileNaming::Raw);
        std::fs::write(dir.path().join("broken"), b"not a record").unwrap();

        let result = tier.read(&CacheKey::new("broken")).await;
        assert!(matches!(result, Err(CacheError::Codec { .. })));
    }

    #[tokio::test]
    async fn test_raw_key_with_separator_cannot_be_written() {
        let dir = TempDir::new().unwrap();
        let tier = FsTier::new(dir.path(), CacheFileNaming::Raw);
        let key = CacheKey::new("search_a/b");

        let result = tier.write(&key, &entry(b"1")).await;
        assert!(matches!(result, Err(CacheError::Io { .. })));
    }

    #[tokio::test]
    async fn test_hashed_naming_accepts_any_key() {
        let dir = TempDir::new().unwrap();
        let tier = FsTier::new(dir.path(), CacheFileNaming::Hashed);
        let key = CacheKey::new("search_a/b");

        tier.write(&key, &entry(b"1")).await.unwrap();
        let read = tier.read(&key).await.unwrap().unwrap();
        assert_eq!(read.value_bytes, b"1".to_vec());
    }

    #[tokio::test]
    async fn test_clear_removes_all_files() {
        let dir = TempDir::new().unwrap();
        let tier = FsTier::new(dir.path(), CacheFileNaming::Raw);
        for i in 0..3 {
            tier.write(&CacheKey::recipe(i), &entry(b"1")).await.unwrap();
        }

        assert_eq!(tier.clear().await.unwrap(), 3);
        assert!(tier.read(&CacheKey::recipe(0)).await.unwrap().is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nested").join("RecipeCache");
        let tier = FsTier::new(&root, CacheFileNaming::Raw);
        assert!(root.is_dir());

        std::fs::remove_dir_all(&root).unwrap();
        tier.write(&CacheKey::recipe(1), &entry(b"1")).await.unwrap();
        assert!(root.join("recipe_1").is_file());
    }
}
