//! Fuzz test for cache key file naming
//!
//! Any file name produced for a key must be a single path component.
//!
//! Run with: cargo +nightly fuzz run cache_key_fuzz -- -max_total_time=60

#![no_main]

use ladle_core::CacheFileNaming;
use ladle_storage::CacheKey;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let key = CacheKey::new(input);

        for naming in [CacheFileNaming::Raw, CacheFileNaming::Hashed] {
            if let Some(name) = key.file_name(naming) {
                assert!(!name.is_empty());
                assert!(name != "." && name != "..");
                assert!(!name.contains('/') && !name.contains('\\') && !name.contains('\0'));
            }
        }

        assert!(key.file_name(CacheFileNaming::Hashed).is_some());
    }
});
