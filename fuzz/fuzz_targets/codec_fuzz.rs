//! Fuzz test for the value codec
//!
//! Feeds arbitrary bytes to the type-erased decoder and the cache entry
//! decoder. Neither may panic, and anything that decodes must survive a
//! re-encode unchanged.
//!
//! Run with: cargo +nightly fuzz run codec_fuzz -- -max_total_time=60

#![no_main]

use ladle_storage::{codec, CacheEntry, CacheValue};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = codec::decode_value(data) {
        let bytes = codec::encode(&value).expect("decoded values are finite");
        let again: CacheValue = codec::decode_value(&bytes).expect("re-encoded value decodes");
        assert_eq!(again, value, "decode/encode/decode must be stable");
    }

    let _ = codec::decode::<CacheEntry>(data);
});
