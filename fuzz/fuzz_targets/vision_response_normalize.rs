//! Fuzz target for Vision `images:annotate` response normalization.
//!
//! Run with:
//!   cargo +nightly fuzz run vision_response_normalize

#![no_main]

use facecrop::detection::vision;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Responses are small; anything past 1MB is not interesting.
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(raw) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let _ = vision::normalize(&raw);
});
