//! Fuzz target for Face API `detect` response normalization.
//!
//! Rectangles come straight from the wire, so `left + width` style sums must
//! not panic on extreme values.
//!
//! Run with:
//!   cargo +nightly fuzz run face_rect_response_normalize

#![no_main]

use facecrop::detection::face_rect;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(raw) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let _ = face_rect::normalize(&raw);
});
