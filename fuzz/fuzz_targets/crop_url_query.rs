//! Fuzz target for query-string editing of crop URLs.
//!
//! Setting a parameter and re-parsing the output must give back the value
//! that was set.
//!
//! Run with:
//!   cargo +nightly fuzz run crop_url_query

#![no_main]

use facecrop::crop::QueryUrl;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (url, value) = text.split_once('\n').unwrap_or((text, "9:10;20,21"));
    if url.contains('#') {
        return;
    }

    let mut parsed = QueryUrl::parse(url);
    parsed.set("crop", value);
    let reparsed = QueryUrl::parse(&parsed.to_string());
    assert_eq!(reparsed.get("crop").as_deref(), Some(value));
});
