#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Accepted lines always split into exactly two delimiter-free fields
    if let Some((id, name)) = namex::index::loader::parse_line(data, ',') {
        assert!(!id.contains(','));
        assert!(!name.contains(','));
    }
});
