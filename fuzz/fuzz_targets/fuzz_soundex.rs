#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let code = namex::utils::encode(data);
    if data.is_empty() {
        assert!(code.is_empty());
    } else {
        assert_eq!(code.chars().count(), namex::utils::soundex::CODE_LEN);
    }
});
