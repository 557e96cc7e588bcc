#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Pair<'a> {
    a: &'a str,
    b: &'a str,
}

fuzz_target!(|pair: Pair| {
    let score = namex::utils::partial_ratio(pair.a, pair.b);
    assert!(score <= 100);
    assert_eq!(score, namex::utils::partial_ratio(pair.b, pair.a));
});
