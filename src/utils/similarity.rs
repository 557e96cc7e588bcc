//! Partial string similarity on a 0-100 scale.
//!
//! The shorter string is slid across the longer one and every alignment is
//! scored with the normalized indel similarity `2 * LCS / (len_a + len_b)`.
//! Alignments include the partial windows that hang off either end of the
//! longer string, so "Smith" still scores well against "Smithson" and
//! "Jo Smith" against "Smith".

use rustc_hash::FxHashMap;
use std::cmp::Ordering;

/// A 0-100 similarity score between two strings.
///
/// The query side is prepared once per search and then scored against every
/// candidate. Implementations must be symmetric enough for ranking names and
/// must return 100 for identical non-empty inputs.
pub trait Similarity: Send + Sync {
    /// Query-side state shared by all workers of one search
    type Query: Send + Sync;

    fn prepare(&self, query: &str) -> Self::Query;

    fn score(&self, query: &Self::Query, candidate: &str) -> u8;

    fn similarity(&self, candidate: &str, query: &str) -> u8 {
        self.score(&self.prepare(query), candidate)
    }
}

/// Case-insensitive partial ratio
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialRatio;

impl Similarity for PartialRatio {
    type Query = PreparedQuery;

    fn prepare(&self, query: &str) -> PreparedQuery {
        PreparedQuery::new(query)
    }

    fn score(&self, query: &PreparedQuery, candidate: &str) -> u8 {
        query.ratio(candidate)
    }
}

impl<F> Similarity for F
where
    F: Fn(&str, &str) -> u8 + Send + Sync,
{
    type Query = String;

    fn prepare(&self, query: &str) -> String {
        query.to_string()
    }

    fn score(&self, query: &String, candidate: &str) -> u8 {
        self(candidate, query)
    }
}

/// Compute the partial ratio of two strings.
///
/// Returns 0 when either side is empty.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    PreparedQuery::new(b).ratio(a)
}

fn lowercase_chars(s: &str) -> Vec<char> {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// A lowercased query with its LCS kernel built once
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    chars: Vec<char>,
    pattern: LcsPattern,
}

impl PreparedQuery {
    pub fn new(query: &str) -> Self {
        let chars = lowercase_chars(query);
        let pattern = LcsPattern::new(&chars);
        Self { chars, pattern }
    }

    /// Partial ratio of `candidate` against the prepared query
    pub fn ratio(&self, candidate: &str) -> u8 {
        let query = &self.chars;
        let other = lowercase_chars(candidate);
        if query.is_empty() || other.is_empty() {
            return 0;
        }
        if *query == other {
            return 100;
        }

        let best = match query.len().cmp(&other.len()) {
            Ordering::Less => best_alignment(&self.pattern, query.len(), &other),
            Ordering::Greater => best_alignment(&LcsPattern::new(&other), other.len(), query),
            // Equal lengths: score both directions so the result is symmetric
            Ordering::Equal => {
                let forward = best_alignment(&self.pattern, query.len(), &other);
                if forward < 1.0 {
                    forward.max(best_alignment(&LcsPattern::new(&other), other.len(), query))
                } else {
                    forward
                }
            }
        };

        (best * 100.0).round().min(100.0) as u8
    }
}

/// Best normalized indel similarity of an `m`-character pattern against any
/// window of `long`
fn best_alignment(lcs: &LcsPattern, m: usize, long: &[char]) -> f64 {
    let n = long.len();
    let mut best = 0.0f64;

    let mut consider = |window: &[char]| -> bool {
        let common = lcs.against(window);
        let ratio = 2.0 * common as f64 / (m + window.len()) as f64;
        if ratio > best {
            best = ratio;
        }
        common == m && window.len() == m
    };

    // Windows entering from the left edge
    for end in 1..m {
        if consider(&long[..end]) {
            return 1.0;
        }
    }
    // Full-length windows
    for start in 0..=n - m {
        if consider(&long[start..start + m]) {
            return 1.0;
        }
    }
    // Windows leaving through the right edge
    for start in (n - m + 1)..n {
        if consider(&long[start..]) {
            return 1.0;
        }
    }

    best
}

/// Longest-common-subsequence kernel for a fixed pattern.
///
/// Patterns of up to 64 characters use the bit-parallel algorithm of
/// Allison-Dix / Hyyrö, one machine word per text character. Longer patterns
/// fall back to a single-row dynamic program.
#[derive(Debug, Clone)]
enum LcsPattern {
    BitParallel {
        ascii: [u64; 128],
        other: FxHashMap<char, u64>,
        mask: u64,
    },
    Dynamic(Vec<char>),
}

impl LcsPattern {
    fn new(pattern: &[char]) -> Self {
        if pattern.len() > 64 {
            return LcsPattern::Dynamic(pattern.to_vec());
        }

        let mut ascii = [0u64; 128];
        let mut other = FxHashMap::default();
        for (i, &c) in pattern.iter().enumerate() {
            let bit = 1u64 << i;
            if c.is_ascii() {
                ascii[c as usize] |= bit;
            } else {
                *other.entry(c).or_insert(0) |= bit;
            }
        }
        let mask = if pattern.len() == 64 {
            u64::MAX
        } else {
            (1u64 << pattern.len()) - 1
        };

        LcsPattern::BitParallel { ascii, other, mask }
    }

    fn against(&self, text: &[char]) -> usize {
        match self {
            LcsPattern::BitParallel { ascii, other, mask } => {
                let mut s = u64::MAX;
                for &c in text {
                    let matches = if c.is_ascii() {
                        ascii[c as usize]
                    } else {
                        other.get(&c).copied().unwrap_or(0)
                    };
                    let u = s & matches;
                    s = s.wrapping_add(u) | (s - u);
                }
                (!s & mask).count_ones() as usize
            }
            LcsPattern::Dynamic(pattern) => lcs_dynamic(pattern, text),
        }
    }
}

fn lcs_dynamic(pattern: &[char], text: &[char]) -> usize {
    let mut row = vec![0usize; text.len() + 1];
    for &p in pattern {
        let mut diagonal = 0;
        for (j, &t) in text.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if p == t {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[text.len()]
}
