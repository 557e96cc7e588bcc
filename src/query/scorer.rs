//! Composite scoring for name matches
//!
//! A record's score blends the fuzzy similarity (0-100) with a phonetic
//! indicator (100 when the Soundex codes agree, 0 otherwise):
//!
//! ```text
//! composite = round(fuzzy * weights.fuzzy + phonetic * weights.phonetic)
//! ```
//!
//! Records are kept when the composite is strictly above the threshold.

use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};

/// Score contributed by a phonetic match
pub const PHONETIC_MATCH: u8 = 100;

const WEIGHT_EPSILON: f64 = 1e-6;

/// Configurable weights for the two scoring factors (must sum to 1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub fuzzy: f64,
    pub phonetic: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            fuzzy: 0.7,
            phonetic: 0.3,
        }
    }
}

impl ScoringWeights {
    /// Plain average of the two scores
    pub fn unweighted() -> Self {
        Self {
            fuzzy: 0.5,
            phonetic: 0.5,
        }
    }

    /// Ignore the phonetic code entirely
    pub fn fuzzy_only() -> Self {
        Self {
            fuzzy: 1.0,
            phonetic: 0.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let in_range = |w: f64| w.is_finite() && (0.0..=1.0).contains(&w);
        if !in_range(self.fuzzy) || !in_range(self.phonetic) {
            return Err(SearchError::InvalidConfig(format!(
                "weights must be within 0..=1 (fuzzy {}, phonetic {})",
                self.fuzzy, self.phonetic
            )));
        }
        if (self.fuzzy + self.phonetic - 1.0).abs() > WEIGHT_EPSILON {
            return Err(SearchError::InvalidConfig(format!(
                "weights must sum to 1 (fuzzy {} + phonetic {})",
                self.fuzzy, self.phonetic
            )));
        }
        Ok(())
    }
}

/// Applies weights and the inclusion threshold to per-record scores
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: ScoringWeights,
    threshold: u8,
    prune: bool,
}

impl Scorer {
    pub fn new(weights: ScoringWeights, threshold: u8, prune: bool) -> Self {
        Self {
            weights,
            threshold,
            prune,
        }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Weighted blend of a fuzzy score and a phonetic match, rounded
    pub fn composite(&self, fuzzy: u8, phonetic_match: bool) -> u8 {
        let phonetic = if phonetic_match { PHONETIC_MATCH } else { 0 };
        let blended =
            f64::from(fuzzy) * self.weights.fuzzy + f64::from(phonetic) * self.weights.phonetic;
        blended.round().clamp(0.0, 100.0) as u8
    }

    /// Whether a composite score passes the (strict) threshold
    #[inline]
    pub fn includes(&self, composite: u8) -> bool {
        composite > self.threshold
    }

    /// Score a record, returning its composite if it should be included.
    ///
    /// `phonetic_match` is only evaluated when its outcome can matter: with
    /// pruning on, a fuzzy score that fails even with a phonetic match skips
    /// the comparison. The composite is monotone in the phonetic indicator, so
    /// this never changes which records are returned.
    pub fn score(&self, fuzzy: u8, phonetic_match: impl FnOnce() -> bool) -> Option<u8> {
        if self.prune && !self.includes(self.composite(fuzzy, true)) {
            return None;
        }
        let composite = self.composite(fuzzy, phonetic_match());
        self.includes(composite).then_some(composite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_scores_100() {
        let scorer = Scorer::new(ScoringWeights::default(), 80, true);
        assert_eq!(scorer.composite(100, true), 100);
        assert_eq!(scorer.score(100, || true), Some(100));
    }

    #[test]
    fn test_weighted_composite() {
        let scorer = Scorer::new(ScoringWeights::default(), 80, false);
        // 89 * 0.7 + 30 = 92.3
        assert_eq!(scorer.composite(89, true), 92);
        // 78 * 0.7 + 30 = 84.6
        assert_eq!(scorer.composite(78, true), 85);
        assert_eq!(scorer.composite(100, false), 70);
    }

    #[test]
    fn test_unweighted_composite() {
        let scorer = Scorer::new(ScoringWeights::unweighted(), 80, false);
        assert_eq!(scorer.composite(90, true), 95);
        assert_eq!(scorer.composite(90, false), 45);
    }

    #[test]
    fn test_threshold_is_strict() {
        let scorer = Scorer::new(ScoringWeights::fuzzy_only(), 80, true);
        assert!(!scorer.includes(80));
        assert!(scorer.includes(81));
        assert_eq!(scorer.score(80, || true), None);
        assert_eq!(scorer.score(81, || false), Some(81));
    }

    #[test]
    fn test_prune_skips_phonetic_when_hopeless() {
        let scorer = Scorer::new(ScoringWeights::default(), 80, true);
        // 50 * 0.7 + 30 = 65: no phonetic result can pass
        let result = scorer.score(50, || panic!("phonetic comparison should be skipped"));
        assert_eq!(result, None);
    }

    #[test]
    fn test_prune_matches_full_composite() {
        let weights = [
            ScoringWeights::default(),
            ScoringWeights::unweighted(),
            ScoringWeights::fuzzy_only(),
        ];
        for w in weights {
            let pruned = Scorer::new(w, 80, true);
            let full = Scorer::new(w, 80, false);
            for fuzzy in 0..=100u8 {
                for phonetic in [true, false] {
                    assert_eq!(
                        pruned.score(fuzzy, || phonetic),
                        full.score(fuzzy, || phonetic),
                        "fuzzy {fuzzy} phonetic {phonetic} weights {w:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_weight_validation() {
        assert!(ScoringWeights::default().validate().is_ok());
        assert!(ScoringWeights::unweighted().validate().is_ok());
        assert!(ScoringWeights { fuzzy: 0.6, phonetic: 0.6 }.validate().is_err());
        assert!(ScoringWeights { fuzzy: 1.5, phonetic: -0.5 }.validate().is_err());
        assert!(ScoringWeights { fuzzy: f64::NAN, phonetic: 0.0 }.validate().is_err());
    }
}
