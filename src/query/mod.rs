pub mod executor;
pub mod scorer;

pub use executor::{CancelToken, SearchEngine};
pub use scorer::{Scorer, ScoringWeights};
