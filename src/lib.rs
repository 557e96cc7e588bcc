//! # namex - Approximate Name Search
//!
//! namex answers "who in this file has a name like X?" over delimited
//! `id,name` datasets. Every record is scored with a blend of a partial
//! string-similarity ratio and a Soundex phonetic match, and records scoring
//! above a threshold are returned.
//!
//! ## Architecture
//!
//! - [`index`] - Dataset model, chunked store and the staleness-aware loader
//! - [`query`] - Composite scoring and the parallel search engine
//! - [`output`] - Result formatting for the CLI
//! - [`utils`] - Soundex, similarity, configuration and logging setup
//!
//! ## Quick Start
//!
//! ```no_run
//! use namex::{EngineConfig, SearchEngine};
//!
//! let engine = SearchEngine::new("people.csv", EngineConfig::default())?;
//!
//! // The first search loads the file; later ones reuse it until it changes
//! for hit in engine.search("John Smith")? {
//!     println!("{}\t{}\t{}", hit.id, hit.name, hit.score);
//! }
//! # Ok::<(), namex::SearchError>(())
//! ```
//!
//! ## Performance
//!
//! Phonetic codes are computed once per record at load time, not per query.
//! Records are split into fixed-size chunks that are scored in parallel on a
//! dedicated worker pool, and the dataset is only re-read when the source
//! file's modification time moves forward.

pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod utils;

pub use error::{Result, SearchError};
pub use index::types::{Dataset, EngineConfig, Record, SearchResult};
pub use query::{CancelToken, ScoringWeights, SearchEngine};
