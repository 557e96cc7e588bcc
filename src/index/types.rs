use crate::error::{Result, SearchError};
use crate::query::scorer::ScoringWeights;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// Default number of records per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 50_000;

/// Default inclusion threshold (a record needs a composite score above this)
pub const DEFAULT_THRESHOLD: u8 = 80;

/// A single (id, name) entry with its precomputed phonetic code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub phonetic_code: String,
}

impl Record {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let phonetic_code = crate::utils::soundex::encode(&name);
        Self {
            id: id.into(),
            name,
            phonetic_code,
        }
    }
}

/// A bounded run of records in file order; the unit of parallel work
pub type Chunk = Vec<Record>;

/// Immutable snapshot of the whole dataset.
///
/// A `Dataset` is never edited after construction; reloads build a new one
/// and swap it into the store.
#[derive(Debug, Default)]
pub struct Dataset {
    pub chunks: Vec<Chunk>,
    /// Modification time of the source this dataset was read from
    pub source_version: Option<SystemTime>,
    pub source_path: PathBuf,
    /// Number of successful rebuilds that produced this dataset (0 = never loaded)
    pub generation: u64,
    pub skipped_lines: usize,
    pub load_time: Duration,
}

impl Dataset {
    /// The empty dataset installed before the first successful load
    pub fn empty(source_path: PathBuf) -> Self {
        Self {
            source_path,
            ..Self::default()
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.source_version.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.iter().all(|c| c.is_empty())
    }

    pub fn record_count(&self) -> usize {
        self.chunks.iter().map(|c| c.len()).sum()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.chunks.iter().flatten()
    }
}

/// A record that passed the composite-score threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub name: String,
    pub score: u8,
}

/// Configuration for loading and searching a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum records per chunk
    pub chunk_size: usize,
    /// Worker threads for search and encoding (0 = available parallelism)
    pub threads: usize,
    /// Field delimiter between id and name
    pub delimiter: char,
    /// Records need a composite score strictly above this to be returned
    pub threshold: u8,
    /// Weights for combining fuzzy and phonetic scores
    pub weights: ScoringWeights,
    /// Skip the phonetic comparison when it cannot change the outcome
    pub prune: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            threads: 0,
            delimiter: ',',
            threshold: DEFAULT_THRESHOLD,
            weights: ScoringWeights::default(),
            prune: true,
        }
    }
}

impl EngineConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(SearchError::InvalidConfig(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if self.threshold > 100 {
            return Err(SearchError::InvalidConfig(format!(
                "threshold {} is outside 0..=100",
                self.threshold
            )));
        }
        self.weights.validate()
    }

    /// Resolve `threads = 0` to the number of available CPUs
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.threads
        }
    }
}
