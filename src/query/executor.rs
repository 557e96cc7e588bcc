//! The search engine.
//!
//! Every search first asks the loader to refresh the dataset, then scores
//! each chunk on its own rayon task. The query's phonetic code and similarity
//! state are computed once and shared by all tasks.

use crate::error::{Result, SearchError};
use crate::index::loader::Loader;
use crate::index::stats::DatasetStats;
use crate::index::store::ChunkedStore;
use crate::index::types::{Chunk, Dataset, EngineConfig, SearchResult};
use crate::query::scorer::Scorer;
use crate::utils::similarity::{PartialRatio, Similarity};
use crate::utils::soundex;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{trace, warn};

/// How many records a worker scores between cancellation checks
const CANCEL_CHECK_INTERVAL: usize = 256;

/// Cooperative cancellation flag shared between a caller and a running search
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Approximate name search over a chunked, auto-reloading dataset
pub struct SearchEngine<S: Similarity = PartialRatio> {
    store: ChunkedStore,
    loader: Loader,
    pool: ThreadPool,
    scorer: Scorer,
    similarity: S,
}

impl SearchEngine<PartialRatio> {
    /// Create an engine for a source file. Nothing is read until the first
    /// search or refresh.
    pub fn new(source_path: impl Into<PathBuf>, config: EngineConfig) -> Result<Self> {
        Self::with_similarity(source_path, config, PartialRatio)
    }
}

impl<S: Similarity> SearchEngine<S> {
    /// Create an engine with a custom similarity function
    pub fn with_similarity(
        source_path: impl Into<PathBuf>,
        config: EngineConfig,
        similarity: S,
    ) -> Result<Self> {
        config.validate()?;
        let source_path = source_path.into();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.effective_threads())
            .thread_name(|i| format!("namex-worker-{i}"))
            .build()
            .map_err(|e| SearchError::InvalidConfig(format!("worker pool: {e}")))?;

        Ok(Self {
            store: ChunkedStore::new(source_path.clone()),
            loader: Loader::new(source_path, &config),
            pool,
            scorer: Scorer::new(config.weights, config.threshold, config.prune),
            similarity,
        })
    }

    pub fn source_path(&self) -> &Path {
        self.loader.source_path()
    }

    /// Reload the dataset if the source changed; `Ok(true)` if it was rebuilt
    pub fn refresh(&self) -> Result<bool> {
        self.loader.ensure_fresh(&self.store, &self.pool)
    }

    /// Currently served dataset
    pub fn snapshot(&self) -> Arc<Dataset> {
        self.store.snapshot()
    }

    pub fn stats(&self) -> DatasetStats {
        DatasetStats::from_dataset(&self.store.snapshot(), self.pool.current_num_threads())
    }

    /// Find records whose composite score beats the threshold.
    ///
    /// Results are unordered.
    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.search_with_cancel(query, &CancelToken::new())
    }

    /// Like [`search`](Self::search), aborting with [`SearchError::Cancelled`]
    /// once `cancel` fires.
    pub fn search_with_cancel(
        &self,
        query: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<SearchResult>> {
        let dataset = self.fresh_snapshot()?;
        if dataset.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let query_code = soundex::encode(query);
        let prepared = self.similarity.prepare(query);

        // One task per chunk, each accumulating privately; collect is the only merge point
        let per_chunk: Vec<Vec<SearchResult>> = self.pool.install(|| {
            dataset
                .chunks
                .par_iter()
                .map(|chunk| self.score_chunk(chunk, &prepared, &query_code, cancel))
                .collect::<Result<Vec<_>>>()
        })?;

        let mut results = Vec::with_capacity(per_chunk.iter().map(Vec::len).sum());
        for chunk_results in per_chunk {
            results.extend(chunk_results);
        }

        trace!(
            query = %query,
            chunks = dataset.chunks.len(),
            matches = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "search complete"
        );

        Ok(results)
    }

    /// Refresh if needed and return the dataset to search.
    ///
    /// A failed refresh is only fatal when nothing was ever loaded; otherwise
    /// the last good dataset keeps serving.
    fn fresh_snapshot(&self) -> Result<Arc<Dataset>> {
        if let Err(err) = self.refresh() {
            let current = self.store.snapshot();
            if !current.is_loaded() {
                return Err(err);
            }
            warn!(
                error = %err,
                generation = current.generation,
                "refresh failed, serving previously loaded dataset"
            );
            return Ok(current);
        }
        Ok(self.store.snapshot())
    }

    fn score_chunk(
        &self,
        chunk: &Chunk,
        query: &S::Query,
        query_code: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<SearchResult>> {
        let mut matches = Vec::new();

        for (i, record) in chunk.iter().enumerate() {
            if i % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }

            let fuzzy = self.similarity.score(query, &record.name);
            let composite = self
                .scorer
                .score(fuzzy, || record.phonetic_code == query_code);

            if let Some(score) = composite {
                matches.push(SearchResult {
                    id: record.id.clone(),
                    name: record.name.clone(),
                    score,
                });
            }
        }

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::scorer::ScoringWeights;
    use std::fs;
    use tempfile::TempDir;

    fn engine_for(content: &str, config: EngineConfig) -> (TempDir, SearchEngine) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("names.csv");
        fs::write(&path, content).unwrap();
        let engine = SearchEngine::new(path, config).unwrap();
        (dir, engine)
    }

    fn ids(results: &[SearchResult]) -> Vec<String> {
        let mut ids: Vec<String> = results.iter().map(|r| r.id.clone()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_exact_match_always_included() {
        let (_dir, engine) = engine_for(
            "id,name\n1,Margaret Thatcher\n2,Someone Else\n",
            EngineConfig::default(),
        );
        let results = engine.search("Margaret Thatcher").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "1");
        assert_eq!(results[0].score, 100);
    }

    #[test]
    fn test_results_span_chunks() {
        let mut content = String::from("id,name\n");
        for i in 0..20 {
            let name = if i % 5 == 0 { "Robert Smith" } else { "Xavier Quinn" };
            content.push_str(&format!("{i},{name}\n"));
        }
        let (_dir, engine) = engine_for(&content, EngineConfig::default().with_chunk_size(3));

        let results = engine.search("Robert Smith").unwrap();
        assert_eq!(ids(&results), vec!["0", "10", "15", "5"]);
        assert_eq!(engine.snapshot().chunks.len(), 7);
    }

    #[test]
    fn test_empty_dataset_returns_nothing() {
        let (_dir, engine) = engine_for("id,name\n", EngineConfig::default());
        assert!(engine.search("Anyone").unwrap().is_empty());
    }

    #[test]
    fn test_threshold_boundary_with_custom_similarity() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("names.csv");
        fs::write(&path, "id,name\n80,eighty\n81,eighty-one\n").unwrap();

        let config = EngineConfig {
            weights: ScoringWeights::fuzzy_only(),
            ..EngineConfig::default()
        };
        let score_by_id = |name: &str, _query: &str| -> u8 {
            if name == "eighty" { 80 } else { 81 }
        };
        let engine = SearchEngine::with_similarity(&path, config, score_by_id).unwrap();

        let results = engine.search("anything").unwrap();
        assert_eq!(ids(&results), vec!["81"]);
        assert_eq!(results[0].score, 81);
    }

    /// Exact-match similarity that counts how often a query is prepared
    #[derive(Default)]
    struct CountingExact {
        prepared: std::sync::atomic::AtomicUsize,
    }

    impl Similarity for CountingExact {
        type Query = String;

        fn prepare(&self, query: &str) -> String {
            self.prepared.fetch_add(1, Ordering::SeqCst);
            query.to_lowercase()
        }

        fn score(&self, query: &String, candidate: &str) -> u8 {
            if candidate.to_lowercase() == *query { 100 } else { 0 }
        }
    }

    #[test]
    fn test_query_prepared_once_per_search() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("names.csv");
        let mut content = String::from("id,name\n");
        for i in 0..40 {
            content.push_str(&format!("{i},Name {}\n", i % 4));
        }
        fs::write(&path, content).unwrap();

        let config = EngineConfig {
            weights: ScoringWeights::fuzzy_only(),
            ..EngineConfig::default().with_chunk_size(3)
        };
        let engine = SearchEngine::with_similarity(&path, config, CountingExact::default()).unwrap();

        let results = engine.search("NAME 1").unwrap();
        assert_eq!(results.len(), 10);
        assert_eq!(engine.similarity.prepared.load(Ordering::SeqCst), 1);

        engine.search("name 2").unwrap();
        assert_eq!(engine.similarity.prepared.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cancelled_search_returns_error() {
        let (_dir, engine) = engine_for("id,name\n1,Ann\n", EngineConfig::default());
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = engine.search_with_cancel("Ann", &cancel).unwrap_err();
        assert!(matches!(err, SearchError::Cancelled));
    }

    #[test]
    fn test_missing_source_before_first_load() {
        let dir = TempDir::new().unwrap();
        let engine = SearchEngine::new(dir.path().join("nope.csv"), EngineConfig::default()).unwrap();

        let err = engine.search("Ann").unwrap_err();
        assert!(matches!(err, SearchError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            weights: ScoringWeights { fuzzy: 0.9, phonetic: 0.9 },
            ..EngineConfig::default()
        };
        assert!(matches!(
            SearchEngine::new("names.csv", config),
            Err(SearchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_refresh_reports_reload() {
        let (_dir, engine) = engine_for("id,name\n1,Ann\n", EngineConfig::default());
        assert!(engine.refresh().unwrap());
        assert!(!engine.refresh().unwrap());
        assert_eq!(engine.stats().generation, 1);
    }
}
