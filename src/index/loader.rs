//! Staleness-aware loading of the delimited source file.
//!
//! The source is stat'ed on every check. When its modification time is newer
//! than the served dataset's, the whole file is re-read, re-chunked and
//! re-encoded, and the result replaces the served dataset in one swap.

use crate::error::{Result, SearchError};
use crate::index::store::ChunkedStore;
use crate::index::types::{Chunk, Dataset, EngineConfig, Record};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Instant, SystemTime};
use tracing::{debug, info};

/// Records read from the source, grouped by chunk but not yet encoded
struct RawChunks {
    chunks: Vec<Vec<(String, String)>>,
    skipped_lines: usize,
}

/// Rebuilds the dataset from the source file when it changes
pub struct Loader {
    source_path: PathBuf,
    delimiter: char,
    chunk_size: usize,
    /// Serializes rebuilds so concurrent callers don't load the same version twice
    reload_lock: Mutex<()>,
}

impl Loader {
    pub fn new(source_path: PathBuf, config: &EngineConfig) -> Self {
        Self {
            source_path,
            delimiter: config.delimiter,
            chunk_size: config.chunk_size.max(1),
            reload_lock: Mutex::new(()),
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Reload the store if the source is newer than what it serves.
    ///
    /// Returns `Ok(true)` when a rebuild was installed. On error the store is
    /// left untouched and its version is not advanced, so the next call retries.
    pub fn ensure_fresh(&self, store: &ChunkedStore, pool: &ThreadPool) -> Result<bool> {
        let version = self.source_version()?;
        if !is_stale(store.snapshot().source_version, version) {
            debug!(path = %self.source_path.display(), "source unchanged");
            return Ok(false);
        }

        let _guard = self.reload_lock.lock().unwrap_or_else(|e| e.into_inner());

        // Another caller may have finished the same reload while we waited
        let current = store.snapshot();
        let version = self.source_version()?;
        if !is_stale(current.source_version, version) {
            return Ok(false);
        }

        let dataset = self.rebuild(version, current.generation + 1, pool)?;
        info!(
            path = %self.source_path.display(),
            generation = dataset.generation,
            records = dataset.record_count(),
            chunks = dataset.chunks.len(),
            skipped = dataset.skipped_lines,
            elapsed_ms = dataset.load_time.as_millis() as u64,
            "dataset reloaded"
        );
        store.replace(dataset);

        Ok(true)
    }

    /// Current modification time of the source
    fn source_version(&self) -> Result<SystemTime> {
        fs::metadata(&self.source_path)
            .and_then(|meta| meta.modified())
            .map_err(|source| self.unavailable(source))
    }

    fn rebuild(&self, version: SystemTime, generation: u64, pool: &ThreadPool) -> Result<Dataset> {
        let start = Instant::now();
        let raw = self.read_chunks()?;

        // Encode chunks in parallel; collecting an indexed iterator keeps file order
        let chunks: Vec<Chunk> = pool.install(|| {
            raw.chunks
                .into_par_iter()
                .map(|rows| {
                    rows.into_iter()
                        .map(|(id, name)| Record::new(id, name))
                        .collect()
                })
                .collect()
        });

        Ok(Dataset {
            chunks,
            source_version: Some(version),
            source_path: self.source_path.clone(),
            generation,
            skipped_lines: raw.skipped_lines,
            load_time: start.elapsed(),
        })
    }

    fn read_chunks(&self) -> Result<RawChunks> {
        let file = File::open(&self.source_path).map_err(|e| self.unavailable(e))?;
        let reader = BufReader::with_capacity(64 * 1024, file);

        let mut chunks = Vec::new();
        let mut current: Vec<(String, String)> = Vec::with_capacity(self.chunk_size.min(4096));
        let mut skipped_lines = 0;

        // Line 1 is the header
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| self.read_error(e, idx + 1))?;
            if idx == 0 {
                continue;
            }

            let Some((id, name)) = parse_line(&line, self.delimiter) else {
                skipped_lines += 1;
                continue;
            };

            current.push((id.to_string(), name.to_string()));
            if current.len() >= self.chunk_size {
                chunks.push(std::mem::take(&mut current));
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        Ok(RawChunks {
            chunks,
            skipped_lines,
        })
    }

    fn unavailable(&self, source: io::Error) -> SearchError {
        SearchError::SourceUnavailable {
            path: self.source_path.clone(),
            source,
        }
    }

    fn read_error(&self, err: io::Error, line: usize) -> SearchError {
        if err.kind() == io::ErrorKind::InvalidData {
            SearchError::Encoding {
                path: self.source_path.clone(),
                line,
            }
        } else {
            self.unavailable(err)
        }
    }
}

#[inline]
fn is_stale(loaded: Option<SystemTime>, on_disk: SystemTime) -> bool {
    loaded.is_none_or(|loaded| on_disk > loaded)
}

/// Split a line into exactly two fields.
///
/// Returns `None` for lines with no delimiter or more than one. A trailing
/// carriage return is dropped so CRLF files load cleanly.
pub fn parse_line(line: &str, delimiter: char) -> Option<(&str, &str)> {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if delimiter.is_ascii() {
        let bytes = line.as_bytes();
        let pos = memchr::memchr(delimiter as u8, bytes)?;
        if memchr::memchr(delimiter as u8, &bytes[pos + 1..]).is_some() {
            return None;
        }
        return Some((&line[..pos], &line[pos + 1..]));
    }

    let mut fields = line.splitn(3, delimiter);
    match (fields.next(), fields.next(), fields.next()) {
        (Some(id), Some(name), None) => Some((id, name)),
        _ => None,
    }
}
