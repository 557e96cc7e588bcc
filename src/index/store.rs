//! Holder of the currently served dataset.
//!
//! Readers take an `Arc` snapshot and never hold the lock while searching;
//! reloads build a complete replacement off to the side and swap it in.

use crate::index::types::Dataset;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

pub struct ChunkedStore {
    current: RwLock<Arc<Dataset>>,
}

impl ChunkedStore {
    pub fn new(source_path: PathBuf) -> Self {
        Self {
            current: RwLock::new(Arc::new(Dataset::empty(source_path))),
        }
    }

    /// Consistent view of the dataset for the duration of one query
    pub fn snapshot(&self) -> Arc<Dataset> {
        // Poisoning can only interrupt the pointer swap itself, which is atomic
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Atomically install a new dataset, returning the one it replaced.
    ///
    /// Readers holding the previous snapshot keep using it until they drop it.
    pub fn replace(&self, dataset: Dataset) -> Arc<Dataset> {
        let next = Arc::new(dataset);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, next)
    }
}
