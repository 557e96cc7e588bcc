use crate::index::types::Dataset;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// How many of the most common phonetic codes to report
const TOP_CODES: usize = 10;

/// Summary of the currently served dataset
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStats {
    pub source_path: PathBuf,
    pub loaded: bool,
    pub generation: u64,
    pub record_count: usize,
    pub chunk_count: usize,
    pub largest_chunk: usize,
    pub skipped_lines: usize,
    pub distinct_codes: usize,
    /// Most common phonetic codes with their record counts
    pub top_codes: Vec<(String, usize)>,
    pub load_time_ms: u64,
    /// Source modification time as unix seconds
    pub source_mtime: Option<u64>,
    pub worker_threads: usize,
}

impl DatasetStats {
    pub fn from_dataset(dataset: &Dataset, worker_threads: usize) -> Self {
        let mut code_counts: FxHashMap<&str, usize> = FxHashMap::default();
        for record in dataset.records() {
            *code_counts.entry(record.phonetic_code.as_str()).or_insert(0) += 1;
        }

        let distinct_codes = code_counts.len();
        let mut sorted: Vec<(String, usize)> = code_counts
            .into_iter()
            .map(|(code, count)| (code.to_string(), count))
            .collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        sorted.truncate(TOP_CODES);

        Self {
            source_path: dataset.source_path.clone(),
            loaded: dataset.is_loaded(),
            generation: dataset.generation,
            record_count: dataset.record_count(),
            chunk_count: dataset.chunks.len(),
            largest_chunk: dataset.chunks.iter().map(|c| c.len()).max().unwrap_or(0),
            skipped_lines: dataset.skipped_lines,
            distinct_codes,
            top_codes: sorted,
            load_time_ms: dataset.load_time.as_millis() as u64,
            source_mtime: dataset.source_version.and_then(unix_secs),
            worker_threads,
        }
    }
}

fn unix_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}

/// Display dataset statistics
pub fn show_stats(stats: &DatasetStats) {
    println!("Dataset Statistics");
    println!("==================");
    println!();
    println!("Source:           {}", stats.source_path.display());
    if let Ok(meta) = std::fs::metadata(&stats.source_path) {
        println!("Source size:      {}", format_size(meta.len()));
    }
    if !stats.loaded {
        println!("Status:           not loaded");
        return;
    }
    println!("Generation:       {}", stats.generation);
    println!("Records:          {}", stats.record_count);
    println!("Chunks:           {}", stats.chunk_count);
    println!("Largest chunk:    {}", stats.largest_chunk);
    println!("Skipped lines:    {}", stats.skipped_lines);
    println!("Worker threads:   {}", stats.worker_threads);
    println!("Load time:        {} ms", stats.load_time_ms);

    println!();
    println!("Phonetic codes:   {} distinct", stats.distinct_codes);
    for (code, count) in &stats.top_codes {
        let label = if code.is_empty() { "(empty)" } else { code.as_str() };
        println!("  {:15} {}", label, count);
    }
    if stats.distinct_codes > stats.top_codes.len() {
        println!("  ... and {} more", stats.distinct_codes - stats.top_codes.len());
    }
}

/// Format byte size to human readable
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::Record;

    #[test]
    fn test_stats_from_dataset() {
        let dataset = Dataset {
            chunks: vec![
                vec![Record::new("1", "Robert"), Record::new("2", "Rupert")],
                vec![Record::new("3", "Ann")],
            ],
            source_version: Some(UNIX_EPOCH),
            generation: 2,
            ..Dataset::default()
        };

        let stats = DatasetStats::from_dataset(&dataset, 4);
        assert!(stats.loaded);
        assert_eq!(stats.record_count, 3);
        assert_eq!(stats.chunk_count, 2);
        assert_eq!(stats.largest_chunk, 2);
        assert_eq!(stats.distinct_codes, 2);
        assert_eq!(stats.top_codes[0], ("R163".to_string(), 2));
        assert_eq!(stats.source_mtime, Some(0));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
