use crate::index::types::{EngineConfig, DEFAULT_CHUNK_SIZE, DEFAULT_THRESHOLD};
use crate::query::scorer::ScoringWeights;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "namex";
const CONFIG_FILE: &str = "config.json";

/// Prefix for environment variable overrides
const ENV_PREFIX: &str = "NAMEX_";

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Dataset searched when no `--source` is given
    pub source: Option<PathBuf>,

    /// Records per chunk
    pub chunk_size: usize,

    /// Worker threads; 0 uses the number of CPU cores
    pub threads: usize,

    pub delimiter: char,

    /// Composite score a record must exceed
    pub threshold: u8,

    pub fuzzy_weight: f64,
    pub phonetic_weight: f64,

    /// Skip phonetic comparisons that cannot change the result
    pub prune: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let weights = ScoringWeights::default();
        Self {
            source: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            threads: 0,
            delimiter: ',',
            threshold: DEFAULT_THRESHOLD,
            fuzzy_weight: weights.fuzzy,
            phonetic_weight: weights.phonetic,
            prune: true,
        }
    }
}

impl AppConfig {
    /// Load config with priority: environment variables > config file > defaults
    pub fn load() -> Result<Self> {
        let mut config = match get_config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load config from a specific JSON file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save config to the app data directory
    pub fn save(&self) -> Result<PathBuf> {
        let app_dir = get_app_data_dir().context("Could not determine app data directory")?;
        fs::create_dir_all(&app_dir)?;
        let config_path = app_dir.join(CONFIG_FILE);
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content).context("Failed to write config file")?;
        Ok(config_path)
    }

    /// Apply `NAMEX_*` overrides; unparsable values are ignored
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(path) = var("SOURCE") {
            self.source = Some(PathBuf::from(path));
        }
        if let Some(v) = var("CHUNK_SIZE").and_then(|v| v.parse().ok()) {
            self.chunk_size = v;
        }
        if let Some(v) = var("THREADS").and_then(|v| v.parse().ok()) {
            self.threads = v;
        }
        if let Some(v) = var("THRESHOLD").and_then(|v| v.parse().ok()) {
            self.threshold = v;
        }
        if let Some(v) = var("FUZZY_WEIGHT").and_then(|v| v.parse().ok()) {
            self.fuzzy_weight = v;
        }
        if let Some(v) = var("PHONETIC_WEIGHT").and_then(|v| v.parse().ok()) {
            self.phonetic_weight = v;
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            chunk_size: self.chunk_size,
            threads: self.threads,
            delimiter: self.delimiter,
            threshold: self.threshold,
            weights: ScoringWeights {
                fuzzy: self.fuzzy_weight,
                phonetic: self.phonetic_weight,
            },
            prune: self.prune,
        }
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Option<PathBuf> {
    get_app_data_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Get the per-user application data directory
pub fn get_app_data_dir() -> Option<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    base.map(|b| b.join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_engine_defaults() {
        let config = AppConfig::default().engine_config();
        let engine = EngineConfig::default();
        assert_eq!(config.chunk_size, engine.chunk_size);
        assert_eq!(config.threshold, engine.threshold);
        assert_eq!(config.weights, engine.weights);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "chunk_size": 1000, "source": "/data/names.csv" }"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.source, Some(PathBuf::from("/data/names.csv")));
        assert_eq!(config.threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("NAMEX_CHUNK_SIZE", "25"),
            ("NAMEX_FUZZY_WEIGHT", "0.5"),
            ("NAMEX_PHONETIC_WEIGHT", "0.5"),
            ("NAMEX_THREADS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.chunk_size, 25);
        assert_eq!(config.threads, 0);
        assert_eq!(config.engine_config().weights, ScoringWeights::unweighted());
    }
}
