use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Source unavailable: {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Source is not valid UTF-8: {} (line {line})", path.display())]
    Encoding { path: PathBuf, line: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Search cancelled")]
    Cancelled,
}

impl SearchError {
    /// Whether this error came from a failed reload of the source.
    ///
    /// Such failures leave the previously loaded dataset in place.
    pub fn is_reload_failure(&self) -> bool {
        matches!(
            self,
            SearchError::SourceUnavailable { .. } | SearchError::Encoding { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
