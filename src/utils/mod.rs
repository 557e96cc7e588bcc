//! Utility functions and data structures.
//!
//! ## Modules
//!
//! - [`app_data`] - Per-user configuration file and environment overrides
//! - [`logging`] - `tracing` subscriber setup for the CLI
//! - [`similarity`] - Partial ratio string similarity (0-100)
//! - [`soundex`] - American Soundex phonetic codes
//!
//! ## Key Functions
//!
//! ```no_run
//! use namex::utils::{encode, partial_ratio};
//!
//! assert_eq!(encode("Robert"), "R163");
//! assert_eq!(partial_ratio("Smith", "Jon Smith"), 100);
//! ```

pub mod app_data;
pub mod logging;
pub mod similarity;
pub mod soundex;

pub use app_data::*;
pub use similarity::{partial_ratio, PartialRatio, PreparedQuery, Similarity};
pub use soundex::encode;
