pub mod loader;
pub mod stats;
pub mod store;
pub mod types;

pub use loader::Loader;
pub use store::ChunkedStore;
pub use types::*;
