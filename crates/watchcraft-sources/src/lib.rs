pub mod error;
pub mod omdb;
pub mod store;
pub mod traits;

pub use error::SourceError;
pub use omdb::OmdbClient;
pub use store::{JsonFileStore, MemoryStore};
pub use traits::{MetadataProvider, SearchResult, WatchlistStore, WatchlistSubscription};
