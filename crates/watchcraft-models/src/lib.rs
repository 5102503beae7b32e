pub mod entry;
pub mod error;
pub mod media;
pub mod person;
pub mod progress;
pub mod runtime;
pub mod status;
pub mod update;

pub use entry::{estimate_total_episodes, CatalogEntry, EntryId, MediaEntry, EPISODES_PER_SEASON};
pub use error::ModelError;
pub use media::MediaType;
pub use person::PersonName;
pub use progress::{EpisodePosition, ViewingProgress};
pub use runtime::format_runtime;
pub use status::WatchStatus;
pub use update::EntryUpdate;
