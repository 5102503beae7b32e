pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use chrono::Utc;
use tokio::sync::broadcast;
use watchcraft_models::{CatalogEntry, EntryId, EntryUpdate};

use crate::error::{SourceError, SourceResult};

const SUBSCRIBER_BUFFER: usize = 16;

fn new_entry_id() -> EntryId {
    EntryId::new(uuid::Uuid::new_v4().simple().to_string())
}

fn snapshot_channel() -> broadcast::Sender<Vec<CatalogEntry>> {
    broadcast::channel(SUBSCRIBER_BUFFER).0
}

fn publish(sender: &broadcast::Sender<Vec<CatalogEntry>>, snapshot: Vec<CatalogEntry>) {
    // No receivers is the normal case
    let _ = sender.send(snapshot);
}

fn apply_update(entries: &mut [CatalogEntry], id: &EntryId, update: &EntryUpdate) -> SourceResult<()> {
    let entry = entries
        .iter_mut()
        .find(|entry| entry.id == *id)
        .ok_or_else(|| SourceError::NotFound(id.to_string()))?;
    update.apply_to(&mut entry.media);
    entry.updated_at = Utc::now();
    Ok(())
}

fn remove_entry(entries: &mut Vec<CatalogEntry>, id: &EntryId) -> SourceResult<()> {
    let index = entries
        .iter()
        .position(|entry| entry.id == *id)
        .ok_or_else(|| SourceError::NotFound(id.to_string()))?;
    entries.remove(index);
    Ok(())
}
