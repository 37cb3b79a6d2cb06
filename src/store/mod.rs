//! Persistence gateway.
//!
//! A [`Database`] is a durable key-value store with two partitions
//! ([`Partition::Files`] and [`Partition::Metadata`]). Work happens through
//! [`StoreHandle`]s obtained from [`Database::init`]; every open handle blocks
//! [`Database::destroy`] until it is closed or dropped.

mod backend;
mod fs;
mod records;

pub use backend::{MemoryBackend, StorageBackend};
pub use fs::FsBackend;
pub use records::{
    keys, Blob, FileData, FileMap, FileRecord, FontMap, MetadataRecord, Record,
};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{BridgeError, Result};

/// Bumped only when partition shapes change.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Partition {
    Files,
    Metadata,
}

impl Partition {
    pub const ALL: [Partition; 2] = [Partition::Files, Partition::Metadata];

    pub fn as_str(self) -> &'static str {
        match self {
            Partition::Files => "Files",
            Partition::Metadata => "Metadata",
        }
    }
}

#[derive(Clone)]
pub struct Database {
    backend: Arc<dyn StorageBackend>,
    open_handles: Arc<AtomicUsize>,
}

impl Database {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            open_handles: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Open the filesystem store rooted at `path`.
    pub async fn open_dir(path: impl AsRef<Path>) -> Result<Self> {
        let backend = FsBackend::open(path.as_ref()).await?;
        Ok(Self::new(Arc::new(backend)))
    }

    /// Wipe the filesystem store at `path` unconditionally and reopen it.
    pub async fn reset_dir(path: impl AsRef<Path>) -> Result<Self> {
        let backend = FsBackend::reset(path.as_ref()).await?;
        info!(path = %path.as_ref().display(), "store reset");
        Ok(Self::new(Arc::new(backend)))
    }

    pub fn init(&self) -> StoreHandle {
        let open = self.open_handles.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(open, "opened store handle");
        StoreHandle {
            backend: Arc::clone(&self.backend),
            open_handles: Arc::clone(&self.open_handles),
        }
    }

    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    /// Wipe every partition. Fails while any handle is still open.
    pub async fn destroy(&self) -> Result<()> {
        let open = self.open_handles();
        if open > 0 {
            return Err(BridgeError::database(format!(
                "destroy blocked by {open} open handle(s)"
            )));
        }
        self.backend.clear().await?;
        info!("store destroyed");
        Ok(())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("open_handles", &self.open_handles())
            .finish_non_exhaustive()
    }
}

/// An open connection to a [`Database`]. Closing is explicit via
/// [`StoreHandle::close`] or implicit on drop.
pub struct StoreHandle {
    backend: Arc<dyn StorageBackend>,
    open_handles: Arc<AtomicUsize>,
}

impl StoreHandle {
    /// Upsert a record into `partition`.
    pub async fn put(&self, partition: Partition, record: &Record) -> Result<()> {
        if record.partition() != partition {
            return Err(BridgeError::database(format!(
                "record `{}` does not belong in the {} partition",
                record.key(),
                partition.as_str()
            )));
        }
        let bytes = serde_json::to_vec(record)?;
        self.backend.write(partition, record.key(), bytes).await
    }

    pub async fn get(&self, partition: Partition, key: &str) -> Result<Option<Record>> {
        let Some(bytes) = self.backend.read(partition, key).await? else {
            return Ok(None);
        };
        let record = match partition {
            Partition::Files => Record::File(serde_json::from_slice(&bytes)?),
            Partition::Metadata => Record::Metadata(serde_json::from_slice(&bytes)?),
        };
        Ok(Some(record))
    }

    /// Store `data` under `name` in the Files partition. `None` nulls the record.
    pub async fn put_file(&self, name: &str, data: Option<FileData>) -> Result<()> {
        let record = Record::File(FileRecord {
            name: name.to_string(),
            data,
        });
        self.put(Partition::Files, &record).await
    }

    /// Payload of a Files record; absent and nulled records both read as `None`.
    pub async fn get_file(&self, name: &str) -> Result<Option<FileData>> {
        match self.get(Partition::Files, name).await? {
            Some(Record::File(record)) => Ok(record.data),
            Some(Record::Metadata(_)) | None => Ok(None),
        }
    }

    pub async fn put_metadata(&self, record: MetadataRecord) -> Result<()> {
        self.put(Partition::Metadata, &Record::Metadata(record)).await
    }

    pub async fn get_metadata(&self) -> Result<Option<MetadataRecord>> {
        match self.get(Partition::Metadata, keys::METADATA).await? {
            Some(Record::Metadata(record)) => Ok(Some(record)),
            Some(Record::File(_)) | None => Ok(None),
        }
    }

    pub fn close(self) {
        drop(self);
    }
}

impl Drop for StoreHandle {
    fn drop(&mut self) {
        let open = self.open_handles.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        debug!(open, "closed store handle");
    }
}
