use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::Result;

use super::Partition;

/// Raw key-value storage under named partitions. Writes are upserts.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn read(&self, partition: Partition, key: &str) -> Result<Option<Vec<u8>>>;

    async fn write(&self, partition: Partition, key: &str, bytes: Vec<u8>) -> Result<()>;

    /// Remove every record in every partition.
    async fn clear(&self) -> Result<()>;
}

/// Process-local backend; contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<HashMap<(Partition, String), Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn read(&self, partition: Partition, key: &str) -> Result<Option<Vec<u8>>> {
        let records = self.records.read().await;
        Ok(records.get(&(partition, key.to_string())).cloned())
    }

    async fn write(&self, partition: Partition, key: &str, bytes: Vec<u8>) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert((partition, key.to_string()), bytes);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.records.write().await.clear();
        Ok(())
    }
}
