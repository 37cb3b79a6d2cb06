//! Filesystem-backed store: one JSON document per record.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{BridgeError, Result};

use super::backend::StorageBackend;
use super::{Partition, SCHEMA_VERSION};

const VERSION_FILE: &str = "version";

#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    /// Open (or create) a store rooted at `root`, checking its schema version.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            BridgeError::database(format!(
                "failed to create store directory {}: {e}",
                root.display()
            ))
        })?;

        let version_path = root.join(VERSION_FILE);
        match tokio::fs::read_to_string(&version_path).await {
            Ok(found) => {
                let found = found.trim();
                if found != SCHEMA_VERSION.to_string() {
                    return Err(BridgeError::database(format!(
                        "store at {} has schema version {found}, expected {SCHEMA_VERSION}; run `qmlbridge reset`",
                        root.display()
                    )));
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tokio::fs::write(&version_path, SCHEMA_VERSION.to_string()).await?;
                info!(path = %root.display(), "initialized store");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self { root })
    }

    /// Drop every partition and stamp the current schema version, whatever
    /// the store held before. Recovers stores written by another version.
    pub async fn reset(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let stale = Self { root: root.clone() };
        stale.clear().await?;
        match tokio::fs::remove_file(root.join(VERSION_FILE)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Self::open(root).await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, partition: Partition, key: &str) -> PathBuf {
        self.root
            .join(partition.as_str())
            .join(format!("{key}.json"))
    }
}

#[async_trait]
impl StorageBackend for FsBackend {
    async fn read(&self, partition: Partition, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.record_path(partition, key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BridgeError::database(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn write(&self, partition: Partition, key: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.record_path(partition, key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // Write-then-rename so a crash never leaves a half-written record.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await.map_err(|e| {
            BridgeError::database(format!("failed to write {}: {e}", tmp.display()))
        })?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(partition = partition.as_str(), key, bytes = bytes.len(), "wrote record");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        for partition in Partition::ALL {
            let dir = self.root.join(partition.as_str());
            match tokio::fs::remove_dir_all(&dir).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(BridgeError::database(format!(
                        "failed to clear {}: {e}",
                        dir.display()
                    )))
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reset_recovers_a_store_with_another_schema_version() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(VERSION_FILE), "99").expect("write version");
        assert!(FsBackend::open(dir.path()).await.is_err());

        let backend = FsBackend::reset(dir.path()).await.expect("reset store");
        assert_eq!(backend.root(), dir.path());
        let version = std::fs::read_to_string(dir.path().join(VERSION_FILE)).expect("version");
        assert_eq!(version.trim(), SCHEMA_VERSION.to_string());
    }

    #[tokio::test]
    async fn write_then_read_round_trips_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FsBackend::open(dir.path()).await.expect("open store");

        backend
            .write(Partition::Files, "Images", b"{}".to_vec())
            .await
            .expect("write");
        let read = backend.read(Partition::Files, "Images").await.expect("read");
        assert_eq!(read.as_deref(), Some(&b"{}"[..]));
        assert!(dir.path().join("Files").join("Images.json").exists());
    }

    #[tokio::test]
    async fn missing_records_read_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FsBackend::open(dir.path()).await.expect("open store");
        let read = backend.read(Partition::Metadata, "Metadata").await.expect("read");
        assert!(read.is_none());
    }

    #[tokio::test]
    async fn rejects_other_schema_versions() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(VERSION_FILE), "99").expect("write version");
        let err = FsBackend::open(dir.path()).await.expect_err("version mismatch");
        assert!(matches!(err, BridgeError::Database(ref m) if m.contains("schema version 99")));
    }

    #[tokio::test]
    async fn clear_removes_both_partitions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FsBackend::open(dir.path()).await.expect("open store");
        backend
            .write(Partition::Files, "QmlFiles", b"1".to_vec())
            .await
            .expect("write");
        backend
            .write(Partition::Metadata, "Metadata", b"2".to_vec())
            .await
            .expect("write");

        backend.clear().await.expect("clear");
        assert!(backend.read(Partition::Files, "QmlFiles").await.expect("read").is_none());
        assert!(backend
            .read(Partition::Metadata, "Metadata")
            .await
            .expect("read")
            .is_none());
        assert!(dir.path().join(VERSION_FILE).exists());
    }
}
