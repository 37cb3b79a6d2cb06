//! Upload boundary: accept a `.qtbridge` archive into a freshly wiped store.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::config::UploadConfig;
use crate::error::{BridgeError, Result};
use crate::store::{keys, Blob, Database, FileData};

pub const UPLOAD_EXTENSION: &str = ".qtbridge";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub file_name: String,
    pub size_bytes: u64,
}

/// Check the filename token and the size ceiling.
pub fn validate_upload(file_name: &str, size: u64, limits: &UploadConfig) -> Result<()> {
    if !file_name.to_ascii_lowercase().ends_with(UPLOAD_EXTENSION) {
        return Err(BridgeError::upload(format!(
            "`{file_name}` is not a {UPLOAD_EXTENSION} file"
        )));
    }
    if size > limits.max_size_bytes {
        return Err(BridgeError::upload(format!(
            "`{file_name}` is {size} bytes; the limit is {} bytes",
            limits.max_size_bytes
        )));
    }
    Ok(())
}

/// Validate, wipe the store and persist the archive bytes.
///
/// Wiping fails with a database error while other handles are open.
pub async fn upload(
    db: &Database,
    file_name: &str,
    bytes: Vec<u8>,
    limits: &UploadConfig,
) -> Result<UploadReceipt> {
    let file_name = base_name(file_name);
    let size_bytes = bytes.len() as u64;
    validate_upload(&file_name, size_bytes, limits)?;

    db.destroy().await?;

    let handle = db.init();
    let stored = handle
        .put_file(
            keys::UPLOADED_FILE,
            Some(FileData::Upload {
                file_name: file_name.clone(),
                bytes: Blob(bytes),
            }),
        )
        .await;
    handle.close();
    stored?;

    info!(file = %file_name, size_bytes, "stored upload");
    Ok(UploadReceipt {
        file_name,
        size_bytes,
    })
}

fn base_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string())
}
