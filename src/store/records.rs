//! Records kept in the two store partitions.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::types::{MetadataDocument, QmlDirectory};

use super::Partition;

/// Well-known record keys.
pub mod keys {
    pub const UPLOADED_FILE: &str = "UploadedFile";
    pub const EXTRACTED_FILES: &str = "ExtractedFiles";
    pub const IMAGES: &str = "Images";
    pub const FONTS: &str = "Fonts";
    pub const QML_FILES: &str = "QmlFiles";
    pub const METADATA: &str = "Metadata";
}

/// Binary payload, base64-encoded when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob(pub Vec<u8>);

impl Blob {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Blob(bytes)
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        Blob(bytes.to_vec())
    }
}

impl Serialize for Blob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64_STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Blob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64_STANDARD
            .decode(encoded)
            .map(Blob)
            .map_err(serde::de::Error::custom)
    }
}

/// Path (or filename) to bytes.
pub type FileMap = BTreeMap<String, Blob>;

/// Family name to its variant files.
pub type FontMap = BTreeMap<String, FileMap>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum FileData {
    Upload { file_name: String, bytes: Blob },
    Files(FileMap),
    Fonts(FontMap),
    QmlTree(QmlDirectory),
}

/// A `Files` partition record; `data: None` marks a reclaimed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub data: Option<FileData>,
}

/// The `Metadata` partition record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub key: String,
    #[serde(rename = "FileName")]
    pub file_name: String,
    #[serde(rename = "Metadata")]
    pub metadata: MetadataDocument,
}

impl MetadataRecord {
    pub fn new(file_name: impl Into<String>, metadata: MetadataDocument) -> Self {
        Self {
            key: keys::METADATA.to_string(),
            file_name: file_name.into(),
            metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    File(FileRecord),
    Metadata(MetadataRecord),
}

impl Record {
    pub fn key(&self) -> &str {
        match self {
            Record::File(record) => &record.name,
            Record::Metadata(record) => &record.key,
        }
    }

    pub fn partition(&self) -> Partition {
        match self {
            Record::File(_) => Partition::Files,
            Record::Metadata(_) => Partition::Metadata,
        }
    }
}
