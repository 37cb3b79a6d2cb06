use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every failure surfaced by the library is one of these kinds.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Font download error: {0}")]
    FontDownload(String),

    #[error("File processing error: {0}")]
    FileProcessor(String),

    #[error("Unexpected error: {0}")]
    Unclassified(String),
}

impl BridgeError {
    pub fn upload(message: impl Into<String>) -> Self {
        BridgeError::Upload(message.into())
    }

    pub fn archive(message: impl Into<String>) -> Self {
        BridgeError::Archive(message.into())
    }

    pub fn metadata(message: impl Into<String>) -> Self {
        BridgeError::Metadata(message.into())
    }

    pub fn database(message: impl Into<String>) -> Self {
        BridgeError::Database(message.into())
    }

    pub fn font_download(message: impl Into<String>) -> Self {
        BridgeError::FontDownload(message.into())
    }

    pub fn file_processor(message: impl Into<String>) -> Self {
        BridgeError::FileProcessor(message.into())
    }

    /// Pass a known error through untouched; wrap anything else as `Unclassified`.
    pub fn classify<E>(err: E) -> Self
    where
        E: Into<ClassifiedError>,
    {
        match err.into() {
            ClassifiedError::Known(known) => known,
            ClassifiedError::Foreign(message) => BridgeError::Unclassified(message),
        }
    }

    /// Wrap into `FontDownload` unless the error already is one.
    pub fn into_font_download(self) -> Self {
        match self {
            BridgeError::FontDownload(_) => self,
            other => BridgeError::FontDownload(other.message().to_string()),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            BridgeError::Upload(m)
            | BridgeError::Archive(m)
            | BridgeError::Metadata(m)
            | BridgeError::Database(m)
            | BridgeError::FontDownload(m)
            | BridgeError::FileProcessor(m)
            | BridgeError::Unclassified(m) => m,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            BridgeError::Upload(_) => ErrorCategory::Upload,
            BridgeError::Archive(_) => ErrorCategory::Archive,
            BridgeError::Metadata(_) => ErrorCategory::Metadata,
            BridgeError::Database(_) => ErrorCategory::Database,
            BridgeError::FontDownload(_) => ErrorCategory::FontDownload,
            BridgeError::FileProcessor(_) => ErrorCategory::FileProcessor,
            BridgeError::Unclassified(_) => ErrorCategory::Unclassified,
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        let remediation = match self {
            BridgeError::Upload(_) => {
                "Select a .qtbridge export no larger than 10 MiB and upload it again."
            }
            BridgeError::Archive(msg) => {
                if msg.to_ascii_lowercase().contains("nothing to package") {
                    "Run `qmlbridge process` before packaging; the store holds no output yet."
                } else {
                    "Re-export the design from QtBridge; the archive could not be read."
                }
            }
            BridgeError::Metadata(_) => {
                "Ensure the archive contains a .metadata document produced by QtBridge."
            }
            BridgeError::Database(msg) => {
                if msg.to_ascii_lowercase().contains("blocked") {
                    "Close other running qmlbridge commands before resetting the store."
                } else {
                    "Check --store-dir permissions and free disk space."
                }
            }
            BridgeError::FontDownload(_) => {
                "Check connectivity and QMLBRIDGE_FONTS_API_KEY; the family may not exist upstream."
            }
            BridgeError::FileProcessor(_) => "Re-run `qmlbridge process` with --verbose for details.",
            BridgeError::Unclassified(_) => "Re-run with --verbose; file an issue if persistent.",
        };
        ErrorPayload::new(self.category(), self.message().to_string(), remediation)
    }
}

/// Intermediate used by [`BridgeError::classify`].
pub enum ClassifiedError {
    Known(BridgeError),
    Foreign(String),
}

impl From<BridgeError> for ClassifiedError {
    fn from(err: BridgeError) -> Self {
        ClassifiedError::Known(err)
    }
}

impl From<std::io::Error> for ClassifiedError {
    fn from(err: std::io::Error) -> Self {
        ClassifiedError::Foreign(err.to_string())
    }
}

impl From<serde_json::Error> for ClassifiedError {
    fn from(err: serde_json::Error) -> Self {
        ClassifiedError::Foreign(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ClassifiedError {
    fn from(err: tokio::task::JoinError) -> Self {
        ClassifiedError::Foreign(err.to_string())
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Database(format!("record serialization failed: {err}"))
    }
}

/// The request URL is dropped; it can carry the fonts API key.
impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        BridgeError::FontDownload(err.without_url().to_string())
    }
}

impl From<zip::result::ZipError> for BridgeError {
    fn from(err: zip::result::ZipError) -> Self {
        BridgeError::Archive(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    Upload,
    Archive,
    Metadata,
    Database,
    FontDownload,
    FileProcessor,
    Unclassified,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
