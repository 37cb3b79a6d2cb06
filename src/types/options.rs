use serde::{Deserialize, Serialize};

/// Caller-selected switches for one transformation run.
///
/// `add_ids` and `add_unique_ids` are kept mutually exclusive by the caller;
/// when both are set the transformer prefers `add_ids`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationOptions {
    #[serde(rename = "addIDs")]
    pub add_ids: bool,
    #[serde(rename = "addUniqueIDs")]
    pub add_unique_ids: bool,
    pub add_object_names: bool,
    pub download_fonts: bool,
}

/// Where an `id:` property takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    QmlId,
    Uuid,
}

impl TransformationOptions {
    pub fn id_source(&self) -> Option<IdSource> {
        if self.add_ids {
            Some(IdSource::QmlId)
        } else if self.add_unique_ids {
            Some(IdSource::Uuid)
        } else {
            None
        }
    }

    /// Enable `add_ids`, clearing `add_unique_ids` (last toggle wins).
    pub fn toggle_ids(mut self, on: bool) -> Self {
        self.add_ids = on;
        if on {
            self.add_unique_ids = false;
        }
        self
    }

    /// Enable `add_unique_ids`, clearing `add_ids` (last toggle wins).
    pub fn toggle_unique_ids(mut self, on: bool) -> Self {
        self.add_unique_ids = on;
        if on {
            self.add_ids = false;
        }
        self
    }
}
