//! Design-tree types parsed from a QtBridge `.metadata` document.
//!
//! All optional fields are true optionals; a missing field is omitted from
//! the generated code rather than rejected.

use serde::{Deserialize, Serialize};

use crate::alignment::AlignSide;

/// Root of a `.metadata` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDocument {
    #[serde(default)]
    pub artboards: Vec<DesignNode>,
    #[serde(default)]
    pub artboard_sets: Vec<ArtboardSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_info: Option<DocumentInfo>,
}

/// A named group of artboards, one reusable component with variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtboardSet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artboards: Vec<DesignNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    #[serde(default)]
    pub name: String,
}

/// One element of the design hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignNode {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_index: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DesignNode>,
    #[serde(default)]
    pub metadata: DesignMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qml_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qml_properties: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, alias = "qmlVisible", skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<Transformation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_details: Option<TextDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_data: Option<AssetRef>,
}

/// Which type-specific block a node carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeCapability<'a> {
    Text(&'a TextDetails),
    Image(&'a AssetRef),
    Generic,
}

impl DesignMetadata {
    /// Text wins when a malformed node carries both text and asset data.
    pub fn capability(&self) -> NodeCapability<'_> {
        match (&self.text_details, &self.asset_data) {
            (Some(text), _) => NodeCapability::Text(text),
            (None, Some(asset)) => NodeCapability::Image(asset),
            (None, None) => NodeCapability::Generic,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDetails {
    #[serde(default)]
    pub contents: String,
    #[serde(default)]
    pub text_color: String,
    #[serde(default)]
    pub font_family: String,
    #[serde(default)]
    pub font_display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kerning: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_alignment: Option<AlignSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_alignment: Option<AlignSide>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transformation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default)]
    pub flipped_horizontally: bool,
    #[serde(default)]
    pub flipped_vertically: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    #[serde(default)]
    pub asset_path: String,
}

impl AssetRef {
    /// Final `/`-delimited segment of the asset path.
    pub fn file_name(&self) -> &str {
        self.asset_path
            .rsplit('/')
            .next()
            .unwrap_or(self.asset_path.as_str())
    }
}
