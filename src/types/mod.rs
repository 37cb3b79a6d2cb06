//! Core types used throughout the library.
//!
//! - [`design`] - the design tree parsed from QtBridge metadata
//! - [`options`] - transformation switches
//! - [`tree`] - the generated QML output tree

pub mod design;
pub mod options;
pub mod tree;

pub use design::{
    ArtboardSet, AssetRef, DesignMetadata, DesignNode, DocumentInfo, MetadataDocument,
    NodeCapability, TextDetails, Transformation,
};
pub use options::{IdSource, TransformationOptions};
pub use tree::{QmlDirectory, QmlValue};
