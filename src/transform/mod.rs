//! Design tree to QML transformation.
//!
//! This module provides:
//! - [`Transformer`] - recursive descent producing a [`QmlDirectory`]
//! - [`transform`] - one-shot helper returning the tree and the font bucket
//!
//! The output always holds two top-level directories: `Root` with one file
//! per artboard and `Components` with one directory per artboard set.

mod builder;


pub use builder::unwrap_enum_markers;

use indexmap::IndexSet;
use tracing::debug;

use crate::alignment::{resolve_alignment, Axis};
use crate::formatter::{Formatter, QmlFormatter};
use crate::sanitize::{lower_first, sanitize};
use crate::types::{
    AssetRef, DesignMetadata, DesignNode, IdSource, MetadataDocument, NodeCapability, QmlDirectory,
    QmlValue, TextDetails, Transformation, TransformationOptions,
};
use builder::ArtboardBuilder;

pub const BASE_IMPORT: &str = "import QtQuick";
pub const ROOT_DIR: &str = "Root";
pub const COMPONENTS_DIR: &str = "Components";
pub const IMAGES_DIR: &str = "Images";
pub const QML_EXTENSION: &str = "qml";
pub const LINE_HEIGHT_MODE: &str = "Text.FixedHeight";

/// Distinct font families referenced by text elements during one run.
pub type FontBucket = IndexSet<String>;

/// Transform a metadata document with the default formatter.
pub fn transform(
    options: TransformationOptions,
    document: &MetadataDocument,
) -> (QmlDirectory, FontBucket) {
    let mut transformer = Transformer::new(options);
    let tree = transformer.transform(document);
    (tree, transformer.into_fonts())
}

pub struct Transformer<F = QmlFormatter> {
    options: TransformationOptions,
    formatter: F,
    fonts: FontBucket,
    path_depth: usize,
}

impl Transformer<QmlFormatter> {
    pub fn new(options: TransformationOptions) -> Self {
        Self::with_formatter(options, QmlFormatter)
    }
}

impl<F: Formatter> Transformer<F> {
    pub fn with_formatter(options: TransformationOptions, formatter: F) -> Self {
        Self {
            options,
            formatter,
            fonts: FontBucket::new(),
            path_depth: 0,
        }
    }

    pub fn fonts(&self) -> &FontBucket {
        &self.fonts
    }

    pub fn into_fonts(self) -> FontBucket {
        self.fonts
    }

    pub fn transform(&mut self, document: &MetadataDocument) -> QmlDirectory {
        self.fonts.clear();

        self.path_depth = 0;
        let root = self.transform_artboards(&document.artboards);

        self.path_depth = 1;
        let mut components = QmlDirectory::new();
        for set in &document.artboard_sets {
            let dir = self.transform_artboards(&set.artboards);
            components.insert_unique(&sanitize(&set.name), QmlValue::Directory(dir));
        }

        debug!(
            artboards = root.len(),
            components = components.len(),
            fonts = self.fonts.len(),
            "transformed metadata document"
        );

        let mut tree = QmlDirectory::new();
        tree.insert_unique(&sanitize(ROOT_DIR), QmlValue::Directory(root));
        tree.insert_unique(&sanitize(COMPONENTS_DIR), QmlValue::Directory(components));
        tree
    }

    fn transform_artboards(&mut self, artboards: &[DesignNode]) -> QmlDirectory {
        let mut dir = QmlDirectory::new();
        for artboard in artboards {
            let code = self.render_artboard(artboard);
            dir.insert_unique(&sanitize(&artboard.name), QmlValue::File(code));
        }
        dir
    }

    fn render_artboard(&mut self, artboard: &DesignNode) -> String {
        let mut builder = ArtboardBuilder::new();
        self.emit_node(artboard, &mut builder);
        self.formatter.format(&builder.finish())
    }

    fn emit_node(&mut self, node: &DesignNode, out: &mut ArtboardBuilder) {
        let meta = &node.metadata;
        for statement in &meta.extra_imports {
            out.add_import(statement);
        }

        out.open(object_type(meta));

        if let Some(id) = self.identifier(meta) {
            out.prop("id", lower_first(&sanitize(id)));
        }
        if self.options.add_object_names {
            out.prop("objectName", quoted(&sanitize(&node.name)));
        }

        // Zero is skipped along with absent values to keep files small.
        let geometry = [
            ("x", node.x),
            ("y", node.y),
            ("z", node.layer_index),
            ("width", node.width),
            ("height", node.height),
        ];
        for (name, value) in geometry {
            if let Some(value) = truthy(value) {
                out.prop(name, format_number(value));
            }
        }

        for statement in &meta.qml_properties {
            out.line(statement.trim());
        }

        if let Some(visible) = meta.visible {
            out.prop("visible", visible);
        }
        if let Some(opacity) = meta.opacity {
            out.prop("opacity", format_number(opacity));
        }
        if let Some(clip) = meta.clip {
            out.prop("clip", clip);
        }

        match meta.capability() {
            NodeCapability::Text(text) => self.emit_text(text, out),
            NodeCapability::Image(asset) => self.emit_image(asset, out),
            NodeCapability::Generic => {}
        }

        if let Some(transformation) = &meta.transformation {
            emit_transform(transformation, node, out);
        }

        for child in &node.children {
            self.emit_node(child, out);
        }

        out.close();
    }

    fn identifier<'m>(&self, meta: &'m DesignMetadata) -> Option<&'m str> {
        match self.options.id_source()? {
            IdSource::QmlId => meta.qml_id.as_deref(),
            IdSource::Uuid => meta.uuid.as_deref(),
        }
    }

    fn emit_text(&mut self, text: &TextDetails, out: &mut ArtboardBuilder) {
        if !text.font_family.is_empty() {
            self.fonts.insert(text.font_family.clone());
        }

        out.prop("text", quoted(&text.contents));
        out.prop("color", quoted(&text.text_color));
        out.prop("font.family", quoted(&text.font_family));
        out.prop("font.styleName", quoted(&text.font_display_name));
        if let Some(size) = text.font_size {
            out.prop("font.pixelSize", format_number(size));
        }
        let kern = u8::from(text.kerning.unwrap_or(false));
        out.prop("font.features", format_args!("{{ \"kern\": {kern} }}"));
        if let Some(side) = text.vertical_alignment {
            out.prop("verticalAlignment", resolve_alignment(side, Axis::Vertical));
        }
        if let Some(side) = text.horizontal_alignment {
            out.prop(
                "horizontalAlignment",
                resolve_alignment(side, Axis::Horizontal),
            );
        }
        if let Some(line_height) = text.line_height {
            out.prop("lineHeight", format_number(line_height));
            out.prop("lineHeightMode", LINE_HEIGHT_MODE);
        }
    }

    fn emit_image(&self, asset: &AssetRef, out: &mut ArtboardBuilder) {
        out.prop("source", quoted(&self.asset_source(asset)));
    }

    /// Relative path from the generated file to the archive's image folder.
    fn asset_source(&self, asset: &AssetRef) -> String {
        let mut path = "../".repeat(self.path_depth + 1);
        path.push_str(IMAGES_DIR);
        path.push('/');
        path.push_str(asset.file_name());
        path
    }
}

/// Last dot-delimited segment of an explicit type name, else a fallback by capability.
fn object_type(meta: &DesignMetadata) -> &str {
    if let Some(type_name) = meta.type_name.as_deref().filter(|t| !t.is_empty()) {
        return type_name.rsplit('.').next().unwrap_or(type_name);
    }
    match meta.capability() {
        NodeCapability::Text(_) => "Text",
        NodeCapability::Image(_) => "Image",
        NodeCapability::Generic => "Item",
    }
}

fn emit_transform(transformation: &Transformation, node: &DesignNode, out: &mut ArtboardBuilder) {
    let rotation = truthy(transformation.rotation);
    let flipped = transformation.flipped_horizontally || transformation.flipped_vertically;
    if rotation.is_none() && !flipped {
        return;
    }

    let origin_x = format_number(node.width.unwrap_or(0.0) / 2.0);
    let origin_y = format_number(node.height.unwrap_or(0.0) / 2.0);

    out.line("transform: [");
    if let Some(angle) = rotation {
        out.open("Rotation");
        out.prop("origin.x", &origin_x);
        out.prop("origin.y", &origin_y);
        out.prop("angle", format_number(angle));
        out.line(if flipped { "}," } else { "}" });
    }
    if flipped {
        out.open("Scale");
        out.prop("origin.x", &origin_x);
        out.prop("origin.y", &origin_y);
        if transformation.flipped_horizontally {
            out.prop("xScale", -1);
        }
        if transformation.flipped_vertically {
            out.prop("yScale", -1);
        }
        out.close();
    }
    out.line("]");
}

fn truthy(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

/// Render a number the way the design tool wrote it: integers without a
/// trailing `.0`.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// QML string literal with quotes, backslashes and newlines escaped.
fn quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
