//! Font retrieval for families referenced by text elements.
//!
//! - [`FontSource`] - where the family index and variant files come from
//! - [`GoogleFontsClient`] - the HTTP implementation
//! - [`fetch_family`] - download every variant of one family into the store

mod client;

#[cfg(test)]
pub(crate) mod fake;
#[cfg(test)]
mod tests;

pub use client::GoogleFontsClient;

use async_trait::async_trait;
use futures::future::try_join_all;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BridgeError, Result};
use crate::sanitize::sanitize;
use crate::store::{keys, Blob, FileData, FileMap, FontMap, StoreHandle};

pub const FONTS_DIR: &str = "Fonts";
const DEFAULT_FONT_EXTENSION: &str = "ttf";

const WEIGHT_NAMES: [(u16, &str); 10] = [
    (100, "Thin"),
    (200, "ExtraLight"),
    (300, "Light"),
    (400, "Regular"),
    (500, "Medium"),
    (600, "SemiBold"),
    (700, "Bold"),
    (800, "ExtraBold"),
    (900, "Black"),
    (1000, "ExtraBlack"),
];

/// The remote `{ items: [{ family, files: { variant: url } }] }` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyIndex {
    #[serde(default)]
    pub items: Vec<FontFamily>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontFamily {
    pub family: String,
    #[serde(default)]
    pub files: IndexMap<String, String>,
}

impl FamilyIndex {
    /// Exact, case-sensitive lookup.
    pub fn find(&self, family: &str) -> Option<&FontFamily> {
        self.items.iter().find(|item| item.family == family)
    }
}

#[async_trait]
pub trait FontSource: Send + Sync {
    async fn family_index(&self) -> Result<FamilyIndex>;

    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}

pub fn weight_name(weight: u16) -> Option<&'static str> {
    WEIGHT_NAMES
        .iter()
        .find(|(w, _)| *w == weight)
        .map(|(_, name)| *name)
}

/// Split a provider variant key (`regular`, `italic`, `700`, `700italic`)
/// into a numeric weight and an optional style.
pub fn parse_variant(key: &str) -> (u16, Option<&str>) {
    let digits = key.bytes().take_while(u8::is_ascii_digit).count();
    let (weight, style) = key.split_at(digits);
    let weight = weight.parse().unwrap_or(400);
    match style {
        "" | "regular" => (weight, None),
        style => (weight, Some(style)),
    }
}

/// `<sanitized family><Weight><Style>.<ext>`, e.g. `RobotoBoldItalic.ttf`.
pub fn font_file_name(family: &str, variant: &str, url: &str) -> String {
    let (weight, style) = parse_variant(variant);
    let weight = match weight_name(weight) {
        Some(name) => name.to_string(),
        None => weight.to_string(),
    };
    let style = style.map(capitalize).unwrap_or_default();
    format!(
        "{}{weight}{style}.{}",
        sanitize(family),
        file_extension(url)
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn file_extension(url: &str) -> &str {
    let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or(url);
    let last = path.rsplit('/').next().unwrap_or(path);
    match last.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => DEFAULT_FONT_EXTENSION,
    }
}

/// Download every variant of `family` and merge the files into the Fonts record.
///
/// Variant downloads run concurrently; any single failure fails the family
/// and nothing of it is stored. Returns the number of variant files written.
pub async fn fetch_family(
    handle: &StoreHandle,
    source: &dyn FontSource,
    family: &str,
) -> Result<usize> {
    download_family(handle, source, family)
        .await
        .map_err(BridgeError::into_font_download)
}

async fn download_family(
    handle: &StoreHandle,
    source: &dyn FontSource,
    family: &str,
) -> Result<usize> {
    let index = source.family_index().await?;
    let entry = index
        .find(family)
        .ok_or_else(|| BridgeError::font_download(format!("font family `{family}` not found")))?;

    debug!(family, variants = entry.files.len(), "downloading font variants");
    let downloads = entry.files.iter().map(|(variant, url)| async move {
        let bytes = source.download(url).await?;
        Ok::<_, BridgeError>((font_file_name(family, variant, url), Blob(bytes)))
    });
    let files: FileMap = try_join_all(downloads).await?.into_iter().collect();
    let written = files.len();

    let mut fonts = load_fonts(handle).await?;
    fonts.entry(family.to_string()).or_default().extend(files);
    handle
        .put_file(keys::FONTS, Some(FileData::Fonts(fonts)))
        .await?;

    info!(family, files = written, "stored font family");
    Ok(written)
}

/// Currently persisted font families; empty when none were stored.
pub async fn load_fonts(handle: &StoreHandle) -> Result<FontMap> {
    match handle.get_file(keys::FONTS).await? {
        Some(FileData::Fonts(fonts)) => Ok(fonts),
        Some(_) => Err(BridgeError::database("Fonts record holds unexpected data")),
        None => Ok(FontMap::new()),
    }
}
