//! Archive packager: images, fonts and the generated QML tree into one ZIP.

use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::config::ArchiveConfig;
use crate::error::{BridgeError, Result};
use crate::fonts::{load_fonts, FONTS_DIR};
use crate::progress::Reporter;
use crate::sanitize::sanitize;
use crate::store::{keys, FileData, StoreHandle};
use crate::transform::{IMAGES_DIR, QML_EXTENSION};
use crate::types::{QmlDirectory, QmlValue};
use crate::upload::UPLOAD_EXTENSION;

pub const ARCHIVE_EXTENSION: &str = "zip";
const FALLBACK_PREFIX: &str = "qmlbridge-export";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagedArchive {
    pub file_name: String,
    pub file_count: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// One archive member. Directories carry no bytes.
#[derive(Debug)]
enum Member {
    Directory(String),
    File(String, Vec<u8>),
}

/// Build the downloadable archive from everything persisted in the store.
pub async fn build_archive(
    handle: &StoreHandle,
    config: &ArchiveConfig,
    reporter: &Reporter,
) -> Result<PackagedArchive> {
    reporter.progress(0);
    reporter.log("Collecting files...");

    let mut members = Vec::new();
    if let Some(FileData::Files(images)) = handle.get_file(keys::IMAGES).await? {
        for (name, bytes) in images {
            members.push(Member::File(format!("{IMAGES_DIR}/{name}"), bytes.0));
        }
    }
    reporter.progress(10);

    for (family, files) in load_fonts(handle).await? {
        for (name, bytes) in files {
            members.push(Member::File(format!("{FONTS_DIR}/{family}/{name}"), bytes.0));
        }
    }
    reporter.progress(20);

    if let Some(FileData::QmlTree(tree)) = handle.get_file(keys::QML_FILES).await? {
        collect_tree(&tree, "", &mut members);
    }
    reporter.progress(40);

    let file_count = members
        .iter()
        .filter(|m| matches!(m, Member::File(..)))
        .count();
    if file_count == 0 {
        return Err(BridgeError::archive("nothing to package"));
    }

    let file_name = archive_file_name(archive_base_name(handle).await?.as_deref());
    debug!(file = %file_name, files = file_count, "compressing archive");

    let level = config.compression_level;
    let progress = reporter.clone();
    let bytes = tokio::task::spawn_blocking(move || compress(members, level, file_count, &progress))
        .await
        .map_err(BridgeError::classify)??;

    reporter.progress(100);
    reporter.log(format!("Packaged {file_count} file(s) into {file_name}."));
    info!(file = %file_name, files = file_count, bytes = bytes.len(), "archive ready");

    Ok(PackagedArchive {
        file_name,
        file_count,
        bytes,
    })
}

fn collect_tree(dir: &QmlDirectory, prefix: &str, members: &mut Vec<Member>) {
    for (key, value) in dir.iter() {
        match value {
            QmlValue::File(code) => members.push(Member::File(
                format!("{prefix}{}.{QML_EXTENSION}", sanitize(key)),
                code.clone().into_bytes(),
            )),
            QmlValue::Directory(child) => {
                let path = format!("{prefix}{key}/");
                members.push(Member::Directory(path.clone()));
                collect_tree(child, &path, members);
            }
        }
    }
}

fn compress(
    members: Vec<Member>,
    level: i64,
    file_count: usize,
    reporter: &Reporter,
) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options: FileOptions<'_, ()> = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(level));

    let mut written = 0;
    for member in members {
        match member {
            Member::Directory(path) => zip.add_directory(path, options.clone())?,
            Member::File(path, bytes) => {
                zip.start_file(path.as_str(), options.clone())?;
                zip.write_all(&bytes)
                    .map_err(|e| BridgeError::archive(format!("failed to write {path}: {e}")))?;
                written += 1;
                reporter.progress(compression_progress(written, file_count));
            }
        }
    }
    Ok(zip.finish()?.into_inner())
}

/// Linear share of the 40..=95 range after `written` of `total` files.
fn compression_progress(written: usize, total: usize) -> u8 {
    let span = 55 * written / total.max(1);
    (40 + span.min(55)) as u8
}

/// Uploaded file name, else the document name from the metadata.
async fn archive_base_name(handle: &StoreHandle) -> Result<Option<String>> {
    let Some(record) = handle.get_metadata().await? else {
        return Ok(None);
    };
    if !record.file_name.trim().is_empty() {
        return Ok(Some(record.file_name));
    }
    Ok(record
        .metadata
        .document_info
        .map(|info| info.name)
        .filter(|name| !name.trim().is_empty()))
}

/// Sanitized `<base>.zip`, or a timestamped fallback when no usable base exists.
pub fn archive_file_name(base: Option<&str>) -> String {
    let stem = base.map(clean_stem).filter(|s| !s.is_empty());
    match stem {
        Some(stem) => format!("{stem}.{ARCHIVE_EXTENSION}"),
        None => {
            let millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default();
            format!("{FALLBACK_PREFIX}-{millis}.{ARCHIVE_EXTENSION}")
        }
    }
}

fn clean_stem(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_ext = match trimmed
        .len()
        .checked_sub(UPLOAD_EXTENSION.len())
        .filter(|&cut| trimmed.is_char_boundary(cut))
    {
        Some(cut) if trimmed[cut..].eq_ignore_ascii_case(UPLOAD_EXTENSION) => &trimmed[..cut],
        _ => trimmed,
    };

    let mut out = String::with_capacity(without_ext.len());
    let mut pending_space = false;
    for c in without_ext.chars() {
        if c.is_whitespace() {
            pending_space = true;
        } else if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
            if pending_space && !out.is_empty() {
                out.push('_');
            }
            pending_space = false;
            out.push(c);
        }
    }
    out.trim_matches(|c| c == '.' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Blob, Database, FileMap, FontMap, MetadataRecord};
    use crate::types::{DocumentInfo, MetadataDocument};
    use std::io::Read;

    fn unpack(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("open archive");
        let mut files = Vec::new();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).expect("entry");
            if entry.is_dir() {
                continue;
            }
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents).expect("read entry");
            files.push((entry.name().to_string(), contents));
        }
        files
    }

    fn sample_tree() -> QmlDirectory {
        let mut root = QmlDirectory::new();
        root.insert_unique("Home", QmlValue::File("import QtQuick\n\nItem {\n}\n".into()));
        let mut button = QmlDirectory::new();
        button.insert_unique("Default", QmlValue::File("Rectangle {\n}\n".into()));
        button.insert_unique("Default", QmlValue::File("Rectangle {\n    clip: true\n}\n".into()));
        let mut components = QmlDirectory::new();
        components.insert_unique("Button", QmlValue::Directory(button));
        let mut tree = QmlDirectory::new();
        tree.insert_unique("Root", QmlValue::Directory(root));
        tree.insert_unique("Components", QmlValue::Directory(components));
        tree
    }

    #[tokio::test]
    async fn archive_mirrors_the_output_tree() {
        let db = Database::in_memory();
        let handle = db.init();
        let tree = sample_tree();
        handle
            .put_file(keys::QML_FILES, Some(FileData::QmlTree(tree.clone())))
            .await
            .expect("store tree");

        let mut images = FileMap::new();
        images.insert("logo.png".into(), Blob(vec![7, 7]));
        handle
            .put_file(keys::IMAGES, Some(FileData::Files(images)))
            .await
            .expect("store images");

        let mut fonts = FontMap::new();
        fonts
            .entry("Open Sans".into())
            .or_default()
            .insert("OpenSansRegular.ttf".into(), Blob(vec![1]));
        handle
            .put_file(keys::FONTS, Some(FileData::Fonts(fonts)))
            .await
            .expect("store fonts");

        let archive = build_archive(&handle, &ArchiveConfig::default(), &Reporter::silent())
            .await
            .expect("build archive");
        assert_eq!(archive.file_count, 5);

        let files = unpack(&archive.bytes);
        let names: Vec<&str> = files.iter().map(|(n, _)| n.as_str()).collect();
        assert!(names.contains(&"Images/logo.png"));
        assert!(names.contains(&"Fonts/Open Sans/OpenSansRegular.ttf"));

        let qml: Vec<(String, Vec<u8>)> = files
            .into_iter()
            .filter(|(name, _)| name.ends_with(".qml"))
            .collect();
        let expected: Vec<(String, Vec<u8>)> = tree
            .files()
            .into_iter()
            .map(|(path, code)| (format!("{}.qml", path.join("/")), code.as_bytes().to_vec()))
            .collect();
        assert_eq!(qml, expected);
        assert!(qml.iter().any(|(n, _)| n == "Components/Button/Default1.qml"));
    }

    #[tokio::test]
    async fn empty_store_has_nothing_to_package() {
        let db = Database::in_memory();
        let handle = db.init();
        let err = build_archive(&handle, &ArchiveConfig::default(), &Reporter::silent())
            .await
            .expect_err("empty store");
        assert_eq!(err, BridgeError::Archive("nothing to package".into()));
    }

    #[tokio::test]
    async fn name_comes_from_the_upload_then_the_document() {
        let db = Database::in_memory();
        let handle = db.init();
        handle
            .put_file(keys::QML_FILES, Some(FileData::QmlTree(sample_tree())))
            .await
            .expect("store tree");

        let document = MetadataDocument {
            document_info: Some(DocumentInfo {
                name: "Landing Page".into(),
            }),
            ..MetadataDocument::default()
        };
        handle
            .put_metadata(MetadataRecord::new("My Design v2.qtbridge", document.clone()))
            .await
            .expect("store metadata");
        let archive = build_archive(&handle, &ArchiveConfig::default(), &Reporter::silent())
            .await
            .expect("build");
        assert_eq!(archive.file_name, "My_Design_v2.zip");

        handle
            .put_metadata(MetadataRecord::new("", document))
            .await
            .expect("store metadata");
        let archive = build_archive(&handle, &ArchiveConfig::default(), &Reporter::silent())
            .await
            .expect("build");
        assert_eq!(archive.file_name, "Landing_Page.zip");
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(archive_file_name(Some("landing.qtbridge")), "landing.zip");
        assert_eq!(archive_file_name(Some("  a <b>:  c?.QTBRIDGE ")), "a_b_c.zip");
        assert_eq!(archive_file_name(Some("résumé final")), "résumé_final.zip");
    }

    #[test]
    fn unusable_names_fall_back_to_a_timestamp() {
        for base in [None, Some(""), Some("???"), Some(".qtbridge")] {
            let name = archive_file_name(base);
            assert!(name.starts_with("qmlbridge-export-"), "got {name}");
            assert!(name.ends_with(".zip"));
        }
    }

    #[test]
    fn compression_progress_spans_forty_to_ninety_five() {
        assert_eq!(compression_progress(0, 10), 40);
        assert_eq!(compression_progress(5, 10), 67);
        assert_eq!(compression_progress(10, 10), 95);
    }
}
