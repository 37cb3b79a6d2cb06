//! Processing orchestrator.
//!
//! Drives one run from an uploaded `.qtbridge` archive (or cached metadata)
//! to a persisted QML tree, optionally downloading the referenced fonts:
//!
//! `Idle -> Extracting -> Splitting -> Transforming -> Persisting -> [FontProcessing] -> Done`
//!
//! When a metadata record already exists the run resumes at `Transforming`.


use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{BridgeError, Result};
use crate::fonts::{fetch_family, load_fonts, FontSource};
use crate::progress::Reporter;
use crate::store::{keys, Blob, FileData, FileMap, MetadataRecord, StoreHandle};
use crate::transform::{transform, FontBucket};
use crate::types::{MetadataDocument, TransformationOptions};

pub const METADATA_SUFFIX: &str = ".metadata";
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "svg"];
/// Ceiling on the total decompressed size of one upload.
pub const MAX_EXTRACTED_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessingState {
    Idle,
    Extracting,
    Splitting,
    Transforming,
    Persisting,
    FontProcessing,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFailure {
    pub family: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSummary {
    pub requested: usize,
    pub downloaded: usize,
    pub skipped: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FontFailure>,
}

impl FontSummary {
    /// Families that ended the run with stored variants.
    pub fn available(&self) -> usize {
        self.downloaded + self.skipped
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingReport {
    /// True when extraction and splitting were skipped in favor of cached metadata.
    pub resumed: bool,
    pub images: usize,
    pub qml_files: usize,
    pub font_families: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fonts: Option<FontSummary>,
}

pub struct FileProcessor<'h> {
    handle: &'h StoreHandle,
    font_source: Option<Arc<dyn FontSource>>,
    reporter: Reporter,
    state: ProcessingState,
}

impl<'h> FileProcessor<'h> {
    pub fn new(handle: &'h StoreHandle, reporter: Reporter) -> Self {
        Self {
            handle,
            font_source: None,
            reporter,
            state: ProcessingState::Idle,
        }
    }

    pub fn with_font_source(mut self, source: Arc<dyn FontSource>) -> Self {
        self.font_source = Some(source);
        self
    }

    pub fn state(&self) -> ProcessingState {
        self.state
    }

    /// Run the pipeline to completion. On a fatal error the state returns to
    /// `Idle`, the log is reset to the error message and the error is returned.
    pub async fn start_processing(
        &mut self,
        options: TransformationOptions,
    ) -> Result<ProcessingReport> {
        match self.run(options).await {
            Ok(report) => Ok(report),
            Err(err) => {
                let err = BridgeError::classify(err);
                warn!(error = %err, "processing failed");
                self.state = ProcessingState::Idle;
                self.reporter.reset(format!("Error: {err}"));
                Err(err)
            }
        }
    }

    async fn run(&mut self, options: TransformationOptions) -> Result<ProcessingReport> {
        if options.download_fonts && self.font_source.is_none() {
            return Err(BridgeError::file_processor(
                "font downloads were requested but no font source is configured",
            ));
        }

        let cached = self.handle.get_metadata().await?;
        let resumed = cached.is_some();
        let mut images = 0;
        if resumed {
            debug!("metadata cached; skipping extraction");
            self.reporter.log("Using cached metadata.");
            if let Some(FileData::Files(stored)) = self.handle.get_file(keys::IMAGES).await? {
                images = stored.len();
            }
        } else {
            let upload_name = self.extract().await.map_err(BridgeError::classify)?;
            images = self.split(&upload_name).await.map_err(BridgeError::classify)?;
        }

        let (qml_files, font_bucket) = self
            .transform(options)
            .await
            .map_err(BridgeError::classify)?;

        let fonts = if options.download_fonts {
            Some(self.process_fonts(&font_bucket).await)
        } else {
            None
        };

        self.state = ProcessingState::Done;
        self.reporter.progress(100);
        self.reporter.log("Completed.");
        info!(resumed, qml_files, "processing done");

        Ok(ProcessingReport {
            resumed,
            images,
            qml_files,
            font_families: font_bucket.into_iter().collect(),
            fonts,
        })
    }

    /// Decompress the uploaded archive into the ExtractedFiles record.
    /// Returns the uploaded file name.
    async fn extract(&mut self) -> Result<String> {
        self.state = ProcessingState::Extracting;
        self.reporter.progress(5);
        self.reporter.log("Extracting QtBridge file...");

        let (file_name, bytes) = match self.handle.get_file(keys::UPLOADED_FILE).await? {
            Some(FileData::Upload { file_name, bytes }) => (file_name, bytes),
            _ => {
                return Err(BridgeError::archive(
                    "no uploaded archive found; upload a .qtbridge file first",
                ))
            }
        };

        let extracted = tokio::task::spawn_blocking(move || unzip(bytes.0, MAX_EXTRACTED_BYTES))
            .await
            .map_err(BridgeError::classify)??;
        debug!(entries = extracted.len(), file = %file_name, "extracted archive");

        self.handle
            .put_file(keys::EXTRACTED_FILES, Some(FileData::Files(extracted)))
            .await?;
        self.handle.put_file(keys::UPLOADED_FILE, None).await?;

        self.reporter.progress(20);
        self.reporter.log("Extraction successful.");
        Ok(file_name)
    }

    /// Move images and the metadata document out of the extracted files.
    /// Returns the number of images stored.
    async fn split(&mut self, upload_name: &str) -> Result<usize> {
        self.state = ProcessingState::Splitting;
        self.reporter.progress(25);

        let extracted = match self.handle.get_file(keys::EXTRACTED_FILES).await? {
            Some(FileData::Files(files)) => files,
            _ => return Err(BridgeError::archive("no extracted files found")),
        };

        let mut images = FileMap::new();
        let mut metadata_entries = Vec::new();
        for (path, bytes) in extracted {
            let name = entry_file_name(&path).to_string();
            if is_image(&name) {
                images.insert(name, bytes);
            } else if name.to_ascii_lowercase().ends_with(METADATA_SUFFIX) {
                metadata_entries.push((name, bytes));
            }
        }

        let (metadata_name, metadata_bytes) = pick_metadata(metadata_entries, upload_name)
            .ok_or_else(|| BridgeError::metadata("archive contains no .metadata document"))?;
        let document: MetadataDocument = serde_json::from_slice(metadata_bytes.as_bytes())
            .map_err(|e| BridgeError::metadata(format!("failed to parse {metadata_name}: {e}")))?;

        let image_count = images.len();
        if !images.is_empty() {
            self.handle
                .put_file(keys::IMAGES, Some(FileData::Files(images)))
                .await?;
        }
        self.handle
            .put_metadata(MetadataRecord::new(upload_name, document))
            .await?;
        self.handle.put_file(keys::EXTRACTED_FILES, None).await?;

        debug!(images = image_count, metadata = %metadata_name, "split extracted files");
        self.reporter.progress(40);
        self.reporter.log("Loading metadata succeeded.");
        Ok(image_count)
    }

    /// Transform cached metadata and persist the QML tree.
    /// Returns the number of generated files and the font bucket.
    async fn transform(&mut self, options: TransformationOptions) -> Result<(usize, FontBucket)> {
        self.state = ProcessingState::Transforming;
        self.reporter.progress(45);

        let record = self.handle.get_metadata().await?.ok_or_else(|| {
            BridgeError::metadata("no cached metadata; upload a .qtbridge file first")
        })?;
        let (tree, fonts) = transform(options, &record.metadata);
        let qml_files = tree.file_count();

        self.state = ProcessingState::Persisting;
        self.reporter.progress(60);
        self.handle
            .put_file(keys::QML_FILES, Some(FileData::QmlTree(tree)))
            .await?;
        if !options.download_fonts {
            // Fonts from an earlier run must not end up in this run's package.
            self.handle.put_file(keys::FONTS, None).await?;
        }
        self.reporter.progress(65);
        self.reporter.log(format!("Generated {qml_files} QML file(s)."));
        Ok((qml_files, fonts))
    }

    /// Fetch every family in the bucket; per-family failures are logged, not returned.
    async fn process_fonts(&mut self, bucket: &FontBucket) -> FontSummary {
        self.state = ProcessingState::FontProcessing;
        self.reporter.progress(70);

        let mut summary = FontSummary {
            requested: bucket.len(),
            ..FontSummary::default()
        };
        let Some(source) = self.font_source.clone() else {
            return summary;
        };
        if bucket.is_empty() {
            self.reporter.log("No fonts to download.");
            self.reporter.progress(95);
            return summary;
        }

        let total = bucket.len();
        for (done, family) in bucket.iter().enumerate() {
            let stored = match self.already_stored(family).await {
                Ok(stored) => stored,
                Err(err) => {
                    warn!(family = %family, error = %err, "stored fonts unreadable, downloading again");
                    false
                }
            };
            if stored {
                self.reporter
                    .log(format!("Skipping {family}, already downloaded."));
                summary.skipped += 1;
            } else {
                self.reporter.log(format!("Downloading {family}."));
                match fetch_family(self.handle, source.as_ref(), family).await {
                    Ok(_) => {
                        self.reporter.log("Downloading completed.");
                        summary.downloaded += 1;
                    }
                    Err(err) => {
                        warn!(family = %family, error = %err, "font download failed");
                        self.reporter
                            .log(format!("Downloading {family} failed: {err}"));
                        summary.failures.push(FontFailure {
                            family: family.clone(),
                            message: err.message().to_string(),
                        });
                    }
                }
            }
            self.reporter.progress(font_progress(done + 1, total));
        }

        self.reporter.log(format!(
            "Fonts ready: {}/{}.",
            summary.available(),
            summary.requested
        ));
        summary
    }

    async fn already_stored(&self, family: &str) -> Result<bool> {
        let fonts = load_fonts(self.handle).await?;
        Ok(fonts.get(family).is_some_and(|files| !files.is_empty()))
    }
}

/// Linear share of the 70..=95 range after `done` of `total` families.
fn font_progress(done: usize, total: usize) -> u8 {
    let span = 25 * done / total.max(1);
    (70 + span.min(25)) as u8
}

/// Decompress every file entry. Declared entry sizes are not trusted; the
/// bytes actually produced count against `limit`.
fn unzip(bytes: Vec<u8>, limit: u64) -> Result<FileMap> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut files = FileMap::new();
    let mut remaining = limit;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let mut contents = Vec::new();
        (&mut entry)
            .take(remaining.saturating_add(1))
            .read_to_end(&mut contents)
            .map_err(|e| BridgeError::archive(format!("failed to decompress {name}: {e}")))?;
        let produced = contents.len() as u64;
        if produced > remaining {
            return Err(BridgeError::archive(format!(
                "archive expands beyond {limit} bytes at {name}"
            )));
        }
        remaining -= produced;
        files.insert(name, Blob(contents));
    }
    Ok(files)
}

fn entry_file_name(path: &str) -> &str {
    path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path)
}

fn is_image(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Prefer `<upload stem>.metadata`; otherwise the first metadata entry.
fn pick_metadata(entries: Vec<(String, Blob)>, upload_name: &str) -> Option<(String, Blob)> {
    let stem = Path::new(upload_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let expected = format!("{stem}{METADATA_SUFFIX}");
    let position = entries
        .iter()
        .position(|(name, _)| name.eq_ignore_ascii_case(&expected))
        .unwrap_or(0);
    entries.into_iter().nth(position)
}
