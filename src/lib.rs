//! QtBridge to QML Library
//!
//! Converts a QtBridge design export (`.qtbridge` archive holding a
//! `.metadata` document and image assets) into a tree of QML files, with
//! optional Google Fonts retrieval and ZIP packaging of the result.
//!
//! # Module Overview
//!
//! - [`transform`] - Design tree to QML transformation
//! - [`sanitize`] / [`alignment`] / [`formatter`] - Pure helpers used while emitting code
//! - [`store`] - Persistence gateway with memory and filesystem backends
//! - [`upload`] - Upload validation and the fresh-upload store wipe
//! - [`processor`] - Extraction, splitting, transformation and font stages
//! - [`fonts`] - Font family index client and variant downloader
//! - [`package`] - ZIP packaging of everything persisted
//! - [`config`] - Configuration file support
//! - [`types`] - Design tree, options and output tree types
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```no_run
//! use qmlbridge_lib::{build_archive, upload, Database, FileProcessor, Reporter};
//! use qmlbridge_lib::config::Config;
//! use qmlbridge_lib::types::TransformationOptions;
//!
//! # async fn example() -> qmlbridge_lib::Result<()> {
//! let config = Config::default();
//! let db = Database::open_dir(config.resolved_store_dir()).await?;
//! let bytes = std::fs::read("landing.qtbridge")?;
//! upload(&db, "landing.qtbridge", bytes, &config.upload).await?;
//!
//! let handle = db.init();
//! let report = FileProcessor::new(&handle, Reporter::silent())
//!     .start_processing(TransformationOptions::default())
//!     .await?;
//! let archive = build_archive(&handle, &config.archive, &Reporter::silent()).await?;
//! handle.close();
//! # let _ = (report, archive);
//! # Ok(())
//! # }
//! ```

pub mod alignment;
pub mod config;
pub mod error;
pub mod fonts;
pub mod formatter;
pub mod output;
pub mod package;
pub mod processor;
pub mod progress;
pub mod sanitize;
pub mod store;
pub mod transform;
pub mod types;
pub mod upload;

pub use config::Config;
pub use error::{BridgeError, ErrorCategory, ErrorPayload, Result};
pub use fonts::{fetch_family, FontSource, GoogleFontsClient};
pub use output::{
    BridgeOutput, ConvertOutput, ErrorOutput, PackageOutput, ProcessOutput, ResetOutput,
    UploadOutput, OUTPUT_VERSION,
};
pub use package::{build_archive, PackagedArchive};
pub use processor::{FileProcessor, FontSummary, ProcessingReport, ProcessingState};
pub use progress::{LogLine, LogMode, LogSink, ProgressCallback, Reporter};
pub use store::{Database, Partition, StoreHandle};
pub use transform::{transform, Transformer};
pub use upload::{upload, validate_upload, UploadReceipt};
