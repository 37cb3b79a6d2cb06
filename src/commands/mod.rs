mod convert;
mod package;
mod process;
mod reset;
mod upload;

pub use convert::run_convert;
pub use package::run_package;
pub use process::run_process;
pub use reset::run_reset;
pub use upload::run_upload;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use qmlbridge_lib::{BridgeError, Config, Database, LogLine, LogMode, Reporter};
use tracing::debug;

use crate::cli::OutputFormat;
use crate::settings::{load_config, log_effective_config, resolve_store_dir};

/// Global flags shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub store_dir: Option<PathBuf>,
    pub verbose: bool,
    pub format: OutputFormat,
}

/// Loaded configuration plus the opened store.
pub(crate) struct CommandContext {
    pub config: Config,
    pub store_dir: PathBuf,
    pub db: Database,
}

/// Load config and resolve the store directory without touching the store.
pub(crate) fn resolve(globals: &GlobalArgs) -> Result<(Config, PathBuf), BridgeError> {
    let config = load_config(globals.config.as_deref())?;
    let store_dir = resolve_store_dir(globals.store_dir.as_deref(), &config);
    if globals.verbose {
        log_effective_config(globals.config.as_deref(), &store_dir, &config);
    }
    Ok((config, store_dir))
}

pub(crate) async fn prepare(globals: &GlobalArgs) -> Result<CommandContext, BridgeError> {
    let (config, store_dir) = resolve(globals)?;
    let db = Database::open_dir(&store_dir).await?;
    Ok(CommandContext {
        config,
        store_dir,
        db,
    })
}

/// Log lines collected for the final output; a reset line replaces the buffer.
#[derive(Clone, Default)]
pub(crate) struct LogBuffer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogBuffer {
    /// A fresh reporter per stage; every one of them feeds this buffer.
    pub fn reporter(&self) -> Reporter {
        let lines = Arc::clone(&self.lines);
        Reporter::silent()
            .with_progress(Arc::new(|percent: u8| debug!(percent, "progress")))
            .with_log(Arc::new(move |line: &LogLine| {
                if let Ok(mut lines) = lines.lock() {
                    if line.mode == LogMode::Reset {
                        lines.clear();
                    }
                    lines.push(line.message.clone());
                }
            }))
    }

    pub fn take(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|mut lines| std::mem::take(&mut *lines))
            .unwrap_or_default()
    }
}

/// `--output` directory, else the current directory.
pub(crate) fn output_dir(output: Option<&Path>) -> PathBuf {
    output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
