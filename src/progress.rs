use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;
pub type LogSink = Arc<dyn Fn(&LogLine) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// Add a line after the existing ones.
    Append,
    /// Replace everything shown so far with this line.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub mode: LogMode,
    pub message: String,
}

/// Fans progress percentages and log lines out to optional callbacks.
///
/// Percentages never decrease and never exceed 100 within one reporter.
#[derive(Clone, Default)]
pub struct Reporter {
    progress: Option<ProgressCallback>,
    log: Option<LogSink>,
    last: Arc<AtomicU8>,
}

impl Reporter {
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn with_log(mut self, sink: LogSink) -> Self {
        self.log = Some(sink);
        self
    }

    pub fn progress(&self, percent: u8) {
        let percent = percent.min(100);
        let previous = self.last.fetch_max(percent, Ordering::SeqCst);
        if percent < previous {
            return;
        }
        if let Some(callback) = &self.progress {
            callback(percent);
        }
    }

    pub fn last_progress(&self) -> u8 {
        self.last.load(Ordering::SeqCst)
    }

    pub fn log(&self, message: impl Into<String>) {
        self.emit(LogMode::Append, message.into());
    }

    pub fn reset(&self, message: impl Into<String>) {
        self.emit(LogMode::Reset, message.into());
    }

    fn emit(&self, mode: LogMode, message: String) {
        tracing::info!(target: "qmlbridge::log", "{message}");
        if let Some(sink) = &self.log {
            sink(&LogLine { mode, message });
        }
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("last", &self.last_progress())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn progress_is_monotonic_and_capped() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = Reporter::silent().with_progress(Arc::new(move |p: u8| {
            sink.lock().expect("lock").push(p);
        }));

        for p in [5, 20, 10, 20, 150] {
            reporter.progress(p);
        }
        assert_eq!(*seen.lock().expect("lock"), vec![5, 20, 20, 100]);
        assert_eq!(reporter.last_progress(), 100);
    }

    #[test]
    fn log_lines_carry_their_mode() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let reporter = Reporter::silent().with_log(Arc::new(move |line: &LogLine| {
            sink.lock().expect("lock").push(line.clone());
        }));

        reporter.log("Extraction successful.");
        reporter.reset("Error: boom");

        let lines = lines.lock().expect("lock");
        assert_eq!(lines[0].mode, LogMode::Append);
        assert_eq!(lines[1].mode, LogMode::Reset);
        assert_eq!(lines[1].message, "Error: boom");
    }

    #[test]
    fn clones_share_the_high_water_mark() {
        let reporter = Reporter::silent();
        let clone = reporter.clone();
        reporter.progress(60);
        clone.progress(40);
        assert_eq!(clone.last_progress(), 60);
    }
}
