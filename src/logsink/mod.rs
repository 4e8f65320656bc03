//! Size-bounded append-only log file.
//!
//! The helper runs with no interactive console; this file is its only
//! postmortem record. Each entry is one timestamped line. Before an append,
//! a file already past the size ceiling is truncated to empty and a marker
//! entry recording the trigger size is written, then the requested message
//! follows as the next line. Every entry is also mirrored as a `tracing`
//! event so the trigger mechanism's captured stdout tells the same story.
//!
//! Writes are best-effort: a log failure must never abort a reconciliation
//! run.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

/// Size ceiling after which the log is truncated.
const MAX_LOG_BYTES: u64 = 1_048_576;

/// Timestamp format for log lines.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only log file with a size ceiling.
#[derive(Debug, Clone)]
pub struct LogSink {
    path: PathBuf,
    max_bytes: u64,
}

impl LogSink {
    /// Create a sink writing to the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_bytes: MAX_LOG_BYTES,
        }
    }

    /// Override the size ceiling.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// The log file path.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Append one timestamped entry, truncating first if the file has grown
    /// past the ceiling.
    pub fn append(&self, message: &str) {
        info!(target: "reveil::log", "{}", message);

        if let Some(trigger_size) = self.oversized() {
            let marker = format!("Log file trimmed (was {} bytes)", trigger_size);
            if std::fs::write(&self.path, self.format_line(&marker)).is_err() {
                warn!("failed to trim log file {}", self.path.display());
            }
        }

        if self.write_line(message).is_err() {
            warn!("failed to append to log file {}", self.path.display());
        }
    }

    /// Current size if it exceeds the ceiling.
    fn oversized(&self) -> Option<u64> {
        let size = std::fs::metadata(&self.path).ok()?.len();
        (size > self.max_bytes).then_some(size)
    }

    fn format_line(&self, message: &str) -> String {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        format!("[{}] {}\n", timestamp, message)
    }

    fn write_line(&self, message: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(self.format_line(message).as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sink(dir: &TempDir) -> LogSink {
        LogSink::new(dir.path().join("helper.log"))
    }

    fn lines(sink: &LogSink) -> Vec<String> {
        std::fs::read_to_string(sink.path())
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_append_creates_file_with_timestamped_line() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir);

        sink.append("Helper started");

        let lines = lines(&sink);
        assert_eq!(lines.len(), 1);
        // "[YYYY-MM-DD HH:MM:SS] Helper started"
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] Helper started"));
        assert_eq!(lines[0].find(']'), Some(20));
    }

    #[test]
    fn test_entries_accumulate() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir);

        sink.append("one");
        sink.append("two");
        sink.append("three");

        assert_eq!(lines(&sink).len(), 3);
    }

    #[test]
    fn test_oversized_log_truncated_before_append() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir).with_max_bytes(64);

        sink.append("first entry, long enough to cross the tiny test ceiling");
        sink.append("second entry");

        let lines = lines(&sink);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Log file trimmed (was"));
        assert!(lines[0].contains("bytes)"));
        assert!(lines[1].ends_with("] second entry"));
    }

    #[test]
    fn test_log_under_ceiling_not_truncated() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir).with_max_bytes(10_000);

        sink.append("one");
        sink.append("two");

        assert!(!lines(&sink).iter().any(|l| l.contains("trimmed")));
    }

    #[test]
    fn test_append_to_unwritable_path_does_not_panic() {
        let sink = LogSink::new("/nonexistent-dir/helper.log");
        sink.append("goes nowhere");
    }
}
