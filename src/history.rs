//! Append-only chat history sink
//!
//! The chat path treats history as fire-and-forget: appends are serialized
//! by a single lock so lines never interleave, and write failures are
//! logged, never propagated into message delivery.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use tracing::error;

/// Seam between the command router and whatever stores history.
pub trait HistorySink: Send + Sync {
    /// Append one line. Must not fail the caller; errors stay internal.
    fn append(&self, line: &str);
}

/// History sink backed by a file created at startup.
pub struct FileHistory {
    file: Mutex<File>,
}

impl FileHistory {
    /// Create (truncating) the history file at the given path
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self {
            file: Mutex::new(File::create(path)?),
        })
    }
}

impl HistorySink for FileHistory {
    fn append(&self, line: &str) {
        let Ok(mut file) = self.file.lock() else {
            error!("History file lock poisoned; dropping line");
            return;
        };
        if let Err(e) = writeln!(file, "{}", line) {
            error!("Error writing to history file: {}", e);
        }
    }
}

/// In-memory sink for tests and for running without a history file.
#[derive(Default)]
pub struct MemoryHistory {
    lines: Mutex<Vec<String>>,
}

impl MemoryHistory {
    /// Create an empty in-memory sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl HistorySink for MemoryHistory {
    fn append(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_history_records_in_order() {
        let history = MemoryHistory::new();
        history.append("first");
        history.append("second");
        assert_eq!(history.lines(), vec!["first", "second"]);
    }

    #[test]
    fn test_file_history_appends_lines() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("chat_relay_history_{}.txt", std::process::id()));

        let history = FileHistory::create(&path).unwrap();
        history.append("hello");
        history.append("world");
        drop(history);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "hello\nworld\n");
        let _ = std::fs::remove_file(&path);
    }
}
