/// Session logging
///
/// Every operation performed on the loaded spectrum is recorded as a
/// sequenced, timestamped line and shown in the log panel. The transcript
/// is part of the undoable application state: loading a new spectrum clears
/// it and the Load command snapshots/restores it, so the log entries need
/// cheap `snapshot`/`restore`.
///
/// The log can be exported as human-readable text or JSON.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// A single log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Sequential operation number (1-based).
    pub sequence: usize,
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl LogEntry {
    pub fn to_text(&self) -> String {
        format!(
            "[{:03}] {} | {}",
            self.sequence,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.message
        )
    }
}

/// The session transcript: ordered operation lines plus session metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLog {
    pub session_id: String,
    pub session_start: DateTime<Local>,
    pub source_file: String,
    pub software_version: String,
    pub entries: Vec<LogEntry>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            session_start: Local::now(),
            source_file: String::new(),
            software_version: env!("CARGO_PKG_VERSION").to_string(),
            entries: Vec::new(),
        }
    }

    pub fn set_source(&mut self, source: &str) {
        self.source_file = source.to_string();
    }

    /// Append a line to the transcript.
    pub fn add(&mut self, message: impl Into<String>) {
        let message = message.into();
        let seq = self.entries.len() + 1;
        log::info!("[LOG {:03}] {}", seq, message);
        self.entries.push(LogEntry {
            sequence: seq,
            timestamp: Local::now(),
            message,
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Copy of the transcript, for command snapshots.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.clone()
    }

    /// Replace the transcript with a previously taken snapshot.
    pub fn restore(&mut self, entries: Vec<LogEntry>) {
        self.entries = entries;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Export as human-readable text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("═══════════════════════════════════════════════════════\n");
        out.push_str("  Raman Studio Session Log\n");
        out.push_str("═══════════════════════════════════════════════════════\n");
        out.push_str(&format!("  Session ID:  {}\n", self.session_id));
        out.push_str(&format!(
            "  Started:     {}\n",
            self.session_start.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("  Source:      {}\n", self.source_file));
        out.push_str(&format!("  Software:    raman-studio v{}\n", self.software_version));
        out.push_str(&format!("  Operations:  {}\n", self.entries.len()));
        out.push_str("───────────────────────────────────────────────────────\n");
        for entry in &self.entries {
            out.push_str(&entry.to_text());
            out.push('\n');
        }
        out
    }

    /// Export as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }

    pub fn save_text(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_text())
    }

    pub fn save_json(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_json())
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_sequence() {
        let mut log = SessionLog::new();
        assert!(log.is_empty());
        log.add("Spectrum loaded");
        log.add("Baseline estimated");
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries[0].sequence, 1);
        assert_eq!(log.entries[1].sequence, 2);
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut log = SessionLog::new();
        log.add("first");
        log.add("second");
        let saved = log.snapshot();

        log.clear();
        log.add("replacement");
        assert_eq!(log.len(), 1);

        log.restore(saved);
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries[0].message, "first");
        assert_eq!(log.entries[1].message, "second");
    }

    #[test]
    fn test_text_export_contains_messages() {
        let mut log = SessionLog::new();
        log.set_source("quartz.txt");
        log.add("Smoothing applied");
        let text = log.to_text();
        assert!(text.contains("quartz.txt"));
        assert!(text.contains("Smoothing applied"));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut log = SessionLog::new();
        log.add("entry");
        let parsed: SessionLog = serde_json::from_str(&log.to_json()).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].message, "entry");
    }
}
