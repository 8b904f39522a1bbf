// SPDX-License-Identifier: MIT OR Apache-2.0
//! Append-only JSONL backup of last resort.
//!
//! When the fail-topic publish itself fails, the fail record lands in a
//! local date-stamped JSONL file so the message is not lost with the
//! offset advance. One file per UTC date, one JSON object per line, no
//! payload fields.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One backed-up fail record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRecord {
    /// Correlation id of the failed request.
    pub request_id: String,
    /// Source tag of the request.
    pub source: String,
    /// Stable error code of the original failure.
    pub error_code: String,
    /// Description of the original failure.
    pub error_message: String,
    /// ISO-8601 write time.
    pub occurred_at: String,
    /// Why the fail-topic publish failed.
    pub publish_error: String,
    /// Hostname of the writing worker.
    pub worker_host: String,
}

/// Errors from the sink itself.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// Directory creation or file append failed.
    #[error("backup write to {path} failed: {source}")]
    Io {
        /// File that was targeted.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The record did not serialise.
    #[error("backup record serialisation failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Thread-safe JSONL writer, one file per UTC date.
#[derive(Debug)]
pub struct FailBackupSink {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FailBackupSink {
    /// Sink writing under `dir`; the directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    /// Today's target file.
    pub fn current_file(&self) -> PathBuf {
        let date = Utc::now().format("%Y-%m-%d");
        self.dir.join(format!("{date}.jsonl"))
    }

    /// Append one record.
    pub fn write(&self, record: &BackupRecord) -> Result<(), BackupError> {
        let line = serde_json::to_string(record)?;
        let path = self.current_file();

        let _guard = self.lock.lock().expect("backup lock");
        std::fs::create_dir_all(&self.dir).map_err(|source| BackupError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| BackupError::Io {
                path: path.clone(),
                source,
            })?;
        writeln!(file, "{line}").map_err(|source| BackupError::Io { path, source })
    }

    /// Records currently in today's file, newest last. Test/inspection
    /// helper.
    pub fn read_today(&self) -> Vec<BackupRecord> {
        let Ok(content) = std::fs::read_to_string(self.current_file()) else {
            return Vec::new();
        };
        content
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// The directory this sink writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(request_id: &str) -> BackupRecord {
        BackupRecord {
            request_id: request_id.into(),
            source: "URL".into(),
            error_code: "PIPELINE_URL_001".into(),
            error_message: "fetch failed".into(),
            occurred_at: Utc::now().to_rfc3339(),
            publish_error: "broker down".into(),
            worker_host: "worker-1".into(),
        }
    }

    #[test]
    fn appends_one_json_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FailBackupSink::new(dir.path());
        sink.write(&record("req-1")).unwrap();
        sink.write(&record("req-2")).unwrap();

        let content = std::fs::read_to_string(sink.current_file()).unwrap();
        assert_eq!(content.lines().count(), 2);
        let first: BackupRecord = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(first.request_id, "req-1");
        assert_eq!(first.error_code, "PIPELINE_URL_001");
    }

    #[test]
    fn file_name_is_utc_date_stamped() {
        let sink = FailBackupSink::new("backups");
        let name = sink.current_file();
        let name = name.file_name().unwrap().to_string_lossy();
        assert!(name.ends_with(".jsonl"));
        assert_eq!(name.len(), "2026-01-01.jsonl".len());
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let json = serde_json::to_value(record("req-1")).unwrap();
        assert!(json.get("requestId").is_some());
        assert!(json.get("publishError").is_some());
        assert!(json.get("workerHost").is_some());
    }

    #[test]
    fn read_today_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FailBackupSink::new(dir.path());
        sink.write(&record("req-1")).unwrap();
        let records = sink.read_today();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].request_id, "req-1");
    }

    #[test]
    fn missing_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        let sink = FailBackupSink::new(&nested);
        sink.write(&record("req-1")).unwrap();
        assert!(sink.current_file().exists());
    }
}
