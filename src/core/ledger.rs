//! Append-only chain-of-custody ledger.
//!
//! The ledger is a plain text file, one custody record per line, created
//! on first append and only ever opened in append mode afterwards. Each
//! append holds an exclusive file lock for the duration of its single
//! write, so concurrent writers (threads or separate processes sharing
//! the file) interleave at record granularity, never within a record.
//!
//! Durability contract: the record is written in full, flushed and synced
//! before `append` returns. On any failure no partial line is
//! acknowledged; the caller decides whether to retry, since an internal
//! retry could duplicate or reorder evidence entries.

use std::fs::OpenOptions;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

use crate::domain::{LedgerEntry, LogRecord};

/// Storage-level failures while appending to or reading the evidence log.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to open evidence log {path}: {source}")]
    OpenFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to lock evidence log {path}: {source}")]
    LockFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write evidence log {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read evidence log {path}: {source}")]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Handle to an evidence log file.
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    /// Use the evidence log at the given path. The file (and its parent
    /// directory) is created lazily on first append.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path to the underlying log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record to the evidence log.
    ///
    /// The complete newline-terminated line is written under an exclusive
    /// lock and synced to disk before this returns. No internal retries.
    pub fn append(&self, record: &LogRecord) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| LedgerError::OpenFailure {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| LedgerError::OpenFailure {
                path: self.path.clone(),
                source,
            })?;

        // Exclusive lock for the duration of the single write; released
        // when the file handle is dropped.
        file.lock_exclusive().map_err(|source| LedgerError::LockFailure {
            path: self.path.clone(),
            source,
        })?;

        // One buffer, one write: the line is never visible half-written.
        let line = format!("{}\n", record.to_line());
        let write_result = file
            .write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .and_then(|_| file.sync_all());

        write_result.map_err(|source| LedgerError::WriteFailure {
            path: self.path.clone(),
            source,
        })?;

        debug!(method = %record.method, path = %self.path.display(), "custody record appended");
        Ok(())
    }

    /// Read the log back as a sequence of independent lines, in append
    /// order. Malformed lines are reported, not skipped silently and
    /// never fatal.
    pub fn replay(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = std::fs::File::open(&self.path).map_err(|source| LedgerError::ReadFailure {
            path: self.path.clone(),
            source,
        })?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| LedgerError::ReadFailure {
                path: self.path.clone(),
                source,
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry = match LogRecord::parse_line(&line) {
                Some(record) => LedgerEntry::Record(record),
                None => LedgerEntry::Malformed {
                    line_number: index + 1,
                    raw: line,
                },
            };
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Well-formed records only, in append order
    pub fn records(&self) -> Result<Vec<LogRecord>, LedgerError> {
        Ok(self
            .replay()?
            .into_iter()
            .filter_map(|entry| match entry {
                LedgerEntry::Record(record) => Some(record),
                LedgerEntry::Malformed { .. } => None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DigestResult, HashAlgorithm};
    use tempfile::TempDir;

    fn record(reference: &str) -> LogRecord {
        let result = DigestResult::new(
            HashAlgorithm::Sha256,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824".into(),
        );
        LogRecord::new(&result, reference)
    }

    #[test]
    fn test_append_creates_file_and_parents() {
        let temp = TempDir::new().unwrap();
        let ledger = Ledger::at(temp.path().join("custody").join("evidence.log"));

        ledger.append(&record("hello")).unwrap();

        assert!(ledger.path().exists());
        let entries = ledger.replay().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record().unwrap().input_reference, "hello");
    }

    #[test]
    fn test_replay_preserves_append_order() {
        let temp = TempDir::new().unwrap();
        let ledger = Ledger::at(temp.path().join("evidence.log"));

        for i in 0..5 {
            ledger.append(&record(&format!("item-{}", i))).unwrap();
        }

        let records = ledger.records().unwrap();
        assert_eq!(records.len(), 5);
        for (i, rec) in records.iter().enumerate() {
            assert_eq!(rec.input_reference, format!("item-{}", i));
        }
    }

    #[test]
    fn test_earlier_lines_unchanged_by_later_appends() {
        let temp = TempDir::new().unwrap();
        let ledger = Ledger::at(temp.path().join("evidence.log"));

        ledger.append(&record("first")).unwrap();
        let snapshot = std::fs::read_to_string(ledger.path()).unwrap();

        ledger.append(&record("second")).unwrap();
        ledger.append(&record("third")).unwrap();

        let contents = std::fs::read_to_string(ledger.path()).unwrap();
        assert!(contents.starts_with(&snapshot));
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn test_malformed_line_reported_not_fatal() {
        let temp = TempDir::new().unwrap();
        let ledger = Ledger::at(temp.path().join("evidence.log"));

        ledger.append(&record("before")).unwrap();
        // Simulate a manual edit between two valid appends
        {
            let mut file = OpenOptions::new()
                .append(true)
                .open(ledger.path())
                .unwrap();
            writeln!(file, "garbage inserted by hand").unwrap();
        }
        ledger.append(&record("after")).unwrap();

        let entries = ledger.replay().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].record().is_some());
        assert!(matches!(
            entries[1],
            LedgerEntry::Malformed { line_number: 2, .. }
        ));
        assert!(entries[2].record().is_some());
    }

    #[test]
    fn test_replay_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let ledger = Ledger::at(temp.path().join("never-created.log"));
        assert!(ledger.replay().unwrap().is_empty());
    }

    #[test]
    fn test_append_failure_leaves_no_line() {
        let temp = TempDir::new().unwrap();
        // A directory at the log path makes the open fail
        let dir_path = temp.path().join("evidence.log");
        std::fs::create_dir(&dir_path).unwrap();

        let ledger = Ledger::at(&dir_path);
        let err = ledger.append(&record("lost")).unwrap_err();
        assert!(matches!(err, LedgerError::OpenFailure { .. }));
    }

    #[test]
    fn test_concurrent_appends_interleave_at_record_granularity() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("evidence.log");

        let mut handles = Vec::new();
        for writer in 0..4 {
            let path = path.clone();
            handles.push(std::thread::spawn(move || {
                let ledger = Ledger::at(path);
                for i in 0..25 {
                    ledger
                        .append(&record(&format!("w{}-{}", writer, i)))
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let ledger = Ledger::at(&path);
        let entries = ledger.replay().unwrap();
        assert_eq!(entries.len(), 100);
        // Every line is a complete, well-formed record: no torn writes
        assert!(entries.iter().all(|e| e.record().is_some()));
    }
}
