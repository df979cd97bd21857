//! Audit log sinks.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::record::{AuditRecord, Severity};

/// Errors from the audit sink.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Failed to access audit log: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability interface over an append-only audit sink.
pub trait AuditSink: Send + Sync {
    /// Appends one record. Prior entries are never rewritten.
    fn append(&self, severity: Severity, message: &str) -> Result<(), AuditError>;

    /// Returns the most recent `count` records, oldest first.
    fn tail(&self, count: usize) -> Result<Vec<AuditRecord>, AuditError>;
}

/// File-backed audit log, one record per line.
///
/// The file handle is acquired per call and flushed before release, so an
/// interrupted invocation can at worst lose its own trailing record; prior
/// entries stay intact.
#[derive(Debug, Clone)]
pub struct FileAuditLog {
    path: PathBuf,
}

impl FileAuditLog {
    /// Creates a sink writing to the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the sink's path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for FileAuditLog {
    fn append(&self, severity: Severity, message: &str) -> Result<(), AuditError> {
        let record = AuditRecord::now(severity, message);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", record.to_line())?;
        file.flush()?;

        Ok(())
    }

    fn tail(&self, count: usize) -> Result<Vec<AuditRecord>, AuditError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let records: Vec<AuditRecord> = content
            .lines()
            .filter_map(|line| {
                let parsed = AuditRecord::parse_line(line);
                if parsed.is_none() && !line.trim().is_empty() {
                    debug!("Skipping unparsable audit line: {}", line);
                }
                parsed
            })
            .collect();

        let skip = records.len().saturating_sub(count);
        Ok(records.into_iter().skip(skip).collect())
    }
}

/// In-memory audit log for tests.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    /// Creates an empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all records.
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Counts records with the given severity.
    #[must_use]
    pub fn count_with_severity(&self, severity: Severity) -> usize {
        self.records()
            .iter()
            .filter(|r| r.severity == severity)
            .count()
    }
}

impl AuditSink for MemoryAuditLog {
    fn append(&self, severity: Severity, message: &str) -> Result<(), AuditError> {
        if let Ok(mut records) = self.records.lock() {
            records.push(AuditRecord::now(severity, message));
        }
        Ok(())
    }

    fn tail(&self, count: usize) -> Result<Vec<AuditRecord>, AuditError> {
        let records = self.records();
        let skip = records.len().saturating_sub(count);
        Ok(records.into_iter().skip(skip).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sink_appends_and_tails() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileAuditLog::new(dir.path().join("watchdog.log"));

        sink.append(Severity::Info, "service healthy").unwrap();
        sink.append(Severity::Warning, "restart attempt 1 of 3").unwrap();
        sink.append(Severity::Critical, "ceiling reached").unwrap();

        let all = sink.tail(10).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].message, "service healthy");
        assert_eq!(all[2].severity, Severity::Critical);

        let last_two = sink.tail(2).unwrap();
        assert_eq!(last_two.len(), 2);
        assert_eq!(last_two[0].message, "restart attempt 1 of 3");
    }

    #[test]
    fn test_file_sink_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileAuditLog::new(dir.path().join("absent.log"));
        assert!(sink.tail(5).unwrap().is_empty());
    }

    #[test]
    fn test_file_sink_skips_foreign_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchdog.log");
        let sink = FileAuditLog::new(&path);

        sink.append(Severity::Info, "before").unwrap();
        std::fs::write(
            &path,
            format!("{}\ngarbage line\n", std::fs::read_to_string(&path).unwrap()),
        )
        .unwrap();
        sink.append(Severity::Info, "after").unwrap();

        let records = sink.tail(10).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].message, "after");
    }

    #[test]
    fn test_memory_sink_counts() {
        let sink = MemoryAuditLog::new();
        sink.append(Severity::Info, "a").unwrap();
        sink.append(Severity::Critical, "b").unwrap();
        sink.append(Severity::Critical, "c").unwrap();

        assert_eq!(sink.count_with_severity(Severity::Critical), 2);
        assert_eq!(sink.tail(1).unwrap()[0].message, "c");
    }
}
