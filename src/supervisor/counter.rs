//! Persistent restart attempt counter.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Errors from the counter store.
#[derive(Debug, thiserror::Error)]
pub enum CounterError {
    #[error("Failed to access counter storage: {0}")]
    Io(#[from] std::io::Error),

    #[error("Counter slot holds invalid content: {content:?}")]
    Corrupt { content: String },
}

/// Capability interface over the durable consecutive-failure counter.
///
/// The counter counts failed restart attempts since the last observed
/// healthy state. It is never negative and is only ever mutated by the
/// supervisor loop or an explicit operator reset.
pub trait CounterStore: Send + Sync {
    /// Returns the persisted value, or 0 if nothing was ever stored.
    fn load(&self) -> Result<u32, CounterError>;

    /// Atomically overwrites the persisted value.
    fn save(&self, value: u32) -> Result<(), CounterError>;

    /// Resets the persisted value to 0.
    fn reset(&self) -> Result<(), CounterError> {
        self.save(0)
    }
}

/// File-backed counter: the decimal value as the whole file content.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write never leaves a half-written slot behind.
#[derive(Debug, Clone)]
pub struct FileCounter {
    path: PathBuf,
}

impl FileCounter {
    /// Creates a counter stored at the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the counter's path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CounterStore for FileCounter {
    fn load(&self) -> Result<u32, CounterError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        content.trim().parse().map_err(|_| CounterError::Corrupt {
            content: content.trim().to_owned(),
        })
    }

    fn save(&self, value: u32) -> Result<(), CounterError> {
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, format!("{value}\n"))?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// In-memory counter for tests.
#[derive(Debug, Default)]
pub struct MemoryCounter {
    value: Mutex<u32>,
}

impl MemoryCounter {
    /// Creates a counter holding 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a counter pre-seeded with a value.
    #[must_use]
    pub fn with_value(value: u32) -> Self {
        Self {
            value: Mutex::new(value),
        }
    }
}

impl CounterStore for MemoryCounter {
    fn load(&self) -> Result<u32, CounterError> {
        Ok(self.value.lock().map(|v| *v).unwrap_or_default())
    }

    fn save(&self, value: u32) -> Result<(), CounterError> {
        if let Ok(mut slot) = self.value.lock() {
            *slot = value;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_slot_reads_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let counter = FileCounter::new(dir.path().join("restart_attempts"));
        assert_eq!(counter.load().unwrap(), 0);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let counter = FileCounter::new(dir.path().join("restart_attempts"));

        counter.save(2).unwrap();
        assert_eq!(counter.load().unwrap(), 2);

        counter.save(3).unwrap();
        assert_eq!(counter.load().unwrap(), 3);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let counter = FileCounter::new(dir.path().join("restart_attempts"));

        counter.save(5).unwrap();
        counter.reset().unwrap();
        assert_eq!(counter.load().unwrap(), 0);
        counter.reset().unwrap();
        assert_eq!(counter.load().unwrap(), 0);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let counter = FileCounter::new(dir.path().join("restart_attempts"));
        counter.save(1).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec!["restart_attempts"]);
    }

    #[test]
    fn test_corrupt_slot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restart_attempts");
        std::fs::write(&path, "not a number").unwrap();

        let counter = FileCounter::new(path);
        assert!(matches!(
            counter.load(),
            Err(CounterError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_memory_counter() {
        let counter = MemoryCounter::with_value(2);
        assert_eq!(counter.load().unwrap(), 2);
        counter.save(4).unwrap();
        assert_eq!(counter.load().unwrap(), 4);
        counter.reset().unwrap();
        assert_eq!(counter.load().unwrap(), 0);
    }
}
