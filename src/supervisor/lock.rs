//! Advisory lock guarding against overlapping check invocations.
//!
//! The scheduler is expected to never start a check while a previous one is
//! still running; the lock catches the case where an operator runs `check`
//! by hand while a scheduled invocation is in flight. It is an OS advisory
//! lock on an open-or-create file: the kernel releases it when the holding
//! process exits, so a killed invocation never leaves the watchdog wedged.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use fs2::FileExt;
use tracing::debug;

/// Errors from acquiring the invocation lock.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Another check invocation is already running (lock on {path} is held)")]
    AlreadyLocked { path: PathBuf },

    #[error("Failed to access lock file: {0}")]
    Io(#[from] std::io::Error),
}

/// Lock held for the duration of one check invocation.
///
/// The exclusive lock lives on the open file handle and is released when
/// the guard is dropped or the process dies. The lock file itself is left
/// in place; its presence alone means nothing.
#[derive(Debug)]
pub struct InvocationLock {
    file: File,
}

impl InvocationLock {
    /// Acquires the lock, failing fast if another process holds it.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, LockError> {
        let path = path.into();

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                return Err(LockError::AlreadyLocked { path });
            }
            Err(e) => return Err(e.into()),
        }

        // The pid tells an operator who is holding the lock.
        let _ = file.set_len(0);
        let _ = writeln!(file, "{}", std::process::id());

        debug!("Acquired invocation lock at {}", path.display());
        Ok(Self { file })
    }
}

impl Drop for InvocationLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_is_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchdog.lock");

        let held = InvocationLock::acquire(&path).unwrap();
        assert!(matches!(
            InvocationLock::acquire(&path),
            Err(LockError::AlreadyLocked { .. })
        ));
        drop(held);

        // Released on drop, can be re-acquired.
        assert!(InvocationLock::acquire(&path).is_ok());
    }

    #[test]
    fn test_leftover_lock_file_does_not_block() {
        // A file left behind by a killed invocation carries no lock; only a
        // live holder may block the check.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchdog.lock");
        std::fs::write(&path, "12345\n").unwrap();

        for _ in 0..3 {
            let lock = InvocationLock::acquire(&path);
            assert!(lock.is_ok());
        }
    }

    #[test]
    fn test_lock_file_records_holder_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchdog.lock");

        let _held = InvocationLock::acquire(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), std::process::id().to_string());
    }
}
