//! Command surface types.

use serde::Serialize;

use crate::audit::AuditError;
use crate::supervisor::{CounterError, LockError};

/// Default number of audit records shown by `logs`.
pub const DEFAULT_LOG_COUNT: usize = 20;

/// Errors from the command surface.
///
/// Only raised when the requested operation itself could not be performed;
/// a detected-but-handled unhealthy service is not an error.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Counter(#[from] CounterError),

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Snapshot produced by the `status` operation.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Supervised service unit name.
    pub service: String,

    /// Current service state as reported by the process manager.
    pub state: String,

    /// Persisted consecutive-failure count.
    pub restart_attempts: u32,

    /// Configured retry ceiling.
    pub max_restart_attempts: u32,

    /// Whether the ceiling is reached and automatic restarts are suspended.
    pub exhausted: bool,
}

impl std::fmt::Display for StatusReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let note = if self.exhausted {
            "\nAutomatic restarts suspended; run 'reset' after manual remediation."
        } else {
            ""
        };
        write!(
            f,
            "Service: {}\n\
             State: {}\n\
             Restart attempts: {}/{}{note}",
            self.service, self.state, self.restart_attempts, self.max_restart_attempts
        )
    }
}
