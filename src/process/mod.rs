//! Process manager capability module.
//!
//! The watchdog never talks to the host process manager directly; it goes
//! through the [`ProcessManager`] trait so the systemd binding can be
//! swapped for a scripted double in tests (or another backend entirely).

mod mock;
mod systemd;

pub use mock::MockProcessManager;
pub use systemd::SystemdManager;

use async_trait::async_trait;

/// Errors from the process manager binding.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Failed to invoke process manager: {0}")]
    Invocation(#[from] std::io::Error),

    #[error("Restart command for '{service}' exited with {status}")]
    RestartFailed { service: String, status: String },
}

/// Liveness of the supervised service as reported by the process manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Running,
    Stopped,
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Capability interface over the host process manager.
#[async_trait]
pub trait ProcessManager: Send + Sync {
    /// Reports whether the named service is currently active.
    async fn is_active(&self, service: &str) -> Result<bool, ProcessError>;

    /// Restarts the named service.
    ///
    /// # Errors
    ///
    /// Returns an error when the restart command itself could not be issued
    /// or reported failure. A restart that executes but leaves the service
    /// unhealthy is not detectable here; callers re-probe after a delay.
    async fn restart(&self, service: &str) -> Result<(), ProcessError>;
}
