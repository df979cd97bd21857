//! systemd binding for the process manager capability.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{ProcessError, ProcessManager};

/// Process manager backed by `systemctl`.
#[derive(Debug, Clone, Default)]
pub struct SystemdManager {
    /// Pass `--user` to systemctl (manage a per-user unit).
    user_mode: bool,
}

impl SystemdManager {
    /// Creates a manager for system-level units.
    #[must_use]
    pub const fn new() -> Self {
        Self { user_mode: false }
    }

    /// Switches the manager to per-user units (`systemctl --user`).
    #[must_use]
    pub const fn with_user_mode(mut self, user_mode: bool) -> Self {
        self.user_mode = user_mode;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("systemctl");
        if self.user_mode {
            cmd.arg("--user");
        }
        cmd
    }
}

#[async_trait]
impl ProcessManager for SystemdManager {
    async fn is_active(&self, service: &str) -> Result<bool, ProcessError> {
        // `systemctl is-active --quiet` exits 0 only for active units.
        let status = self
            .command()
            .args(["is-active", "--quiet", service])
            .status()
            .await?;

        debug!("systemctl is-active {}: {}", service, status);
        Ok(status.success())
    }

    async fn restart(&self, service: &str) -> Result<(), ProcessError> {
        let output = self.command().args(["restart", service]).output().await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let status = if stderr.trim().is_empty() {
                output.status.to_string()
            } else {
                stderr.trim().to_owned()
            };
            Err(ProcessError::RestartFailed {
                service: service.to_owned(),
                status,
            })
        }
    }
}
