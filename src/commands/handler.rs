//! Command surface implementation.

use std::sync::Arc;

use tracing::info;

use crate::audit::{AuditRecord, AuditSink, Severity};
use crate::config::WatchdogSettings;
use crate::process::ProcessManager;
use crate::supervisor::{
    CheckVerdict, CounterStore, InvocationLock, StatusProbe, SupervisorLoop,
};

use super::types::{CommandError, StatusReport};

/// Executes the watchdog's operator-facing operations.
pub struct CommandHandler {
    /// Watchdog settings (service name, state paths, policy).
    settings: WatchdogSettings,

    /// Process manager capability.
    manager: Arc<dyn ProcessManager>,

    /// Durable restart counter.
    counter: Arc<dyn CounterStore>,

    /// Audit trail sink.
    audit: Arc<dyn AuditSink>,
}

impl CommandHandler {
    /// Creates a command handler over the given collaborators.
    #[must_use]
    pub fn new(
        settings: WatchdogSettings,
        manager: Arc<dyn ProcessManager>,
        counter: Arc<dyn CounterStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            settings,
            manager,
            counter,
            audit,
        }
    }

    /// Runs one supervision pass under the advisory invocation lock.
    ///
    /// # Errors
    ///
    /// Fails when another invocation holds the lock or the counter slot is
    /// unreadable while the service is down. An unhealthy-but-handled
    /// service is a successful check.
    pub async fn check(&self) -> Result<CheckVerdict, CommandError> {
        let _lock = InvocationLock::acquire(self.settings.lock_path())?;

        let supervisor = SupervisorLoop::new(
            self.settings.service_name.clone(),
            self.settings.policy.clone(),
            Arc::clone(&self.manager),
            Arc::clone(&self.counter),
            Arc::clone(&self.audit),
        );

        Ok(supervisor.run_check().await?)
    }

    /// Reports the service state and failure history. Read-only.
    pub async fn status(&self) -> Result<StatusReport, CommandError> {
        let probe = StatusProbe::new(Arc::clone(&self.manager));
        let state = probe.state(&self.settings.service_name).await;
        let restart_attempts = self.counter.load()?;
        let max = self.settings.policy.max_restart_attempts;

        Ok(StatusReport {
            service: self.settings.service_name.clone(),
            state: state.to_string(),
            restart_attempts,
            max_restart_attempts: max,
            exhausted: restart_attempts >= max,
        })
    }

    /// Returns the most recent `count` audit records. Read-only.
    pub fn logs(&self, count: usize) -> Result<Vec<AuditRecord>, CommandError> {
        Ok(self.audit.tail(count)?)
    }

    /// Forces the restart counter to 0, regardless of current state.
    pub fn reset(&self) -> Result<(), CommandError> {
        self.counter.reset()?;
        info!("Restart counter reset by operator");

        if let Err(e) = self
            .audit
            .append(Severity::Info, "restart counter reset by operator")
        {
            tracing::warn!("Failed to append audit record: {}", e);
        }

        Ok(())
    }
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditLog;
    use crate::config::SupervisionPolicy;
    use crate::process::MockProcessManager;
    use crate::supervisor::MemoryCounter;

    struct Harness {
        manager: Arc<MockProcessManager>,
        counter: Arc<MemoryCounter>,
        audit: Arc<MemoryAuditLog>,
        handler: CommandHandler,
        _state_dir: tempfile::TempDir,
    }

    fn harness(initial_failures: u32) -> Harness {
        let state_dir = tempfile::tempdir().unwrap();
        let manager = Arc::new(MockProcessManager::new());
        let counter = Arc::new(MemoryCounter::with_value(initial_failures));
        let audit = Arc::new(MemoryAuditLog::new());

        let settings = WatchdogSettings {
            service_name: "taskbot.service".to_owned(),
            state_dir: state_dir.path().to_path_buf(),
            policy: SupervisionPolicy {
                max_restart_attempts: 3,
                restart_grace_secs: 0,
                post_restart_verify_secs: 0,
            },
        };

        let handler = CommandHandler::new(
            settings,
            Arc::clone(&manager) as Arc<dyn ProcessManager>,
            Arc::clone(&counter) as Arc<dyn CounterStore>,
            Arc::clone(&audit) as Arc<dyn AuditSink>,
        );

        Harness {
            manager,
            counter,
            audit,
            handler,
            _state_dir: state_dir,
        }
    }

    #[tokio::test]
    async fn test_check_releases_lock_between_invocations() {
        let h = harness(0);
        h.manager.probe_active();
        h.manager.probe_active();

        assert!(h.handler.check().await.is_ok());
        assert!(h.handler.check().await.is_ok());
    }

    #[tokio::test]
    async fn test_check_fails_when_lock_is_held() {
        let h = harness(0);
        let _held = InvocationLock::acquire(h.handler.settings.lock_path()).unwrap();

        assert!(matches!(
            h.handler.check().await,
            Err(CommandError::Lock(_))
        ));
        // The supervised service was never touched.
        assert_eq!(h.manager.probe_calls(), 0);
    }

    #[tokio::test]
    async fn test_status_is_read_only() {
        let h = harness(2);
        h.manager.probe_inactive();

        let report = h.handler.status().await.unwrap();
        assert_eq!(report.state, "stopped");
        assert_eq!(report.restart_attempts, 2);
        assert!(!report.exhausted);

        assert_eq!(h.counter.load().unwrap(), 2);
        assert_eq!(h.manager.restart_calls(), 0);
        assert!(h.audit.records().is_empty());
    }

    #[tokio::test]
    async fn test_status_reports_exhaustion() {
        let h = harness(3);
        h.manager.probe_inactive();

        let report = h.handler.status().await.unwrap();
        assert!(report.exhausted);
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let h = harness(3);

        h.handler.reset().unwrap();
        assert_eq!(h.counter.load().unwrap(), 0);
        h.handler.reset().unwrap();
        assert_eq!(h.counter.load().unwrap(), 0);

        assert_eq!(h.audit.count_with_severity(Severity::Info), 2);
    }

    #[tokio::test]
    async fn test_logs_do_not_mutate() {
        let h = harness(1);
        h.audit.append(Severity::Info, "a").unwrap();
        h.audit.append(Severity::Warning, "b").unwrap();

        let records = h.handler.logs(1).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "b");
        assert_eq!(h.counter.load().unwrap(), 1);
    }
}
