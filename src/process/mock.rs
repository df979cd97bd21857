//! Scripted process manager double.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{ProcessError, ProcessManager};

/// Scripted answer for one liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeScript {
    Active,
    Inactive,
    Unreachable,
}

/// Process manager double driven by pre-scripted answers.
///
/// Probe answers and restart outcomes are consumed in FIFO order; an
/// exhausted script reports inactive / successful restart. Call counts are
/// recorded so tests can assert that no restart was issued.
#[derive(Debug, Default)]
pub struct MockProcessManager {
    probe_script: Mutex<VecDeque<ProbeScript>>,
    restart_script: Mutex<VecDeque<bool>>,
    probe_calls: AtomicUsize,
    restart_calls: AtomicUsize,
}

impl MockProcessManager {
    /// Creates a double with empty scripts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the next probe to report the service active.
    pub fn probe_active(&self) {
        self.push_probe(ProbeScript::Active);
    }

    /// Scripts the next probe to report the service inactive.
    pub fn probe_inactive(&self) {
        self.push_probe(ProbeScript::Inactive);
    }

    /// Scripts the next probe to fail (manager unreachable).
    pub fn probe_unreachable(&self) {
        self.push_probe(ProbeScript::Unreachable);
    }

    /// Scripts the next restart command to succeed.
    pub fn restart_ok(&self) {
        self.push_restart(true);
    }

    /// Scripts the next restart command to fail.
    pub fn restart_fails(&self) {
        self.push_restart(false);
    }

    /// Number of liveness probes issued so far.
    #[must_use]
    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    /// Number of restart commands issued so far.
    #[must_use]
    pub fn restart_calls(&self) -> usize {
        self.restart_calls.load(Ordering::SeqCst)
    }

    fn push_probe(&self, entry: ProbeScript) {
        if let Ok(mut script) = self.probe_script.lock() {
            script.push_back(entry);
        }
    }

    fn push_restart(&self, ok: bool) {
        if let Ok(mut script) = self.restart_script.lock() {
            script.push_back(ok);
        }
    }
}

#[async_trait]
impl ProcessManager for MockProcessManager {
    async fn is_active(&self, _service: &str) -> Result<bool, ProcessError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);

        let next = self
            .probe_script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or(ProbeScript::Inactive);

        match next {
            ProbeScript::Active => Ok(true),
            ProbeScript::Inactive => Ok(false),
            ProbeScript::Unreachable => Err(ProcessError::Invocation(std::io::Error::other(
                "scripted: manager unreachable",
            ))),
        }
    }

    async fn restart(&self, service: &str) -> Result<(), ProcessError> {
        self.restart_calls.fetch_add(1, Ordering::SeqCst);

        let ok = self
            .restart_script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or(true);

        if ok {
            Ok(())
        } else {
            Err(ProcessError::RestartFailed {
                service: service.to_owned(),
                status: "scripted failure".to_owned(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripts_consume_in_order() {
        let manager = MockProcessManager::new();
        manager.probe_active();
        manager.probe_inactive();

        assert!(manager.is_active("x").await.unwrap());
        assert!(!manager.is_active("x").await.unwrap());
        // Exhausted script defaults to inactive.
        assert!(!manager.is_active("x").await.unwrap());
        assert_eq!(manager.probe_calls(), 3);
    }

    #[tokio::test]
    async fn test_scripted_restart_failure() {
        let manager = MockProcessManager::new();
        manager.restart_fails();

        assert!(manager.restart("taskbot.service").await.is_err());
        assert!(manager.restart("taskbot.service").await.is_ok());
        assert_eq!(manager.restart_calls(), 2);
    }
}
