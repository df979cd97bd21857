//! Restart action with post-restart verification.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::SupervisionPolicy;
use crate::process::ProcessManager;

use super::StatusProbe;

/// Outcome of one restart attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOutcome {
    /// The service was healthy at the final verification probe.
    Succeeded,
    /// The restart command failed, or the service was still down afterwards.
    Failed,
}

/// Issues a restart and verifies the result after a grace period.
#[derive(Clone)]
pub struct RestartAction {
    manager: Arc<dyn ProcessManager>,
    probe: StatusProbe,
    policy: SupervisionPolicy,
}

impl RestartAction {
    /// Creates a restart action over the given process manager.
    #[must_use]
    pub fn new(manager: Arc<dyn ProcessManager>, policy: SupervisionPolicy) -> Self {
        let probe = StatusProbe::new(Arc::clone(&manager));
        Self {
            manager,
            probe,
            policy,
        }
    }

    /// Restarts the service and classifies the attempt.
    ///
    /// The verification is two-staged: the process manager may report
    /// "active" immediately while the bot is still starting up, so after the
    /// grace period an additional delay passes before the final probe
    /// decides the outcome.
    pub async fn attempt_restart(&self, service: &str) -> RestartOutcome {
        if let Err(e) = self.manager.restart(service).await {
            warn!("Restart command for {} failed: {}", service, e);
            return RestartOutcome::Failed;
        }

        debug!(
            "Restart issued for {}, waiting {:?} grace period",
            service,
            self.policy.restart_grace_period()
        );
        sleep(self.policy.restart_grace_period()).await;
        sleep(self.policy.post_restart_verify_delay()).await;

        if self.probe.is_healthy(service).await {
            RestartOutcome::Succeeded
        } else {
            RestartOutcome::Failed
        }
    }
}

impl std::fmt::Debug for RestartAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestartAction")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
