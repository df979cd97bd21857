//! Liveness probe over the process manager capability.

use std::sync::Arc;

use tracing::warn;

use crate::process::{ProcessManager, ServiceState};

/// Queries the process manager for the supervised service's liveness.
///
/// Fail-closed: if the manager cannot be queried, the service is reported
/// unhealthy. An indeterminate state needs attention, it is never silently
/// treated as healthy.
#[derive(Clone)]
pub struct StatusProbe {
    manager: Arc<dyn ProcessManager>,
}

impl StatusProbe {
    /// Creates a probe over the given process manager.
    #[must_use]
    pub fn new(manager: Arc<dyn ProcessManager>) -> Self {
        Self { manager }
    }

    /// Reports whether the service is currently healthy. No side effects.
    pub async fn is_healthy(&self, service: &str) -> bool {
        match self.manager.is_active(service).await {
            Ok(active) => active,
            Err(e) => {
                warn!("Liveness query for {} failed, treating as unhealthy: {}", service, e);
                false
            }
        }
    }

    /// Reports the service state for display purposes.
    pub async fn state(&self, service: &str) -> ServiceState {
        if self.is_healthy(service).await {
            ServiceState::Running
        } else {
            ServiceState::Stopped
        }
    }
}

impl std::fmt::Debug for StatusProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusProbe").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::MockProcessManager;

    #[tokio::test]
    async fn test_active_service_is_healthy() {
        let manager = Arc::new(MockProcessManager::new());
        manager.probe_active();

        let probe = StatusProbe::new(manager);
        assert!(probe.is_healthy("taskbot.service").await);
    }

    #[tokio::test]
    async fn test_unreachable_manager_is_unhealthy() {
        let manager = Arc::new(MockProcessManager::new());
        manager.probe_unreachable();

        let probe = StatusProbe::new(Arc::clone(&manager) as Arc<dyn ProcessManager>);
        assert!(!probe.is_healthy("taskbot.service").await);
    }

    #[tokio::test]
    async fn test_state_for_display() {
        let manager = Arc::new(MockProcessManager::new());
        manager.probe_active();
        manager.probe_inactive();

        let probe = StatusProbe::new(manager);
        assert_eq!(probe.state("taskbot.service").await, ServiceState::Running);
        assert_eq!(probe.state("taskbot.service").await, ServiceState::Stopped);
    }
}
