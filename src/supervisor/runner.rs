//! Supervisor loop: one probe → decide → act → persist pass.
//!
//! The loop is a small state machine re-derived on every invocation from
//! the probe result and the persisted counter; nothing is held in memory
//! between invocations:
//! 1. Probe the service. Healthy → clear any failure history, done. A
//!    single healthy observation is enough, there is no probation period.
//! 2. Unhealthy → load the consecutive-failure counter `n`.
//!    - `n >= max_restart_attempts` → log critical, attempt nothing. Only
//!      an operator reset or out-of-band recovery leaves this state.
//!    - else → attempt a restart. Success resets the counter to 0, failure
//!      persists `n + 1`.
//!
//! A counter save failure never aborts the pass: the decision was already
//! acted on, only the next invocation's view of history is at risk.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::audit::{AuditSink, Severity};
use crate::config::SupervisionPolicy;
use crate::process::ProcessManager;

use super::counter::{CounterError, CounterStore};
use super::probe::StatusProbe;
use super::restart::{RestartAction, RestartOutcome};

/// Result of one supervision pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckVerdict {
    /// Service observed healthy.
    Healthy {
        /// Whether a non-zero failure history was cleared by this pass.
        cleared_history: bool,
    },
    /// Service was down, the restart attempt brought it back.
    Recovered {
        /// Which attempt (1-based) succeeded.
        attempt: u32,
    },
    /// Service was down and the restart attempt failed.
    AttemptFailed {
        /// Consecutive failures after this pass.
        consecutive_failures: u32,
    },
    /// Service is down and the retry ceiling is reached; nothing attempted.
    Exhausted {
        /// The persisted failure count.
        attempts: u32,
    },
}

/// Orchestrates one supervision pass over injected collaborators.
pub struct SupervisorLoop {
    /// Name of the supervised service unit.
    service_name: String,

    /// Restart policy.
    policy: SupervisionPolicy,

    /// Liveness probe.
    probe: StatusProbe,

    /// Restart action.
    restart: RestartAction,

    /// Durable consecutive-failure counter.
    counter: Arc<dyn CounterStore>,

    /// Audit trail sink.
    audit: Arc<dyn AuditSink>,
}

impl SupervisorLoop {
    /// Creates a supervisor loop for the given service.
    #[must_use]
    pub fn new(
        service_name: impl Into<String>,
        policy: SupervisionPolicy,
        manager: Arc<dyn ProcessManager>,
        counter: Arc<dyn CounterStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            probe: StatusProbe::new(Arc::clone(&manager)),
            restart: RestartAction::new(manager, policy.clone()),
            policy,
            counter,
            audit,
        }
    }

    /// Runs one supervision pass.
    ///
    /// # Errors
    ///
    /// Returns an error only when the counter slot is unreadable while the
    /// service is down: without the failure history no sound restart
    /// decision can be made. Counter *write* failures and audit sink
    /// failures are downgraded to warnings.
    pub async fn run_check(&self) -> Result<CheckVerdict, CounterError> {
        if self.probe.is_healthy(&self.service_name).await {
            return Ok(self.observe_healthy());
        }

        let failures = self.counter.load()?;
        let max = self.policy.max_restart_attempts;

        if failures >= max {
            error!(
                "{} is down, restart ceiling reached ({} attempts)",
                self.service_name, failures
            );
            self.record(
                Severity::Critical,
                format!(
                    "{} is down and {failures} consecutive restart attempts have failed; \
                     not retrying, manual intervention required (run 'reset' after remediation)",
                    self.service_name
                ),
            );
            return Ok(CheckVerdict::Exhausted { attempts: failures });
        }

        let attempt = failures + 1;
        warn!(
            "{} is down, restart attempt {} of {}",
            self.service_name, attempt, max
        );

        match self.restart.attempt_restart(&self.service_name).await {
            RestartOutcome::Succeeded => {
                info!("{} recovered on attempt {}", self.service_name, attempt);
                self.record(
                    Severity::Info,
                    format!(
                        "{} was down, restarted and healthy again (attempt {attempt} of {max})",
                        self.service_name
                    ),
                );
                self.persist_counter(0);
                Ok(CheckVerdict::Recovered { attempt })
            }
            RestartOutcome::Failed => {
                self.persist_counter(attempt);
                self.record(
                    Severity::Warning,
                    format!(
                        "{} is down and restart attempt {attempt} of {max} failed; \
                         automatic recovery unsuccessful this round",
                        self.service_name
                    ),
                );
                Ok(CheckVerdict::AttemptFailed {
                    consecutive_failures: attempt,
                })
            }
        }
    }

    /// Handles the healthy branch: clear any recorded failure history.
    fn observe_healthy(&self) -> CheckVerdict {
        info!("{} is healthy", self.service_name);
        self.record(Severity::Info, format!("{} is healthy", self.service_name));

        let cleared_history = match self.counter.load() {
            Ok(0) => false,
            Ok(failures) => {
                self.record(
                    Severity::Info,
                    format!(
                        "{} is healthy again, clearing {failures} recorded failed attempts",
                        self.service_name
                    ),
                );
                self.persist_counter(0);
                true
            }
            Err(e) => {
                // The service is fine; repair the slot instead of failing.
                warn!("Counter slot unreadable while healthy ({}), clearing it", e);
                self.persist_counter(0);
                true
            }
        };

        CheckVerdict::Healthy { cleared_history }
    }

    /// Persists the counter, downgrading failures to a warning record.
    fn persist_counter(&self, value: u32) {
        if let Err(e) = self.counter.save(value) {
            warn!("Failed to persist restart counter: {}", e);
            self.record(
                Severity::Warning,
                format!("failed to persist restart counter ({e}); next check may read stale history"),
            );
        }
    }

    /// Appends to the audit trail; a sink failure must not abort the pass.
    fn record(&self, severity: Severity, message: String) {
        if let Err(e) = self.audit.append(severity, &message) {
            warn!("Failed to append audit record: {}", e);
        }
    }
}

impl std::fmt::Debug for SupervisorLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupervisorLoop")
            .field("service_name", &self.service_name)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
