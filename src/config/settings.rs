//! Watchdog settings and supervision policy.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{AUDIT_LOG_FILE_NAME, COUNTER_FILE_NAME, LOCK_FILE_NAME};

/// Policy governing restart attempts.
///
/// Constant for the lifetime of one watchdog process; the counter it is
/// compared against lives in the state directory and survives restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisionPolicy {
    /// Maximum consecutive failed restart attempts before giving up.
    #[serde(default = "default_max_restart_attempts")]
    pub max_restart_attempts: u32,

    /// Seconds to wait after issuing a restart before verification begins.
    #[serde(default = "default_restart_grace_secs")]
    pub restart_grace_secs: u64,

    /// Additional seconds to wait before the final liveness check.
    ///
    /// Process managers may report "active" before the bot has finished its
    /// own startup sequence; re-checking after this delay tolerates that.
    #[serde(default = "default_verify_delay_secs")]
    pub post_restart_verify_secs: u64,
}

fn default_max_restart_attempts() -> u32 {
    3
}

fn default_restart_grace_secs() -> u64 {
    5
}

fn default_verify_delay_secs() -> u64 {
    5
}

impl Default for SupervisionPolicy {
    fn default() -> Self {
        Self {
            max_restart_attempts: default_max_restart_attempts(),
            restart_grace_secs: default_restart_grace_secs(),
            post_restart_verify_secs: default_verify_delay_secs(),
        }
    }
}

impl SupervisionPolicy {
    /// Returns the grace period as a [`Duration`].
    #[must_use]
    pub const fn restart_grace_period(&self) -> Duration {
        Duration::from_secs(self.restart_grace_secs)
    }

    /// Returns the post-restart verification delay as a [`Duration`].
    #[must_use]
    pub const fn post_restart_verify_delay(&self) -> Duration {
        Duration::from_secs(self.post_restart_verify_secs)
    }

    /// Validates the policy.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_restart_attempts` is zero.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.max_restart_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts);
        }
        Ok(())
    }
}

/// Watchdog-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchdogSettings {
    /// Name of the supervised service unit.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Directory holding the counter file, audit log and lock file.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// Restart policy.
    #[serde(default)]
    pub policy: SupervisionPolicy,
}

fn default_service_name() -> String {
    "taskbot.service".to_owned()
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("/var/lib/bot-watchdog")
}

impl Default for WatchdogSettings {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            state_dir: default_state_dir(),
            policy: SupervisionPolicy::default(),
        }
    }
}

impl WatchdogSettings {
    /// Creates settings from environment variables with defaults.
    ///
    /// Recognised variables: `WATCHDOG_SERVICE`, `WATCHDOG_STATE_DIR`,
    /// `WATCHDOG_MAX_RESTART_ATTEMPTS`, `WATCHDOG_RESTART_GRACE_SECS`,
    /// `WATCHDOG_VERIFY_DELAY_SECS`. Unparsable values fall back to the
    /// defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self {
            service_name: std::env::var("WATCHDOG_SERVICE")
                .unwrap_or_else(|_| default_service_name()),
            state_dir: std::env::var("WATCHDOG_STATE_DIR")
                .map_or_else(|_| default_state_dir(), PathBuf::from),
            policy: SupervisionPolicy {
                max_restart_attempts: std::env::var("WATCHDOG_MAX_RESTART_ATTEMPTS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_max_restart_attempts),
                restart_grace_secs: std::env::var("WATCHDOG_RESTART_GRACE_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_restart_grace_secs),
                post_restart_verify_secs: std::env::var("WATCHDOG_VERIFY_DELAY_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_verify_delay_secs),
            },
        }
    }

    /// Path of the restart attempt counter file.
    #[must_use]
    pub fn counter_path(&self) -> PathBuf {
        self.state_dir.join(COUNTER_FILE_NAME)
    }

    /// Path of the audit log file.
    #[must_use]
    pub fn audit_log_path(&self) -> PathBuf {
        self.state_dir.join(AUDIT_LOG_FILE_NAME)
    }

    /// Path of the advisory invocation lock file.
    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        self.state_dir.join(LOCK_FILE_NAME)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("max_restart_attempts must be at least 1")]
    InvalidMaxAttempts,
}
