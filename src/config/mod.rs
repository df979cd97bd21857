//! Configuration module for the watchdog.
//!
//! Handles loading and validation of watchdog settings: the supervised
//! service name, the state directory layout, and the supervision policy.

mod settings;

pub use settings::{ConfigError, SupervisionPolicy, WatchdogSettings};

/// File name of the restart attempt counter inside the state directory.
pub const COUNTER_FILE_NAME: &str = "restart_attempts";

/// File name of the audit log inside the state directory.
pub const AUDIT_LOG_FILE_NAME: &str = "watchdog.log";

/// File name of the advisory invocation lock inside the state directory.
pub const LOCK_FILE_NAME: &str = "watchdog.lock";
