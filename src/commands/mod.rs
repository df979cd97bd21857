//! Command surface module.
//!
//! The four externally invokable operations: `check` (one supervision
//! pass), `status`, `logs` and `reset`. Each is independent; everything
//! except `check` and `reset` is read-only.

mod handler;
mod types;

pub use handler::CommandHandler;
pub use types::{CommandError, StatusReport, DEFAULT_LOG_COUNT};
