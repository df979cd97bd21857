//! Audit trail module.
//!
//! Every supervision decision and outcome is appended to an audit log as an
//! immutable, timestamped record. The log sink is a capability: the real
//! sink appends one line per record to a file, the in-memory sink backs
//! tests.

mod record;
mod sink;

pub use record::{AuditRecord, ParseSeverityError, Severity};
pub use sink::{AuditError, AuditSink, FileAuditLog, MemoryAuditLog};
