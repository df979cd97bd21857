//! Supervision module.
//!
//! Implements the is-it-alive, retry-with-ceiling pattern: a probe of the
//! supervised service, a bounded restart action, and the per-invocation
//! state machine tying them together. All state that must survive between
//! invocations lives in the persistent counter, not in memory.

mod counter;
mod lock;
mod probe;
mod restart;
mod runner;

pub use counter::{CounterError, CounterStore, FileCounter, MemoryCounter};
pub use lock::{InvocationLock, LockError};
pub use probe::StatusProbe;
pub use restart::{RestartAction, RestartOutcome};
pub use runner::{CheckVerdict, SupervisorLoop};
