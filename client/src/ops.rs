//! Lifecycle operations on the orchestration server itself.
//!
//! Thin wrappers over [`submit`] against the server's well-known
//! administrative endpoints. Like every program, these describe the call
//! without issuing it.

use crate::program::{Program, submit};

/// Reload the server's configuration from disk.
#[must_use]
pub fn reload() -> Program<Vec<u8>> {
    submit("reload", Vec::new())
}

/// Restart the server immediately, abandoning running work.
#[must_use]
pub fn restart() -> Program<Vec<u8>> {
    submit("restart", Vec::new())
}

/// Restart the server once running work has drained.
#[must_use]
pub fn safe_restart() -> Program<Vec<u8>> {
    submit("safeRestart", Vec::new())
}
