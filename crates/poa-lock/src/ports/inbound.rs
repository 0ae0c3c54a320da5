//! Driving ports (Inbound API)

use crate::domain::{Authorization, PoaResult};

/// Entry point the host drives once per script group.
pub trait PoaLockApi {
    /// Validate the current transaction.
    ///
    /// Every check short-circuits; nothing is retried.
    fn verify(&self) -> PoaResult<Authorization>;

    /// Validate and collapse the outcome to a host exit code (0 on success).
    fn run(&self) -> i8 {
        match self.verify() {
            Ok(_) => 0,
            Err(err) => err.exit_code(),
        }
    }
}
