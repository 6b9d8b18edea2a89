//! Synchronous entry points.
//!
//! These handlers are invoked directly by outer surfaces (a CLI, a queue
//! consumer, an RPC shim) rather than by the change-event loop. Every one
//! of them returns a structured status or reason, never a raw panic or a
//! bare I/O error.

pub mod deposit;
pub mod status;

pub use deposit::{DepositError, DepositHandler, DepositRequest};
pub use status::{JobStatus, StatusError, StatusHandler};
