//! Common types module for the orbit custody engine.
//!
//! This module defines the core data types shared by all orbit components:
//! the deposit and job ledger records, the universe snapshot, transaction
//! pipeline types, and the change-event envelope consumed by the job worker.

/// Deposit records and the per-wallet activity log.
pub mod deposit;
/// Change-event envelope for the job trigger stream.
pub mod events;
/// Job records and job kinds.
pub mod job;
/// Transaction pipeline steps.
pub mod pipeline;
/// Registry trait for self-registering backend implementations.
pub mod registry;
/// Zeroizing wrapper for the manager secret.
pub mod secret;
/// Universe snapshot (planet set and fee parameters).
pub mod universe;
/// Configuration validation framework.
pub mod validation;

pub use deposit::*;
pub use events::*;
pub use job::*;
pub use pipeline::*;
pub use registry::ImplementationRegistry;
pub use secret::SecretString;
pub use universe::*;
pub use validation::*;

/// Current wall-clock time as unix epoch seconds.
pub fn unix_now() -> i64 {
	chrono::Utc::now().timestamp()
}
