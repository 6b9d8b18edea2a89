//! Core engine for the orbit custody system.
//!
//! Coordinates the full job lifecycle: change events from the jobs table
//! feed the trigger, each admitted insert spawns one worker invocation, and
//! the worker drives its pipeline through submission and confirmation
//! before committing the move to the ledger. The synchronous entry points
//! (deposit registration, job admission, status polling) live under
//! `handlers`.

pub mod engine;
pub mod handlers;
pub mod trigger;
pub mod worker;

pub use engine::{Engine, EngineError};
pub use handlers::{
	DepositError, DepositHandler, DepositRequest, JobStatus, StatusError, StatusHandler,
};
pub use trigger::{decode_job, ChannelTrigger, JobFeed, JobTrigger, TriggerError};
pub use worker::{JobWorker, WorkerError};

/// Shortens a signature or wallet for log lines.
pub(crate) fn truncate_key(id: &str) -> String {
	if id.len() <= 8 {
		id.to_string()
	} else {
		format!("{}..", &id[..8])
	}
}
