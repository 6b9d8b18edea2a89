//! Engine run loop.
//!
//! Subscribes to the job trigger and spawns one worker task per decoded
//! insert event. Jobs for different wallets run concurrently with no
//! coordination; a failed job logs and terminates, leaving its record
//! uncompleted for the next admission cycle to recover.

use crate::handlers::{DepositHandler, StatusHandler};
use crate::trigger::{decode_job, JobTrigger, TriggerError};
use crate::worker::JobWorker;
use orbit_order::JobAdmission;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur while running the engine.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error(transparent)]
	Trigger(#[from] TriggerError),
}

/// The assembled engine: trigger-driven worker plus synchronous handlers.
pub struct Engine {
	deposits: DepositHandler,
	admission: JobAdmission,
	status: StatusHandler,
	worker: Arc<JobWorker>,
	trigger: Box<dyn JobTrigger>,
}

impl Engine {
	pub fn new(
		deposits: DepositHandler,
		admission: JobAdmission,
		status: StatusHandler,
		worker: Arc<JobWorker>,
		trigger: Box<dyn JobTrigger>,
	) -> Self {
		Self {
			deposits,
			admission,
			status,
			worker,
			trigger,
		}
	}

	/// Deposit registration and lookup.
	pub fn deposits(&self) -> &DepositHandler {
		&self.deposits
	}

	/// Job admission with orphan recovery.
	pub fn admission(&self) -> &JobAdmission {
		&self.admission
	}

	/// Job status polling.
	pub fn status(&self) -> &StatusHandler {
		&self.status
	}

	/// Consumes trigger events until interrupted.
	///
	/// Each well-formed insert spawns an independent worker invocation;
	/// malformed and non-insert events are dropped at the decode boundary.
	pub async fn run(&self) -> Result<(), EngineError> {
		let (event_tx, mut event_rx) = mpsc::unbounded_channel();
		self.trigger.start(event_tx).await?;

		tracing::info!("Engine running");

		loop {
			tokio::select! {
				Some(event) = event_rx.recv() => {
					if let Some(job) = decode_job(&event) {
						let worker = Arc::clone(&self.worker);
						tokio::spawn(async move {
							let wallet = job.wallet.clone();
							if let Err(e) = worker.process(job).await {
								// Asynchronous jobs log and terminate; the
								// uncompleted job record is the observable
								// outcome.
								tracing::error!(wallet = %wallet, error = %e, "Job failed");
							}
						});
					}
				}

				_ = tokio::signal::ctrl_c() => {
					break;
				}
			}
		}

		self.trigger.stop().await;
		tracing::info!("Engine stopped");
		Ok(())
	}
}
