//! Job trigger intake.
//!
//! The worker is driven by an insert-only stream of change events on the
//! jobs table. The stream transport is an interface; the in-tree
//! implementation is an in-process channel fed by the admission path,
//! standing in for an external store's change stream. Whatever the
//! transport, events are validated here before they reach the engine:
//! non-insert events and malformed record images are discarded without side
//! effects.

use async_trait::async_trait;
use orbit_types::{ChangeKind, JobChangeEvent, JobRecord};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Errors that can occur while managing a trigger.
#[derive(Debug, Error)]
pub enum TriggerError {
	/// `start` was called twice.
	#[error("Trigger already started")]
	AlreadyStarted,
}

/// Trait defining a source of job change events.
#[async_trait]
pub trait JobTrigger: Send + Sync {
	/// Starts forwarding events into `sink` until stopped.
	async fn start(&self, sink: mpsc::UnboundedSender<JobChangeEvent>) -> Result<(), TriggerError>;

	/// Stops forwarding.
	async fn stop(&self);
}

/// Producer handle for the in-process trigger.
#[derive(Clone)]
pub struct JobFeed {
	sender: mpsc::UnboundedSender<JobChangeEvent>,
}

impl JobFeed {
	/// Pushes one change event into the stream. Dropped silently if the
	/// engine has shut down.
	pub fn push(&self, event: JobChangeEvent) {
		let _ = self.sender.send(event);
	}
}

/// In-process channel trigger.
pub struct ChannelTrigger {
	receiver: Mutex<Option<mpsc::UnboundedReceiver<JobChangeEvent>>>,
	task: Mutex<Option<JoinHandle<()>>>,
}

impl ChannelTrigger {
	/// Creates the trigger and the feed that writes into it.
	pub fn new() -> (Self, JobFeed) {
		let (sender, receiver) = mpsc::unbounded_channel();
		(
			Self {
				receiver: Mutex::new(Some(receiver)),
				task: Mutex::new(None),
			},
			JobFeed { sender },
		)
	}
}

#[async_trait]
impl JobTrigger for ChannelTrigger {
	async fn start(&self, sink: mpsc::UnboundedSender<JobChangeEvent>) -> Result<(), TriggerError> {
		let mut receiver = self
			.receiver
			.lock()
			.await
			.take()
			.ok_or(TriggerError::AlreadyStarted)?;

		let handle = tokio::spawn(async move {
			while let Some(event) = receiver.recv().await {
				if sink.send(event).is_err() {
					break;
				}
			}
		});

		*self.task.lock().await = Some(handle);
		Ok(())
	}

	async fn stop(&self) {
		if let Some(handle) = self.task.lock().await.take() {
			handle.abort();
		}
	}
}

/// Validates a change event into a job record.
///
/// Returns `None`, with a log line but no side effects, for anything
/// other than a well-formed insert.
pub fn decode_job(event: &JobChangeEvent) -> Option<JobRecord> {
	if event.kind != ChangeKind::Insert {
		tracing::debug!(event_id = %event.event_id, kind = ?event.kind, "Event is not an insert, discarding");
		return None;
	}

	let image = match &event.image {
		Some(image) => image,
		None => {
			tracing::warn!(event_id = %event.event_id, "Insert event without a record image, discarding");
			return None;
		},
	};

	match serde_json::from_value::<JobRecord>(image.clone()) {
		Ok(job) => Some(job),
		Err(e) => {
			tracing::warn!(event_id = %event.event_id, error = %e, "Malformed job record, discarding");
			None
		},
	}
}
