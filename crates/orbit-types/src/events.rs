//! Change-event envelope for the job trigger stream.
//!
//! The worker is driven by an ordered stream of change events on the jobs
//! table. Only insert events carry work; everything else is discarded at the
//! decode boundary without side effects. The record image arrives untyped
//! and is validated into a [`JobRecord`](crate::JobRecord) before it enters
//! the engine.

use serde::{Deserialize, Serialize};

/// The kind of table change an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
	Insert,
	Modify,
	Remove,
}

/// One change event from the jobs table stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobChangeEvent {
	/// Stream-assigned event identifier, carried through for logging.
	pub event_id: String,
	/// What kind of change this is.
	pub kind: ChangeKind,
	/// The new record image for inserts, untyped until validated.
	#[serde(default)]
	pub image: Option<serde_json::Value>,
}

impl JobChangeEvent {
	/// Convenience constructor for an insert event carrying a record image.
	pub fn insert(event_id: impl Into<String>, image: serde_json::Value) -> Self {
		Self {
			event_id: event_id.into(),
			kind: ChangeKind::Insert,
			image: Some(image),
		}
	}
}
