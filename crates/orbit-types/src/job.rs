//! Job records and job kinds.
//!
//! A job is one pending custodial operation for one wallet. At most one job
//! record exists per wallet at any time; admission deletes orphans from
//! earlier incomplete runs before inserting a replacement.

use serde::{Deserialize, Serialize};

/// The custodial operations a job can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobKind {
	/// Direct hop from the current planet to another planet.
	#[serde(rename = "hop_planet")]
	HopPlanet,
	/// Hop routed through two freshly derived intermediate stars.
	#[serde(rename = "star_two")]
	StarTwo,
	/// Hop routed through three freshly derived intermediate stars.
	#[serde(rename = "star_three")]
	StarThree,
	/// Move the full balance out of custody to an external wallet.
	#[serde(rename = "withdraw")]
	Withdraw,
}

impl JobKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			JobKind::HopPlanet => "hop_planet",
			JobKind::StarTwo => "star_two",
			JobKind::StarThree => "star_three",
			JobKind::Withdraw => "withdraw",
		}
	}

	/// Whether the job's destination names a planet that must be a member of
	/// the universe planet set. Withdraw destinations are external wallets
	/// and are never planet-checked.
	pub fn requires_planet_destination(&self) -> bool {
		!matches!(self, JobKind::Withdraw)
	}
}

impl std::fmt::Display for JobKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Ledger record for one wallet's pending operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
	/// Wallet the job operates on (record key).
	pub wallet: String,
	/// Requested operation.
	#[serde(rename = "type")]
	pub kind: JobKind,
	/// Destination planet name, or destination wallet for withdraws.
	pub destination: String,
	/// Unix timestamp of admission.
	pub created: i64,
	/// Set once the worker has committed the result to the ledger.
	pub completed: bool,
}

impl JobRecord {
	pub fn new(wallet: String, kind: JobKind, destination: String, now: i64) -> Self {
		Self {
			wallet,
			kind,
			destination,
			created: now,
			completed: false,
		}
	}
}
