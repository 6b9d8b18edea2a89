//! Deposit records and the per-wallet activity log.
//!
//! A deposit record tracks one wallet's funds while they are in custody:
//! where the balance currently sits, how many hops it has made, and the
//! append-only history of every move. Records are created by deposit
//! validation, mutated only by job completion, and deleted when a withdraw
//! job finishes.

use crate::job::JobKind;
use serde::{Deserialize, Serialize};

/// Action codes recorded in the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionCode {
	/// Inbound deposit onto a planet.
	#[serde(rename = "D")]
	Deposit,
	/// Direct planet-to-planet hop.
	#[serde(rename = "HP")]
	HopPlanet,
	/// Hop routed through two intermediate stars.
	#[serde(rename = "HS2")]
	HopStarTwo,
	/// Hop routed through three intermediate stars.
	#[serde(rename = "HS3")]
	HopStarThree,
	/// Outbound withdraw to an external wallet.
	#[serde(rename = "W")]
	Withdraw,
}

impl ActionCode {
	pub fn as_str(&self) -> &'static str {
		match self {
			ActionCode::Deposit => "D",
			ActionCode::HopPlanet => "HP",
			ActionCode::HopStarTwo => "HS2",
			ActionCode::HopStarThree => "HS3",
			ActionCode::Withdraw => "W",
		}
	}
}

impl From<JobKind> for ActionCode {
	fn from(kind: JobKind) -> Self {
		match kind {
			JobKind::HopPlanet => ActionCode::HopPlanet,
			JobKind::StarTwo => ActionCode::HopStarTwo,
			JobKind::StarThree => ActionCode::HopStarThree,
			JobKind::Withdraw => ActionCode::Withdraw,
		}
	}
}

/// One entry in a deposit's activity log.
///
/// Entries are appended in order of occurrence and never rewritten. A
/// two-step hop carries both transaction signatures in submission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
	/// What happened.
	pub action: ActionCode,
	/// Destination planet name, or destination wallet for withdraws.
	pub to: String,
	/// Unix timestamp of completion.
	pub time: i64,
	/// Transaction signature(s) that carried the move, in order.
	pub signatures: Vec<String>,
}

impl ActivityEntry {
	/// The signatures joined for display, `start:end` for two-step hops.
	pub fn joined_signatures(&self) -> String {
		self.signatures.join(":")
	}
}

/// Ledger record for one wallet's custodied funds.
///
/// Exactly one record exists per wallet while funds are in custody. The fee
/// fields snapshot the universe fee parameters at deposit time so later jobs
/// price against the terms the depositor saw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositRecord {
	/// Depositor wallet address (record key).
	pub wallet: String,
	/// Deposited amount in lamports.
	pub deposit: u64,
	/// Planet currently holding the balance.
	pub location: String,
	/// Number of completed relocations.
	pub hops: u64,
	/// Fee snapshot: planet hop.
	pub planet_hop_fee: u64,
	/// Fee snapshot: two-star hop.
	pub star_two_fee: u64,
	/// Fee snapshot: three-star hop.
	pub star_three_fee: u64,
	/// Fee snapshot: withdraw.
	pub withdraw_fee: u64,
	/// Unix timestamp of record creation.
	pub created: i64,
	/// Unix timestamp of the last completed job.
	pub last_updated: i64,
	/// Append-only history, ordered by occurrence.
	pub activity: Vec<ActivityEntry>,
}

impl DepositRecord {
	/// Applies a completed relocation: new location, hop counter bumped by
	/// one, activity entry appended, `last_updated` refreshed.
	pub fn apply_move(&mut self, entry: ActivityEntry, now: i64) {
		self.location = entry.to.clone();
		self.hops += 1;
		self.last_updated = now;
		self.activity.push(entry);
	}

	/// The most recent activity entry, if any.
	pub fn last_activity(&self) -> Option<&ActivityEntry> {
		self.activity.last()
	}
}
