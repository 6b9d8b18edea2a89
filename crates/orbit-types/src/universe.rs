//! Universe snapshot (planet set and fee parameters).
//!
//! The universe account is the on-chain configuration record listing the
//! valid planets and the current fee schedule. It is owned by the on-chain
//! program and read-only to this engine; callers fetch a fresh snapshot per
//! operation rather than caching one across calls.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Decoded universe account state.
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Universe {
	/// Names of every planet currently in the universe.
	pub planets: Vec<String>,
	/// Fee charged on deposit, 0 to disable.
	pub deposit_fee: u64,
	/// Fee for a direct planet hop.
	pub planet_hop_fee: u64,
	/// Fee for a two-star hop.
	pub star_two_fee: u64,
	/// Fee for a three-star hop.
	pub star_three_fee: u64,
	/// Fee for a withdraw.
	pub withdraw_fee: u64,
}

impl Universe {
	/// Membership check against the current planet set.
	pub fn has_planet(&self, name: &str) -> bool {
		self.planets.iter().any(|p| p == name)
	}
}
