//! Account decoders for the custody program's records.

use crate::{account_discriminator, CodecError};
use borsh::{BorshDeserialize, BorshSerialize};
use orbit_types::Universe;

/// Decoded planet holding account.
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct Planet {
	/// Planet name as registered in the universe.
	pub name: String,
	/// Number of custodial moves that have touched this planet.
	pub visits: u64,
}

/// Decoded ephemeral star account. Stars exist only between the two legs of
/// a multi-step hop.
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct Star {
	/// The 8-character identifier the star was derived from.
	pub id: String,
	/// Lamports parked on the star.
	pub deposit: u64,
}

fn decode<T: BorshDeserialize>(data: &[u8], record: &'static str) -> Result<T, CodecError> {
	if data.len() < 8 {
		return Err(CodecError::TooShort);
	}
	if data[..8] != account_discriminator(record) {
		return Err(CodecError::DiscriminatorMismatch(record));
	}
	T::try_from_slice(&data[8..]).map_err(|e| CodecError::Deserialization(e.to_string()))
}

/// Decodes raw universe account bytes.
pub fn decode_universe(data: &[u8]) -> Result<Universe, CodecError> {
	decode(data, "Universe")
}

/// Decodes raw planet account bytes.
pub fn decode_planet(data: &[u8]) -> Result<Planet, CodecError> {
	decode(data, "Planet")
}

/// Decodes raw star account bytes.
pub fn decode_star(data: &[u8]) -> Result<Star, CodecError> {
	decode(data, "Star")
}

/// Encodes a universe record the way the program lays it out. Test support
/// for components that feed decoded snapshots through the gateway boundary.
pub fn encode_universe(universe: &Universe) -> Vec<u8> {
	let mut data = account_discriminator("Universe").to_vec();
	data.extend(borsh::to_vec(universe).unwrap_or_default());
	data
}
