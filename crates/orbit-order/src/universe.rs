//! Fresh universe snapshots through the gateway.

use orbit_chain::{ChainError, ChainInterface};
use orbit_codec::CodecError;
use orbit_types::Universe;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while fetching the universe.
#[derive(Debug, Error)]
pub enum UniverseError {
	/// Neither endpoint could serve the universe account.
	#[error("Universe not found")]
	Unavailable(#[source] ChainError),
	/// The account bytes did not decode as a universe record.
	#[error("Universe account undecodable: {0}")]
	Undecodable(#[from] CodecError),
}

/// Reads the universe account on demand.
///
/// Every call fetches and decodes a fresh snapshot; fee parameters and the
/// planet set are never cached across operations.
pub struct UniverseSource {
	chain: Arc<dyn ChainInterface>,
	address: Pubkey,
}

impl UniverseSource {
	pub fn new(chain: Arc<dyn ChainInterface>, address: Pubkey) -> Self {
		Self { chain, address }
	}

	/// The universe account's address.
	pub fn address(&self) -> &Pubkey {
		&self.address
	}

	/// Fetches and decodes the current universe state.
	pub async fn snapshot(&self) -> Result<Universe, UniverseError> {
		let data = self
			.chain
			.account_data(&self.address)
			.await
			.map_err(UniverseError::Unavailable)?;
		Ok(orbit_codec::decode_universe(&data)?)
	}
}
