//! Instruction and account codec for the on-chain custody program.
//!
//! This crate is the engine's only knowledge of the program's wire format:
//! it builds instruction payloads from typed arguments and decodes raw
//! account bytes into typed records. Payloads carry an 8-byte method
//! discriminator followed by borsh-encoded arguments; accounts carry an
//! 8-byte record discriminator followed by borsh-encoded state. The rest of
//! the engine treats both directions as opaque.

use sha2::{Digest, Sha256};
use thiserror::Error;

pub mod accounts;
pub mod derive;
pub mod instructions;

pub use accounts::{decode_planet, decode_star, decode_universe};
pub use derive::{planet_address, star_address};
pub use instructions::ProgramCodec;

/// Errors that can occur while decoding account bytes.
#[derive(Debug, Error)]
pub enum CodecError {
	/// The account data is shorter than its discriminator.
	#[error("Account data too short")]
	TooShort,
	/// The discriminator does not match the expected record type.
	#[error("Discriminator mismatch for {0}")]
	DiscriminatorMismatch(&'static str),
	/// The payload after the discriminator failed to deserialize.
	#[error("Deserialization failed: {0}")]
	Deserialization(String),
}

/// 8-byte method discriminator: `sha256("global:<name>")[..8]`.
pub(crate) fn method_discriminator(name: &str) -> [u8; 8] {
	discriminator("global", name)
}

/// 8-byte account discriminator: `sha256("account:<name>")[..8]`.
pub(crate) fn account_discriminator(name: &str) -> [u8; 8] {
	discriminator("account", name)
}

fn discriminator(namespace: &str, name: &str) -> [u8; 8] {
	let mut hasher = Sha256::new();
	hasher.update(format!("{}:{}", namespace, name).as_bytes());
	let digest = hasher.finalize();
	let mut out = [0u8; 8];
	out.copy_from_slice(&digest[..8]);
	out
}
