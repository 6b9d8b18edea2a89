//! Program-derived addresses for planets and stars.
//!
//! These derivations must stay bit-exact with the on-chain program: a
//! mismatched seed produces a different (valid-looking) address, so
//! downstream account matching fails silently rather than erroring.

use solana_sdk::pubkey::Pubkey;

/// Seed bytes bracketing a planet name.
pub const PLANET_SEED_PREFIX: &[u8] = b"_PLA_";
pub const PLANET_SEED_SUFFIX: &[u8] = b"_NET_";

/// Seed bytes bracketing a star identifier.
pub const STAR_SEED_PREFIX: &[u8] = b"_ST_";
pub const STAR_SEED_SUFFIX: &[u8] = b"_AR_";

/// Derived address of the named planet's holding account.
pub fn planet_address(name: &str, program_id: &Pubkey) -> Pubkey {
	Pubkey::find_program_address(
		&[PLANET_SEED_PREFIX, name.as_bytes(), PLANET_SEED_SUFFIX],
		program_id,
	)
	.0
}

/// Derived address of an ephemeral star's holding account.
pub fn star_address(star_id: &str, program_id: &Pubkey) -> Pubkey {
	Pubkey::find_program_address(
		&[STAR_SEED_PREFIX, star_id.as_bytes(), STAR_SEED_SUFFIX],
		program_id,
	)
	.0
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn planet_derivation_is_deterministic() {
		let program_id = Pubkey::new_unique();
		assert_eq!(
			planet_address("ANDORA", &program_id),
			planet_address("ANDORA", &program_id)
		);
	}

	#[test]
	fn distinct_names_and_programs_derive_distinct_addresses() {
		let program_a = Pubkey::new_unique();
		let program_b = Pubkey::new_unique();
		assert_ne!(
			planet_address("ANDORA", &program_a),
			planet_address("BETELGEUSE", &program_a)
		);
		assert_ne!(
			planet_address("ANDORA", &program_a),
			planet_address("ANDORA", &program_b)
		);
	}

	#[test]
	fn planet_and_star_seed_spaces_do_not_overlap() {
		let program_id = Pubkey::new_unique();
		assert_ne!(
			planet_address("XJ29QPLM", &program_id),
			star_address("XJ29QPLM", &program_id)
		);
	}
}
