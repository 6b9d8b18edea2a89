//! Deposit validation.
//!
//! Reconciles a confirmed on-chain transaction against the deposit the
//! caller claims to have made: the right accounts must participate, the
//! message must have the expected signer shape, and the depositor's balance
//! drop must equal the planet's balance rise exactly: no partial credit,
//! no rounding. Validation is pure; the ledger insert that follows
//! acceptance happens elsewhere.

use orbit_chain::TransactionEnvelope;
use orbit_codec::planet_address;
use orbit_types::Universe;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Account-count window observed across client surfaces. Six accounts from
/// a bare client, seven or eight from the web app depending on fees.
const ACCOUNT_COUNT_RANGE: std::ops::RangeInclusive<usize> = 6..=8;

/// Read-only unsigned count varies the same way: 3 or 4.
const READONLY_UNSIGNED_RANGE: std::ops::RangeInclusive<u8> = 3..=4;

/// Rejection reasons for a claimed deposit. The message set is fixed;
/// callers surface these verbatim.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DepositRejection {
	#[error("Accounts count is not correct")]
	AccountCount,
	#[error("Number of required accounts is not correct")]
	HeaderShape,
	#[error("Treasury key not found")]
	TreasuryMissing,
	#[error("Program key not found")]
	ProgramMissing,
	#[error("User public key not found")]
	DepositorMissing,
	#[error("Universe public key not found")]
	UniverseMissing,
	#[error("Planet key not found")]
	PlanetMissing,
	#[error("Planet balance change and deposit not the same")]
	BalanceMismatch,
	#[error("Planet not in universe")]
	PlanetNotInUniverse,
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDeposit {
	/// The deposited amount, as proven by the balance deltas.
	pub lamports: u64,
	/// Destination planet name.
	pub planet: String,
}

/// Validates claimed deposits against transaction envelopes.
pub struct DepositValidator {
	program_id: Pubkey,
	universe_address: Pubkey,
	treasury_address: Pubkey,
}

impl DepositValidator {
	pub fn new(program_id: Pubkey, universe_address: Pubkey, treasury_address: Pubkey) -> Self {
		Self {
			program_id,
			universe_address,
			treasury_address,
		}
	}

	/// Runs the full check sequence for one claimed deposit.
	pub fn validate(
		&self,
		envelope: &TransactionEnvelope,
		depositor: &Pubkey,
		planet_name: &str,
		universe: &Universe,
	) -> Result<ValidatedDeposit, DepositRejection> {
		let planet = planet_address(planet_name, &self.program_id);

		if !ACCOUNT_COUNT_RANGE.contains(&envelope.account_keys.len()) {
			return Err(DepositRejection::AccountCount);
		}

		if universe.deposit_fee > 0 && !envelope.contains(&self.treasury_address) {
			return Err(DepositRejection::TreasuryMissing);
		}

		let header = &envelope.header;
		if header.num_required_signatures != 1
			|| header.num_readonly_signed_accounts != 0
			|| !READONLY_UNSIGNED_RANGE.contains(&header.num_readonly_unsigned_accounts)
		{
			return Err(DepositRejection::HeaderShape);
		}

		if !envelope.contains(&self.program_id) {
			return Err(DepositRejection::ProgramMissing);
		}
		let depositor_idx = envelope
			.index_of(depositor)
			.ok_or(DepositRejection::DepositorMissing)?;
		if !envelope.contains(&self.universe_address) {
			return Err(DepositRejection::UniverseMissing);
		}
		let planet_idx = envelope
			.index_of(&planet)
			.ok_or(DepositRejection::PlanetMissing)?;

		// Signed 128-bit arithmetic: a depositor whose balance went up, or
		// truncated balance arrays, must land in BalanceMismatch rather
		// than wrap.
		let pre = |idx: usize| envelope.pre_balances.get(idx).copied().unwrap_or(0) as i128;
		let post = |idx: usize| envelope.post_balances.get(idx).copied().unwrap_or(0) as i128;

		let mut depositor_drop = pre(depositor_idx) - post(depositor_idx) - envelope.fee as i128;
		if universe.deposit_fee > 0 {
			depositor_drop -= universe.deposit_fee as i128;
		}
		let planet_rise = post(planet_idx) - pre(planet_idx);

		if depositor_drop <= 0 || depositor_drop != planet_rise {
			return Err(DepositRejection::BalanceMismatch);
		}

		if !universe.has_planet(planet_name) {
			return Err(DepositRejection::PlanetNotInUniverse);
		}

		Ok(ValidatedDeposit {
			lamports: depositor_drop as u64,
			planet: planet_name.to_string(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use solana_sdk::message::MessageHeader;

	const NETWORK_FEE: u64 = 5_000;

	struct Fixture {
		validator: DepositValidator,
		depositor: Pubkey,
		universe: Universe,
		envelope: TransactionEnvelope,
	}

	/// A well-formed 1_000_000-lamport deposit onto ANDORA with no fee.
	fn fixture() -> Fixture {
		let program_id = Pubkey::new_unique();
		let universe_address = Pubkey::new_unique();
		let treasury_address = Pubkey::new_unique();
		let depositor = Pubkey::new_unique();
		let planet = planet_address("ANDORA", &program_id);

		let envelope = TransactionEnvelope {
			account_keys: vec![
				depositor,
				planet,
				universe_address,
				program_id,
				Pubkey::new_unique(),
				Pubkey::new_unique(),
			],
			header: MessageHeader {
				num_required_signatures: 1,
				num_readonly_signed_accounts: 0,
				num_readonly_unsigned_accounts: 3,
			},
			fee: NETWORK_FEE,
			pre_balances: vec![2_000_000 + NETWORK_FEE, 10_000, 1, 1, 1, 1],
			post_balances: vec![1_000_000, 1_010_000, 1, 1, 1, 1],
		};

		Fixture {
			validator: DepositValidator::new(program_id, universe_address, treasury_address),
			depositor,
			universe: Universe {
				planets: vec!["ANDORA".into(), "BETELGEUSE".into()],
				deposit_fee: 0,
				planet_hop_fee: 0,
				star_two_fee: 0,
				star_three_fee: 0,
				withdraw_fee: 0,
			},
			envelope,
		}
	}

	#[test]
	fn exact_balance_match_is_accepted() {
		let f = fixture();
		let validated = f
			.validator
			.validate(&f.envelope, &f.depositor, "ANDORA", &f.universe)
			.unwrap();
		assert_eq!(validated.lamports, 1_000_000);
		assert_eq!(validated.planet, "ANDORA");
	}

	#[test]
	fn off_by_one_lamport_is_rejected() {
		let mut f = fixture();
		f.envelope.post_balances[1] = 1_009_999;
		let err = f
			.validator
			.validate(&f.envelope, &f.depositor, "ANDORA", &f.universe)
			.unwrap_err();
		assert_eq!(err, DepositRejection::BalanceMismatch);
	}

	#[test]
	fn deposit_fee_is_subtracted_before_comparison() {
		let mut f = fixture();
		f.universe.deposit_fee = 50_000;
		// Depositor pays deposit + network fee + treasury fee; planet still
		// rises by the bare deposit.
		f.envelope.account_keys.push(f.validator.treasury_address);
		f.envelope.pre_balances.push(0);
		f.envelope.post_balances.push(50_000);
		f.envelope.pre_balances[0] = 2_000_000 + NETWORK_FEE + 50_000;

		let validated = f
			.validator
			.validate(&f.envelope, &f.depositor, "ANDORA", &f.universe)
			.unwrap();
		assert_eq!(validated.lamports, 1_000_000);
	}

	#[test]
	fn fee_without_treasury_account_is_rejected() {
		let mut f = fixture();
		f.universe.deposit_fee = 50_000;
		let err = f
			.validator
			.validate(&f.envelope, &f.depositor, "ANDORA", &f.universe)
			.unwrap_err();
		assert_eq!(err, DepositRejection::TreasuryMissing);
	}

	#[test]
	fn account_count_window_is_enforced() {
		let mut f = fixture();
		f.envelope.account_keys.truncate(5);
		f.envelope.pre_balances.truncate(5);
		f.envelope.post_balances.truncate(5);
		let err = f
			.validator
			.validate(&f.envelope, &f.depositor, "ANDORA", &f.universe)
			.unwrap_err();
		assert_eq!(err, DepositRejection::AccountCount);
	}

	#[test]
	fn extra_signers_are_rejected_as_malformed() {
		let mut f = fixture();
		f.envelope.header.num_required_signatures = 2;
		let err = f
			.validator
			.validate(&f.envelope, &f.depositor, "ANDORA", &f.universe)
			.unwrap_err();
		assert_eq!(err, DepositRejection::HeaderShape);
	}

	#[test]
	fn missing_planet_account_is_rejected() {
		let f = fixture();
		// Claim a different planet; its derived address is not in the
		// account list even though the name is a valid universe member.
		let err = f
			.validator
			.validate(&f.envelope, &f.depositor, "BETELGEUSE", &f.universe)
			.unwrap_err();
		assert_eq!(err, DepositRejection::PlanetMissing);
	}

	#[test]
	fn unknown_planet_is_rejected_after_balances_check() {
		let mut f = fixture();
		// Rebuild the envelope around a planet missing from the universe.
		let rogue = planet_address("PLUTO", &f.validator.program_id);
		f.envelope.account_keys[1] = rogue;
		let err = f
			.validator
			.validate(&f.envelope, &f.depositor, "PLUTO", &f.universe)
			.unwrap_err();
		assert_eq!(err, DepositRejection::PlanetNotInUniverse);
	}

	#[test]
	fn depositor_gaining_balance_is_rejected() {
		let mut f = fixture();
		f.envelope.pre_balances[0] = 1_000_000;
		f.envelope.post_balances[0] = 2_000_000;
		let err = f
			.validator
			.validate(&f.envelope, &f.depositor, "ANDORA", &f.universe)
			.unwrap_err();
		assert_eq!(err, DepositRejection::BalanceMismatch);
	}
}
