//! Instruction builders for the custody program.
//!
//! Each builder encodes its arguments with borsh behind the method
//! discriminator and lists the accounts in the order the program expects.
//! The manager signs every custodial instruction; the bang (deposit
//! trigger) is the one instruction signed by the depositor instead.

use crate::method_discriminator;
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

#[derive(BorshSerialize, BorshDeserialize)]
struct PlanetHopArgs {
	lamports: u64,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct StarHopTwoStartArgs {
	star_one: String,
	star_two: String,
	deposit: u64,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct StarHopThreeStartArgs {
	star_one: String,
	star_two: String,
	star_three: String,
	deposit: u64,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct StarHopEndArgs {
	deposit: u64,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct WithdrawArgs {
	withdraw_lamports: u64,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct PlanetArgs {
	name: String,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct BangArgs {
	lamports: u64,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct UpdateFeesArgs {
	deposit_fee: u64,
	planet_hop_fee: u64,
	star_two_fee: u64,
	star_three_fee: u64,
	withdraw_fee: u64,
}

fn encode<T: BorshSerialize>(name: &str, args: &T) -> Vec<u8> {
	let mut data = method_discriminator(name).to_vec();
	// Borsh serialization of these arg structs cannot fail.
	data.extend(borsh::to_vec(args).unwrap_or_default());
	data
}

/// Builder for every instruction the custody program accepts.
#[derive(Debug, Clone)]
pub struct ProgramCodec {
	program_id: Pubkey,
}

impl ProgramCodec {
	pub fn new(program_id: Pubkey) -> Self {
		Self { program_id }
	}

	pub fn program_id(&self) -> &Pubkey {
		&self.program_id
	}

	/// Direct lamport move from one planet to another.
	pub fn planet_hop(
		&self,
		lamports: u64,
		from_planet: &Pubkey,
		to_planet: &Pubkey,
		manager: &Pubkey,
	) -> Instruction {
		Instruction::new_with_bytes(
			self.program_id,
			&encode("planet_hop", &PlanetHopArgs { lamports }),
			vec![
				AccountMeta::new(*from_planet, false),
				AccountMeta::new(*to_planet, false),
				AccountMeta::new(*manager, true),
			],
		)
	}

	/// First leg of a two-star hop: source planet onto two fresh stars.
	/// Creates the star accounts, so the system program rides along.
	#[allow(clippy::too_many_arguments)]
	pub fn star_hop_two_start(
		&self,
		star_one_id: &str,
		star_two_id: &str,
		deposit: u64,
		from_planet: &Pubkey,
		star_one: &Pubkey,
		star_two: &Pubkey,
		manager: &Pubkey,
	) -> Instruction {
		Instruction::new_with_bytes(
			self.program_id,
			&encode(
				"star_hop_two_start",
				&StarHopTwoStartArgs {
					star_one: star_one_id.to_string(),
					star_two: star_two_id.to_string(),
					deposit,
				},
			),
			vec![
				AccountMeta::new(*from_planet, false),
				AccountMeta::new(*star_one, false),
				AccountMeta::new(*star_two, false),
				AccountMeta::new(*manager, true),
				AccountMeta::new_readonly(system_program::id(), false),
			],
		)
	}

	/// Second leg of a two-star hop: both stars onto the destination planet.
	pub fn star_hop_two_end(
		&self,
		deposit: u64,
		to_planet: &Pubkey,
		star_one: &Pubkey,
		star_two: &Pubkey,
		manager: &Pubkey,
	) -> Instruction {
		Instruction::new_with_bytes(
			self.program_id,
			&encode("star_hop_two_end", &StarHopEndArgs { deposit }),
			vec![
				AccountMeta::new(*to_planet, false),
				AccountMeta::new(*star_one, false),
				AccountMeta::new(*star_two, false),
				AccountMeta::new(*manager, true),
			],
		)
	}

	/// First leg of a three-star hop.
	#[allow(clippy::too_many_arguments)]
	pub fn star_hop_three_start(
		&self,
		star_one_id: &str,
		star_two_id: &str,
		star_three_id: &str,
		deposit: u64,
		from_planet: &Pubkey,
		star_one: &Pubkey,
		star_two: &Pubkey,
		star_three: &Pubkey,
		manager: &Pubkey,
	) -> Instruction {
		Instruction::new_with_bytes(
			self.program_id,
			&encode(
				"star_hop_three_start",
				&StarHopThreeStartArgs {
					star_one: star_one_id.to_string(),
					star_two: star_two_id.to_string(),
					star_three: star_three_id.to_string(),
					deposit,
				},
			),
			vec![
				AccountMeta::new(*from_planet, false),
				AccountMeta::new(*star_one, false),
				AccountMeta::new(*star_two, false),
				AccountMeta::new(*star_three, false),
				AccountMeta::new(*manager, true),
				AccountMeta::new_readonly(system_program::id(), false),
			],
		)
	}

	/// Second leg of a three-star hop.
	#[allow(clippy::too_many_arguments)]
	pub fn star_hop_three_end(
		&self,
		deposit: u64,
		to_planet: &Pubkey,
		star_one: &Pubkey,
		star_two: &Pubkey,
		star_three: &Pubkey,
		manager: &Pubkey,
	) -> Instruction {
		Instruction::new_with_bytes(
			self.program_id,
			&encode("star_hop_three_end", &StarHopEndArgs { deposit }),
			vec![
				AccountMeta::new(*to_planet, false),
				AccountMeta::new(*star_one, false),
				AccountMeta::new(*star_two, false),
				AccountMeta::new(*star_three, false),
				AccountMeta::new(*manager, true),
			],
		)
	}

	/// Full-balance move out of custody to an external wallet.
	pub fn withdraw(
		&self,
		withdraw_lamports: u64,
		from_planet: &Pubkey,
		destination: &Pubkey,
		manager: &Pubkey,
	) -> Instruction {
		Instruction::new_with_bytes(
			self.program_id,
			&encode("withdraw", &WithdrawArgs { withdraw_lamports }),
			vec![
				AccountMeta::new(*from_planet, false),
				AccountMeta::new(*destination, false),
				AccountMeta::new(*manager, true),
			],
		)
	}

	/// Registers a new planet in the universe.
	pub fn create_planet(
		&self,
		name: &str,
		universe: &Pubkey,
		planet: &Pubkey,
		manager: &Pubkey,
	) -> Instruction {
		Instruction::new_with_bytes(
			self.program_id,
			&encode("create_planet", &PlanetArgs { name: name.to_string() }),
			vec![
				AccountMeta::new(*universe, false),
				AccountMeta::new(*planet, false),
				AccountMeta::new(*manager, true),
				AccountMeta::new_readonly(system_program::id(), false),
			],
		)
	}

	/// Removes a planet from the universe.
	pub fn delete_planet(
		&self,
		name: &str,
		universe: &Pubkey,
		planet: &Pubkey,
		manager: &Pubkey,
	) -> Instruction {
		Instruction::new_with_bytes(
			self.program_id,
			&encode("delete_planet", &PlanetArgs { name: name.to_string() }),
			vec![
				AccountMeta::new(*universe, false),
				AccountMeta::new(*planet, false),
				AccountMeta::new(*manager, true),
			],
		)
	}

	/// Deposit trigger, signed by the depositor. The treasury account is
	/// present only when the universe charges a deposit fee.
	pub fn bang(
		&self,
		lamports: u64,
		universe: &Pubkey,
		planet: &Pubkey,
		depositor: &Pubkey,
		treasury: Option<&Pubkey>,
	) -> Instruction {
		let mut accounts = vec![
			AccountMeta::new(*universe, false),
			AccountMeta::new(*planet, false),
			AccountMeta::new(*depositor, true),
		];
		if let Some(treasury) = treasury {
			accounts.push(AccountMeta::new(*treasury, false));
		}
		accounts.push(AccountMeta::new_readonly(system_program::id(), false));

		Instruction::new_with_bytes(self.program_id, &encode("bang", &BangArgs { lamports }), accounts)
	}

	/// Rewrites the universe fee schedule.
	pub fn update_fees(
		&self,
		deposit_fee: u64,
		planet_hop_fee: u64,
		star_two_fee: u64,
		star_three_fee: u64,
		withdraw_fee: u64,
		universe: &Pubkey,
		manager: &Pubkey,
	) -> Instruction {
		Instruction::new_with_bytes(
			self.program_id,
			&encode(
				"update_fees",
				&UpdateFeesArgs {
					deposit_fee,
					planet_hop_fee,
					star_two_fee,
					star_three_fee,
					withdraw_fee,
				},
			),
			vec![
				AccountMeta::new(*universe, false),
				AccountMeta::new(*manager, true),
			],
		)
	}
}
