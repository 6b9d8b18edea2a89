//! Transaction pipeline building.
//!
//! Turns an admitted job into the ordered instruction sequence it needs on
//! chain: one step for direct hops and withdraws, a start/end pair for
//! star-routed hops. Star identifiers are generated fresh per build and
//! never persisted; they live exactly as long as the two transactions that
//! reference them. Uniqueness across concurrent jobs is probabilistic only
//! (36^8 token space); there is no in-flight collision check.

use orbit_codec::{planet_address, star_address, ProgramCodec};
use orbit_types::{JobKind, JobRecord, PipelineStep, StepPosition};
use rand::Rng;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Compute-unit ceilings per step. The start legs pay for the on-chain star
/// derivations, so they run far hotter than the end legs.
const CU_PLANET_HOP: u32 = 6_000;
const CU_STAR_TWO_START: u32 = 33_000;
const CU_STAR_TWO_END: u32 = 6_300;
const CU_STAR_THREE_START: u32 = 60_000;
const CU_STAR_THREE_END: u32 = 9_000;
const CU_WITHDRAW: u32 = 3_400;

/// Priority fees in micro-lamports per compute unit.
const PRIORITY_FEE_HOP: u64 = 25_000;
const PRIORITY_FEE_WITHDRAW: u64 = 20_000;

/// Alphabet star identifiers are sampled from.
const STAR_ID_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const STAR_ID_LEN: usize = 8;

/// Errors that can occur while building a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
	/// A withdraw destination that is not a real wallet address.
	#[error("Destination wallet key not valid")]
	InvalidDestination,
}

/// Builds instruction pipelines for admitted jobs.
pub struct PipelineBuilder {
	codec: Arc<ProgramCodec>,
	manager: Pubkey,
}

impl PipelineBuilder {
	pub fn new(codec: Arc<ProgramCodec>, manager: Pubkey) -> Self {
		Self { codec, manager }
	}

	/// Produces the ordered steps for `job`, moving `lamports` out of
	/// `from_planet`. Steps must be submitted in order; for two-step
	/// pipelines the caller confirms the start step before touching the
	/// end step.
	pub fn build(
		&self,
		job: &JobRecord,
		from_planet: &str,
		lamports: u64,
	) -> Result<Vec<PipelineStep>, PipelineError> {
		let program_id = self.codec.program_id();
		let from = planet_address(from_planet, program_id);

		match job.kind {
			JobKind::HopPlanet => {
				let to = planet_address(&job.destination, program_id);
				Ok(vec![PipelineStep {
					position: StepPosition::Single,
					instruction: self.codec.planet_hop(lamports, &from, &to, &self.manager),
					compute_unit_limit: CU_PLANET_HOP,
					priority_fee: PRIORITY_FEE_HOP,
				}])
			},
			JobKind::StarTwo => {
				let to = planet_address(&job.destination, program_id);
				let (id_one, id_two) = (generate_star_id(), generate_star_id());
				let star_one = star_address(&id_one, program_id);
				let star_two = star_address(&id_two, program_id);
				tracing::debug!(%star_one, %star_two, "Derived star addresses");

				Ok(vec![
					PipelineStep {
						position: StepPosition::Start,
						instruction: self.codec.star_hop_two_start(
							&id_one,
							&id_two,
							lamports,
							&from,
							&star_one,
							&star_two,
							&self.manager,
						),
						compute_unit_limit: CU_STAR_TWO_START,
						priority_fee: PRIORITY_FEE_HOP,
					},
					PipelineStep {
						position: StepPosition::End,
						instruction: self.codec.star_hop_two_end(
							lamports,
							&to,
							&star_one,
							&star_two,
							&self.manager,
						),
						compute_unit_limit: CU_STAR_TWO_END,
						priority_fee: PRIORITY_FEE_HOP,
					},
				])
			},
			JobKind::StarThree => {
				let to = planet_address(&job.destination, program_id);
				let (id_one, id_two, id_three) =
					(generate_star_id(), generate_star_id(), generate_star_id());
				let star_one = star_address(&id_one, program_id);
				let star_two = star_address(&id_two, program_id);
				let star_three = star_address(&id_three, program_id);
				tracing::debug!(%star_one, %star_two, %star_three, "Derived star addresses");

				Ok(vec![
					PipelineStep {
						position: StepPosition::Start,
						instruction: self.codec.star_hop_three_start(
							&id_one,
							&id_two,
							&id_three,
							lamports,
							&from,
							&star_one,
							&star_two,
							&star_three,
							&self.manager,
						),
						compute_unit_limit: CU_STAR_THREE_START,
						priority_fee: PRIORITY_FEE_HOP,
					},
					PipelineStep {
						position: StepPosition::End,
						instruction: self.codec.star_hop_three_end(
							lamports,
							&to,
							&star_one,
							&star_two,
							&star_three,
							&self.manager,
						),
						compute_unit_limit: CU_STAR_THREE_END,
						priority_fee: PRIORITY_FEE_HOP,
					},
				])
			},
			JobKind::Withdraw => {
				let destination = Pubkey::from_str(&job.destination)
					.map_err(|_| PipelineError::InvalidDestination)?;
				if !destination.is_on_curve() {
					return Err(PipelineError::InvalidDestination);
				}

				Ok(vec![PipelineStep {
					position: StepPosition::Single,
					instruction: self.codec.withdraw(
						lamports,
						&from,
						&destination,
						&self.manager,
					),
					compute_unit_limit: CU_WITHDRAW,
					priority_fee: PRIORITY_FEE_WITHDRAW,
				}])
			},
		}
	}
}

/// Fresh 8-character uppercase-alphanumeric star identifier.
fn generate_star_id() -> String {
	let mut rng = rand::thread_rng();
	(0..STAR_ID_LEN)
		.map(|_| STAR_ID_CHARS[rng.gen_range(0..STAR_ID_CHARS.len())] as char)
		.collect()
}
