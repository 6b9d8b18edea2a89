//! Transaction pipeline steps.
//!
//! A pipeline is the ordered list of one or two transactions a job needs on
//! chain. Each step carries exactly one domain instruction plus its compute
//! budget and priority fee; the worker turns a step into a signed
//! transaction and never reorders steps. Pipelines are ephemeral: built per
//! job execution and dropped once the job commits.

use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::instruction::Instruction;

/// Where a step sits in its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPosition {
	/// The only transaction of a single-step job.
	Single,
	/// First transaction of a two-step hop; moves funds onto the stars.
	Start,
	/// Second transaction of a two-step hop; collapses the stars onto the
	/// destination planet. Never submitted before the start step confirms.
	End,
}

impl StepPosition {
	pub fn as_str(&self) -> &'static str {
		match self {
			StepPosition::Single => "single",
			StepPosition::Start => "start",
			StepPosition::End => "end",
		}
	}
}

/// One transaction's worth of a job pipeline.
#[derive(Debug, Clone)]
pub struct PipelineStep {
	/// Position within the pipeline.
	pub position: StepPosition,
	/// The domain instruction this step submits.
	pub instruction: Instruction,
	/// Compute-unit ceiling requested for the transaction.
	pub compute_unit_limit: u32,
	/// Priority fee in micro-lamports per compute unit.
	pub priority_fee: u64,
}

impl PipelineStep {
	/// The full instruction list for this step's transaction: compute
	/// budget, priority fee, then the domain instruction.
	pub fn instructions(&self) -> Vec<Instruction> {
		vec![
			ComputeBudgetInstruction::set_compute_unit_limit(self.compute_unit_limit),
			ComputeBudgetInstruction::set_compute_unit_price(self.priority_fee),
			self.instruction.clone(),
		]
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use solana_sdk::pubkey::Pubkey;

	#[test]
	fn step_emits_budget_fee_then_domain_instruction() {
		let program = Pubkey::new_unique();
		let step = PipelineStep {
			position: StepPosition::Start,
			instruction: Instruction::new_with_bytes(program, &[1, 2, 3], vec![]),
			compute_unit_limit: 33_000,
			priority_fee: 25_000,
		};

		let ixs = step.instructions();
		assert_eq!(ixs.len(), 3);
		assert_eq!(ixs[0].program_id, solana_sdk::compute_budget::id());
		assert_eq!(ixs[1].program_id, solana_sdk::compute_budget::id());
		assert_eq!(ixs[2].program_id, program);
	}
}
