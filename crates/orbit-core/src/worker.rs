//! Per-job worker execution.
//!
//! One invocation per admitted job, no shared state between invocations
//! beyond the ledger. The worker walks the job's pipeline in order: for
//! each step it binds a fresh blockhash, signs with the manager key, fires
//! the submission loop, and blocks on the confirmation listener before
//! touching the next step; the end leg of a two-step hop is never
//! submitted until the start leg's signature has confirmed. Only after
//! every step confirms does the ledger commit run.

use crate::truncate_key;
use orbit_account::{AccountError, AccountService};
use orbit_chain::{
	ChainError, ChainInterface, ConfirmationInterface, SubmissionEngine, SubmissionOutcome,
};
use orbit_ledger::{LedgerError, LedgerService, Table};
use orbit_notify::NotificationService;
use orbit_order::{PipelineBuilder, PipelineError};
use orbit_types::{unix_now, ActivityEntry, DepositRecord, JobKind, JobRecord, PipelineStep};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while executing a job.
#[derive(Debug, Error)]
pub enum WorkerError {
	/// The job's wallet field is not a real wallet address.
	#[error("Wallet key not valid")]
	InvalidWallet,
	/// No deposit record exists for the wallet.
	#[error("Wallet deposit not found")]
	DepositNotFound,
	/// The blockhash validity window closed before the transaction landed.
	/// Nothing was committed; the job stays recoverable.
	#[error("Blockhash expired before the transaction landed")]
	Expired,
	#[error(transparent)]
	Pipeline(#[from] PipelineError),
	#[error(transparent)]
	Chain(#[from] ChainError),
	#[error(transparent)]
	Account(#[from] AccountError),
	#[error("Ledger error: {0}")]
	Ledger(#[from] LedgerError),
}

/// Executes admitted jobs end to end.
pub struct JobWorker {
	ledger: Arc<LedgerService>,
	chain: Arc<dyn ChainInterface>,
	submission: SubmissionEngine,
	confirmation: Arc<dyn ConfirmationInterface>,
	account: Arc<AccountService>,
	builder: PipelineBuilder,
	notifier: Arc<NotificationService>,
}

impl JobWorker {
	pub fn new(
		ledger: Arc<LedgerService>,
		chain: Arc<dyn ChainInterface>,
		submission: SubmissionEngine,
		confirmation: Arc<dyn ConfirmationInterface>,
		account: Arc<AccountService>,
		builder: PipelineBuilder,
		notifier: Arc<NotificationService>,
	) -> Self {
		Self {
			ledger,
			chain,
			submission,
			confirmation,
			account,
			builder,
			notifier,
		}
	}

	/// Runs one job to completion: pipeline, submission, confirmation,
	/// ledger commit, notification.
	///
	/// Any failure before the commit leaves the job record uncompleted;
	/// the next admission cycle sweeps it as an orphan.
	pub async fn process(&self, job: JobRecord) -> Result<(), WorkerError> {
		tracing::info!(
			wallet = %truncate_key(&job.wallet),
			kind = %job.kind,
			destination = %job.destination,
			"Processing job"
		);

		let wallet_key = Pubkey::from_str(&job.wallet).map_err(|_| WorkerError::InvalidWallet)?;
		if !wallet_key.is_on_curve() {
			return Err(WorkerError::InvalidWallet);
		}

		let mut deposit: DepositRecord = self
			.ledger
			.try_retrieve(Table::Deposits, &job.wallet)
			.await?
			.ok_or(WorkerError::DepositNotFound)?;

		tracing::info!(
			location = %deposit.location,
			lamports = deposit.deposit,
			"Deposit record found"
		);

		let steps = self.builder.build(&job, &deposit.location, deposit.deposit)?;

		let mut signatures = Vec::with_capacity(steps.len());
		for step in &steps {
			let signature = self.execute_step(step).await?;
			signatures.push(signature.to_string());
		}

		self.commit(&job, &mut deposit, signatures).await?;

		self.notifier
			.publish(&format!(
				"{} task has been completed for {}",
				job.kind, job.wallet
			))
			.await;

		tracing::info!(wallet = %truncate_key(&job.wallet), "Job completed");
		Ok(())
	}

	/// Binds, signs, submits and confirms one pipeline step.
	async fn execute_step(&self, step: &PipelineStep) -> Result<Signature, WorkerError> {
		let (blockhash, last_valid_block_height) = self.chain.latest_blockhash().await?;

		let tx = self
			.account
			.sign_transaction(&step.instructions(), blockhash)
			.await?;
		let signature = *tx.signatures.first().ok_or_else(|| {
			AccountError::SigningFailed("signed transaction carries no signature".to_string())
		})?;

		tracing::info!(
			position = step.position.as_str(),
			signature = %truncate_key(&signature.to_string()),
			last_valid_block_height,
			"Submitting pipeline step"
		);

		match self
			.submission
			.submit_until_expiry(&tx, last_valid_block_height)
			.await?
		{
			SubmissionOutcome::Expired => Err(WorkerError::Expired),
			SubmissionOutcome::Sent => {
				self.confirmation.wait_for_signature(&signature).await?;
				tracing::info!(
					position = step.position.as_str(),
					"Pipeline step confirmed"
				);
				Ok(signature)
			},
		}
	}

	/// Commits the completed move: deposit record first, then the job flag,
	/// then (for withdraws) the deposit record's removal. A failure at any
	/// point aborts before the job is marked complete.
	async fn commit(
		&self,
		job: &JobRecord,
		deposit: &mut DepositRecord,
		signatures: Vec<String>,
	) -> Result<(), WorkerError> {
		let now = unix_now();
		deposit.apply_move(
			ActivityEntry {
				action: job.kind.into(),
				to: job.destination.clone(),
				time: now,
				signatures,
			},
			now,
		);
		self.ledger
			.replace(Table::Deposits, &job.wallet, deposit)
			.await?;

		let mut completed = job.clone();
		completed.completed = true;
		self.ledger
			.replace(Table::Jobs, &job.wallet, &completed)
			.await?;

		if job.kind == JobKind::Withdraw {
			// Funds have left custody; the deposit record goes with them.
			self.ledger.remove(Table::Deposits, &job.wallet).await?;
			tracing::info!(wallet = %truncate_key(&job.wallet), "Deposit record deleted after withdraw");
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use orbit_chain::TransactionEnvelope;
	use orbit_codec::ProgramCodec;
	use orbit_ledger::implementations::memory::MemoryLedger;
	use orbit_notify::NotificationInterface;
	use orbit_types::{ActionCode, ConfigSchema, SecretString};
	use solana_sdk::hash::Hash;
	use solana_sdk::signature::Keypair;
	use solana_sdk::signer::Signer;
	use solana_sdk::transaction::Transaction;
	use std::sync::Mutex;
	use std::time::Duration;

	/// Shared call log so the chain and the listener can prove ordering.
	type CallLog = Arc<Mutex<Vec<String>>>;

	struct RecordingChain {
		log: CallLog,
		/// (blockhash ceiling, current height) script.
		last_valid_block_height: u64,
		current_height: u64,
	}

	#[async_trait]
	impl ChainInterface for RecordingChain {
		async fn transaction_envelope(
			&self,
			_signature: &Signature,
		) -> Result<TransactionEnvelope, ChainError> {
			unimplemented!("not used by worker tests")
		}

		async fn account_data(&self, _address: &Pubkey) -> Result<Vec<u8>, ChainError> {
			unimplemented!("not used by worker tests")
		}

		async fn latest_blockhash(&self) -> Result<(Hash, u64), ChainError> {
			Ok((Hash::new_unique(), self.last_valid_block_height))
		}

		async fn block_height(&self) -> Result<u64, ChainError> {
			Ok(self.current_height)
		}

		async fn submit_transaction(&self, tx: &Transaction) -> Result<Signature, ChainError> {
			let signature = tx.signatures[0];
			self.log
				.lock()
				.unwrap()
				.push(format!("submit:{}", signature));
			Ok(signature)
		}
	}

	struct RecordingListener {
		log: CallLog,
	}

	#[async_trait]
	impl ConfirmationInterface for RecordingListener {
		async fn wait_for_signature(&self, signature: &Signature) -> Result<(), ChainError> {
			self.log
				.lock()
				.unwrap()
				.push(format!("confirm:{}", signature));
			Ok(())
		}
	}

	struct RecordingNotifier {
		messages: Arc<Mutex<Vec<String>>>,
	}

	#[async_trait]
	impl NotificationInterface for RecordingNotifier {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			unimplemented!("not used by worker tests")
		}

		async fn publish(&self, _topic: &str, message: &str) {
			self.messages.lock().unwrap().push(message.to_string());
		}
	}

	struct Harness {
		worker: JobWorker,
		ledger: Arc<LedgerService>,
		log: CallLog,
		messages: Arc<Mutex<Vec<String>>>,
		wallet: String,
	}

	fn harness(current_height: u64, last_valid_block_height: u64) -> Harness {
		let log: CallLog = Arc::new(Mutex::new(Vec::new()));
		let messages = Arc::new(Mutex::new(Vec::new()));
		let ledger = Arc::new(LedgerService::new(Box::new(MemoryLedger::new())));
		let chain = Arc::new(RecordingChain {
			log: log.clone(),
			last_valid_block_height,
			current_height,
		});

		let manager = Keypair::new();
		let account = Arc::new(
			AccountService::from_secret(&SecretString::new(manager.to_base58_string())).unwrap(),
		);
		let codec = Arc::new(ProgramCodec::new(Pubkey::new_unique()));
		let builder = PipelineBuilder::new(codec, manager.pubkey());

		let worker = JobWorker::new(
			ledger.clone(),
			chain.clone(),
			SubmissionEngine::new(chain, 1, Duration::ZERO),
			Arc::new(RecordingListener { log: log.clone() }),
			account,
			builder,
			Arc::new(NotificationService::new(
				Box::new(RecordingNotifier {
					messages: messages.clone(),
				}),
				"test",
			)),
		);

		Harness {
			worker,
			ledger,
			log,
			messages,
			wallet: Keypair::new().pubkey().to_string(),
		}
	}

	fn deposit(wallet: &str, location: &str) -> DepositRecord {
		DepositRecord {
			wallet: wallet.to_string(),
			deposit: 1_000_000,
			location: location.to_string(),
			hops: 0,
			planet_hop_fee: 0,
			star_two_fee: 0,
			star_three_fee: 0,
			withdraw_fee: 0,
			created: 1_700_000_000,
			last_updated: 1_700_000_000,
			activity: vec![ActivityEntry {
				action: ActionCode::Deposit,
				to: location.to_string(),
				time: 1_700_000_000,
				signatures: vec!["sig-deposit".into()],
			}],
		}
	}

	async fn seed(h: &Harness, kind: JobKind, destination: &str) -> JobRecord {
		h.ledger
			.insert(Table::Deposits, &h.wallet, &deposit(&h.wallet, "ANDORA"))
			.await
			.unwrap();
		let job = JobRecord::new(h.wallet.clone(), kind, destination.to_string(), 1_700_000_001);
		h.ledger
			.insert(Table::Jobs, &h.wallet, &job)
			.await
			.unwrap();
		job
	}

	#[tokio::test]
	async fn end_step_waits_for_start_confirmation() {
		let h = harness(1, u64::MAX);
		let job = seed(&h, JobKind::StarTwo, "BETELGEUSE").await;
		h.worker.process(job).await.unwrap();

		let log = h.log.lock().unwrap().clone();
		// One submit attempt and one confirmation per step, in strict
		// submit/confirm/submit/confirm order.
		assert_eq!(log.len(), 4);
		assert!(log[0].starts_with("submit:"));
		assert!(log[1].starts_with("confirm:"));
		assert!(log[2].starts_with("submit:"));
		assert!(log[3].starts_with("confirm:"));
		// The confirmed start signature matches the submitted one, and the
		// end step carries a different signature.
		assert_eq!(log[0][7..], log[1][8..]);
		assert_ne!(log[0][7..], log[2][7..]);
	}

	#[tokio::test]
	async fn completed_hop_commits_exactly_one_move() {
		let h = harness(1, u64::MAX);
		let job = seed(&h, JobKind::StarThree, "BETELGEUSE").await;
		h.worker.process(job).await.unwrap();

		let record: DepositRecord = h
			.ledger
			.retrieve(Table::Deposits, &h.wallet)
			.await
			.unwrap();
		assert_eq!(record.location, "BETELGEUSE");
		assert_eq!(record.hops, 1);
		assert_eq!(record.activity.len(), 2);
		let last = record.last_activity().unwrap();
		assert_eq!(last.action, ActionCode::HopStarThree);
		assert_eq!(last.signatures.len(), 2);

		let stored_job: JobRecord = h.ledger.retrieve(Table::Jobs, &h.wallet).await.unwrap();
		assert!(stored_job.completed);

		let messages = h.messages.lock().unwrap().clone();
		assert_eq!(
			messages,
			vec![format!("star_three task has been completed for {}", h.wallet)]
		);
	}

	#[tokio::test]
	async fn withdraw_completion_deletes_the_deposit() {
		let h = harness(1, u64::MAX);
		let destination = Keypair::new().pubkey().to_string();
		let job = seed(&h, JobKind::Withdraw, &destination).await;
		h.worker.process(job).await.unwrap();

		assert!(!h.ledger.exists(Table::Deposits, &h.wallet).await.unwrap());
		let stored_job: JobRecord = h.ledger.retrieve(Table::Jobs, &h.wallet).await.unwrap();
		assert!(stored_job.completed);
	}

	#[tokio::test]
	async fn expiry_aborts_without_ledger_mutation() {
		// Height already past the ceiling: nothing lands, nothing commits.
		let h = harness(500, 100);
		let job = seed(&h, JobKind::HopPlanet, "BETELGEUSE").await;
		let err = h.worker.process(job).await.unwrap_err();
		assert!(matches!(err, WorkerError::Expired));

		let record: DepositRecord = h
			.ledger
			.retrieve(Table::Deposits, &h.wallet)
			.await
			.unwrap();
		assert_eq!(record.location, "ANDORA");
		assert_eq!(record.hops, 0);
		let stored_job: JobRecord = h.ledger.retrieve(Table::Jobs, &h.wallet).await.unwrap();
		assert!(!stored_job.completed);
		assert!(h.messages.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn missing_deposit_fails_before_any_submission() {
		let h = harness(1, u64::MAX);
		let job = JobRecord::new(
			Keypair::new().pubkey().to_string(),
			JobKind::HopPlanet,
			"BETELGEUSE".to_string(),
			1_700_000_001,
		);
		let err = h.worker.process(job).await.unwrap_err();
		assert!(matches!(err, WorkerError::DepositNotFound));
		assert!(h.log.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn malformed_wallet_is_rejected_up_front() {
		let h = harness(1, u64::MAX);
		let job = JobRecord::new(
			"not-a-wallet".to_string(),
			JobKind::HopPlanet,
			"BETELGEUSE".to_string(),
			1_700_000_001,
		);
		let err = h.worker.process(job).await.unwrap_err();
		assert!(matches!(err, WorkerError::InvalidWallet));
	}
}
