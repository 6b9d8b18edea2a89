//! Job status polling.
//!
//! Hop jobs are completed asynchronously by the worker; external consumers
//! poll here until the job flips to completed, at which point the job
//! record is deleted and the final transaction signature(s) handed back.
//! For withdraws the deposit record is already gone by the time the poll
//! sees completion, so the response carries no signature.

use crate::truncate_key;
use orbit_ledger::{LedgerError, LedgerService, Table};
use orbit_types::{DepositRecord, JobRecord};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Poll outcome for a wallet's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
	/// The worker has not committed the job yet.
	Pending,
	/// The job completed; its record has been deleted. Carries the final
	/// activity signature(s) when the deposit record still exists.
	Done { signature: Option<String> },
}

/// Errors that can occur during status polling.
#[derive(Debug, Error)]
pub enum StatusError {
	#[error("User wallet address not valid")]
	InvalidWallet,
	#[error("Job not found for wallet address")]
	NotFound,
	#[error("Ledger error: {0}")]
	Ledger(#[from] LedgerError),
}

/// Polls and closes out completed jobs.
pub struct StatusHandler {
	ledger: Arc<LedgerService>,
}

impl StatusHandler {
	pub fn new(ledger: Arc<LedgerService>) -> Self {
		Self { ledger }
	}

	/// Reports the wallet's job state, deleting the job record once it has
	/// completed.
	pub async fn poll(&self, wallet: &str) -> Result<JobStatus, StatusError> {
		let wallet_key = Pubkey::from_str(wallet).map_err(|_| StatusError::InvalidWallet)?;
		if !wallet_key.is_on_curve() {
			return Err(StatusError::InvalidWallet);
		}

		let job: JobRecord = self
			.ledger
			.try_retrieve(Table::Jobs, wallet)
			.await?
			.ok_or(StatusError::NotFound)?;

		if !job.completed {
			tracing::info!(wallet = %truncate_key(wallet), "Job still pending");
			return Ok(JobStatus::Pending);
		}

		self.ledger.remove(Table::Jobs, wallet).await?;
		tracing::info!(wallet = %truncate_key(wallet), kind = %job.kind, "Completed job closed and deleted");

		let deposit: Option<DepositRecord> =
			self.ledger.try_retrieve(Table::Deposits, wallet).await?;
		let signature = deposit
			.as_ref()
			.and_then(|record| record.last_activity())
			.map(|entry| entry.joined_signatures());

		Ok(JobStatus::Done { signature })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use orbit_ledger::implementations::memory::MemoryLedger;
	use orbit_types::{ActionCode, ActivityEntry, JobKind};
	use solana_sdk::signature::Keypair;
	use solana_sdk::signer::Signer;

	fn handler() -> (StatusHandler, Arc<LedgerService>, String) {
		let ledger = Arc::new(LedgerService::new(Box::new(MemoryLedger::new())));
		(
			StatusHandler::new(ledger.clone()),
			ledger,
			Keypair::new().pubkey().to_string(),
		)
	}

	fn deposit_with_hop(wallet: &str) -> DepositRecord {
		DepositRecord {
			wallet: wallet.to_string(),
			deposit: 1_000_000,
			location: "BETELGEUSE".into(),
			hops: 1,
			planet_hop_fee: 0,
			star_two_fee: 0,
			star_three_fee: 0,
			withdraw_fee: 0,
			created: 1,
			last_updated: 2,
			activity: vec![
				ActivityEntry {
					action: ActionCode::Deposit,
					to: "ANDORA".into(),
					time: 1,
					signatures: vec!["sig-d".into()],
				},
				ActivityEntry {
					action: ActionCode::HopStarTwo,
					to: "BETELGEUSE".into(),
					time: 2,
					signatures: vec!["sig-1".into(), "sig-2".into()],
				},
			],
		}
	}

	#[tokio::test]
	async fn uncompleted_job_reports_pending_and_survives() {
		let (handler, ledger, wallet) = handler();
		let job = JobRecord::new(wallet.clone(), JobKind::StarTwo, "BETELGEUSE".into(), 1);
		ledger.insert(Table::Jobs, &wallet, &job).await.unwrap();

		assert_eq!(handler.poll(&wallet).await.unwrap(), JobStatus::Pending);
		assert!(ledger.exists(Table::Jobs, &wallet).await.unwrap());
	}

	#[tokio::test]
	async fn completed_hop_closes_the_job_and_returns_signatures() {
		let (handler, ledger, wallet) = handler();
		let mut job = JobRecord::new(wallet.clone(), JobKind::StarTwo, "BETELGEUSE".into(), 1);
		job.completed = true;
		ledger.insert(Table::Jobs, &wallet, &job).await.unwrap();
		ledger
			.insert(Table::Deposits, &wallet, &deposit_with_hop(&wallet))
			.await
			.unwrap();

		let status = handler.poll(&wallet).await.unwrap();
		assert_eq!(
			status,
			JobStatus::Done {
				signature: Some("sig-1:sig-2".to_string())
			}
		);
		assert!(!ledger.exists(Table::Jobs, &wallet).await.unwrap());
		// The deposit record is the hop flow's to keep.
		assert!(ledger.exists(Table::Deposits, &wallet).await.unwrap());
	}

	#[tokio::test]
	async fn completed_withdraw_reports_done_without_a_signature() {
		let (handler, ledger, wallet) = handler();
		let mut job = JobRecord::new(
			wallet.clone(),
			JobKind::Withdraw,
			Keypair::new().pubkey().to_string(),
			1,
		);
		job.completed = true;
		ledger.insert(Table::Jobs, &wallet, &job).await.unwrap();

		let status = handler.poll(&wallet).await.unwrap();
		assert_eq!(status, JobStatus::Done { signature: None });
		assert!(!ledger.exists(Table::Jobs, &wallet).await.unwrap());
	}

	#[tokio::test]
	async fn missing_job_and_malformed_wallet_are_distinct_errors() {
		let (handler, _, wallet) = handler();
		assert!(matches!(
			handler.poll(&wallet).await,
			Err(StatusError::NotFound)
		));
		assert!(matches!(
			handler.poll("garbage").await,
			Err(StatusError::InvalidWallet)
		));
	}
}
