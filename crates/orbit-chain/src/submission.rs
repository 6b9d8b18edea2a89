//! Blockhash-expiry-bounded transaction submission.
//!
//! The engine fires the same signed transaction repeatedly and lets the
//! ledger's transaction de-duplication collapse duplicates. It never checks
//! whether an individual attempt landed; the confirmation listener decides
//! that for the signature as a whole. What it does track is the blockhash
//! validity window: once the chain's height reaches the transaction's last
//! valid block height, retrying is pointless and the job is reported
//! expired.

use crate::{ChainError, ChainInterface};
use solana_sdk::transaction::Transaction;
use std::sync::Arc;
use std::time::Duration;

/// Default attempt bound for one transaction.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Default pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1_500);

/// Terminal submission states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
	/// The transaction was sent before expiry; proceed to confirmation.
	Sent,
	/// The blockhash validity window closed first; abort the job. No ledger
	/// state has been touched at this point, so a retry from scratch is
	/// safe.
	Expired,
}

/// Repeated-fire submitter bounded by attempts and blockhash expiry.
pub struct SubmissionEngine {
	chain: Arc<dyn ChainInterface>,
	max_attempts: u32,
	retry_delay: Duration,
}

impl SubmissionEngine {
	pub fn new(chain: Arc<dyn ChainInterface>, max_attempts: u32, retry_delay: Duration) -> Self {
		Self {
			chain,
			max_attempts,
			retry_delay,
		}
	}

	/// Submits `tx` until the chain height reaches
	/// `last_valid_block_height` or the attempt bound is hit.
	///
	/// The expiry predicate is evaluated before every attempt, so expiry
	/// stops the loop regardless of attempts remaining. Height reads and
	/// submissions failover inside the gateway; an error here means both
	/// endpoints are down and the job must abort.
	pub async fn submit_until_expiry(
		&self,
		tx: &Transaction,
		last_valid_block_height: u64,
	) -> Result<SubmissionOutcome, ChainError> {
		let mut height = self.chain.block_height().await?;

		for attempt in 1..=self.max_attempts {
			if height >= last_valid_block_height {
				tracing::warn!(
					height,
					last_valid_block_height,
					"Blockhash expired before the transaction could land"
				);
				return Ok(SubmissionOutcome::Expired);
			}

			self.chain.submit_transaction(tx).await?;
			tracing::debug!(attempt, height, "Submitted transaction");

			if attempt == self.max_attempts {
				break;
			}

			tokio::time::sleep(self.retry_delay).await;
			height = self.chain.block_height().await?;
		}

		Ok(SubmissionOutcome::Sent)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::TransactionEnvelope;
	use async_trait::async_trait;
	use solana_sdk::hash::Hash;
	use solana_sdk::pubkey::Pubkey;
	use solana_sdk::signature::Signature;
	use std::collections::VecDeque;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Mutex;

	/// Chain stub feeding a scripted height sequence and counting sends.
	struct ScriptedChain {
		heights: Mutex<VecDeque<u64>>,
		submissions: AtomicUsize,
		fail_heights: bool,
	}

	impl ScriptedChain {
		fn new(heights: Vec<u64>) -> Self {
			Self {
				heights: Mutex::new(heights.into()),
				submissions: AtomicUsize::new(0),
				fail_heights: false,
			}
		}

		fn submissions(&self) -> usize {
			self.submissions.load(Ordering::SeqCst)
		}
	}

	#[async_trait]
	impl ChainInterface for ScriptedChain {
		async fn transaction_envelope(
			&self,
			_signature: &Signature,
		) -> Result<TransactionEnvelope, ChainError> {
			unimplemented!("not used by submission tests")
		}

		async fn account_data(&self, _address: &Pubkey) -> Result<Vec<u8>, ChainError> {
			unimplemented!("not used by submission tests")
		}

		async fn latest_blockhash(&self) -> Result<(Hash, u64), ChainError> {
			unimplemented!("not used by submission tests")
		}

		async fn block_height(&self) -> Result<u64, ChainError> {
			if self.fail_heights {
				return Err(ChainError::BothEndpointsFailed {
					operation: "get_block_height",
					detail: "scripted outage".to_string(),
				});
			}
			let mut heights = self.heights.lock().unwrap();
			// Hold the last height once the script runs out.
			let next = heights.pop_front().unwrap_or(u64::MAX - 1);
			if heights.is_empty() {
				heights.push_back(next);
			}
			Ok(next)
		}

		async fn submit_transaction(&self, _tx: &Transaction) -> Result<Signature, ChainError> {
			self.submissions.fetch_add(1, Ordering::SeqCst);
			Ok(Signature::default())
		}
	}

	fn engine(chain: Arc<ScriptedChain>, attempts: u32) -> SubmissionEngine {
		SubmissionEngine::new(chain, attempts, Duration::ZERO)
	}

	#[tokio::test]
	async fn already_expired_height_sends_nothing() {
		let chain = Arc::new(ScriptedChain::new(vec![120]));
		let outcome = engine(chain.clone(), 6)
			.submit_until_expiry(&Transaction::default(), 100)
			.await
			.unwrap();
		assert_eq!(outcome, SubmissionOutcome::Expired);
		assert_eq!(chain.submissions(), 0);
	}

	#[tokio::test]
	async fn expiry_mid_loop_stops_with_attempts_remaining() {
		// One send at height 95, then the window closes.
		let chain = Arc::new(ScriptedChain::new(vec![95, 100]));
		let outcome = engine(chain.clone(), 6)
			.submit_until_expiry(&Transaction::default(), 100)
			.await
			.unwrap();
		assert_eq!(outcome, SubmissionOutcome::Expired);
		assert_eq!(chain.submissions(), 1);
	}

	#[tokio::test]
	async fn attempt_bound_holds_below_the_ceiling() {
		let chain = Arc::new(ScriptedChain::new(vec![50]));
		let outcome = engine(chain.clone(), 4)
			.submit_until_expiry(&Transaction::default(), 1_000_000)
			.await
			.unwrap();
		assert_eq!(outcome, SubmissionOutcome::Sent);
		assert_eq!(chain.submissions(), 4);
	}

	#[tokio::test]
	async fn height_outage_aborts_instead_of_guessing() {
		let chain = Arc::new(ScriptedChain {
			heights: Mutex::new(VecDeque::new()),
			submissions: AtomicUsize::new(0),
			fail_heights: true,
		});
		let result = engine(chain.clone(), 6)
			.submit_until_expiry(&Transaction::default(), 100)
			.await;
		assert!(matches!(
			result,
			Err(ChainError::BothEndpointsFailed { .. })
		));
		assert_eq!(chain.submissions(), 0);
	}
}
