//! Chain access module for the orbit custody engine.
//!
//! Three pieces live here: the gateway (reads and writes against two
//! redundant RPC endpoints with explicit failover), the submission engine
//! (blockhash-expiry-bounded retry loop), and the confirmation listener
//! (websocket signature subscription). Everything above this crate talks to
//! the chain through the [`ChainInterface`] and [`ConfirmationInterface`]
//! traits.

use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::message::MessageHeader;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use thiserror::Error;

pub mod confirmation;
pub mod gateway;
pub mod submission;

pub use confirmation::{ConfirmationInterface, PubsubConfirmationListener};
pub use gateway::RpcChainGateway;
pub use submission::{SubmissionEngine, SubmissionOutcome};

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
	/// Both the primary and the backup endpoint failed the same call. This
	/// is the escalation point for transient infrastructure failures: one
	/// endpoint failing is handled inside the gateway, two failing aborts
	/// the job.
	#[error("Both RPC endpoints failed during {operation}: {detail}")]
	BothEndpointsFailed {
		operation: &'static str,
		detail: String,
	},
	/// The RPC response could not be interpreted.
	#[error("Malformed RPC response: {0}")]
	MalformedResponse(String),
	/// The signature subscription channel failed.
	#[error("Subscription error: {0}")]
	Subscription(String),
	/// The chain reported the transaction itself as failed.
	#[error("Transaction failed on chain: {0}")]
	TransactionFailed(String),
}

/// A confirmed transaction reduced to what deposit validation needs:
/// its account list, signer-shape header, network fee and balance deltas.
/// Built at the gateway boundary so nothing downstream touches raw RPC
/// response types.
#[derive(Debug, Clone)]
pub struct TransactionEnvelope {
	/// Every account the transaction referenced, in message order.
	pub account_keys: Vec<Pubkey>,
	/// Signer/readonly shape of the message.
	pub header: MessageHeader,
	/// Network fee paid by the fee payer.
	pub fee: u64,
	/// Lamport balances before execution, aligned with `account_keys`.
	pub pre_balances: Vec<u64>,
	/// Lamport balances after execution, aligned with `account_keys`.
	pub post_balances: Vec<u64>,
}

impl TransactionEnvelope {
	/// Position of an account in the message, if present.
	pub fn index_of(&self, key: &Pubkey) -> Option<usize> {
		self.account_keys.iter().position(|k| k == key)
	}

	pub fn contains(&self, key: &Pubkey) -> bool {
		self.index_of(key).is_some()
	}
}

/// Trait defining read and write access to the chain.
///
/// Implementations are responsible for endpoint failover; callers see a
/// single logical endpoint that only fails when every configured endpoint
/// has failed.
#[async_trait]
pub trait ChainInterface: Send + Sync {
	/// Fetches a confirmed transaction and reduces it to an envelope.
	async fn transaction_envelope(
		&self,
		signature: &Signature,
	) -> Result<TransactionEnvelope, ChainError>;

	/// Fetches an account's raw data bytes.
	async fn account_data(&self, address: &Pubkey) -> Result<Vec<u8>, ChainError>;

	/// Latest blockhash plus the last block height it is valid for.
	async fn latest_blockhash(&self) -> Result<(Hash, u64), ChainError>;

	/// Current block height.
	async fn block_height(&self) -> Result<u64, ChainError>;

	/// Submits a signed transaction without preflight simulation.
	async fn submit_transaction(&self, tx: &Transaction) -> Result<Signature, ChainError>;
}
