//! Dual-endpoint RPC gateway.
//!
//! Every read and write tries the primary endpoint first and falls back to
//! the backup on any error; only when both fail does the call surface
//! [`ChainError::BothEndpointsFailed`]. Failover is a per-call decision:
//! the gateway keeps no health state and the next call starts at the
//! primary again.

use crate::{ChainError, ChainInterface, TransactionEnvelope};
use async_trait::async_trait;
use solana_client::client_error::ClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcSendTransactionConfig, RpcTransactionConfig};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use solana_transaction_status::{
	EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiMessage,
	UiTransactionEncoding,
};
use std::future::Future;
use std::str::FromStr;

/// Gateway over a primary and a backup RPC endpoint.
pub struct RpcChainGateway {
	primary: RpcClient,
	backup: RpcClient,
}

impl RpcChainGateway {
	/// Builds clients for both endpoints at `confirmed` commitment.
	pub fn new(primary_url: &str, backup_url: &str) -> Self {
		Self {
			primary: RpcClient::new_with_commitment(
				primary_url.to_string(),
				CommitmentConfig::confirmed(),
			),
			backup: RpcClient::new_with_commitment(
				backup_url.to_string(),
				CommitmentConfig::confirmed(),
			),
		}
	}

	/// Runs the primary attempt, and on failure the backup attempt. The
	/// failover point is logged so operators can see endpoint flapping.
	async fn failover<T>(
		operation: &'static str,
		primary: impl Future<Output = Result<T, ClientError>>,
		backup: impl Future<Output = Result<T, ClientError>>,
	) -> Result<T, ChainError> {
		match primary.await {
			Ok(value) => Ok(value),
			Err(primary_err) => {
				tracing::warn!(
					operation,
					error = %primary_err,
					"Primary RPC endpoint failed, trying backup"
				);
				match backup.await {
					Ok(value) => Ok(value),
					Err(backup_err) => Err(ChainError::BothEndpointsFailed {
						operation,
						detail: format!("primary: {}; backup: {}", primary_err, backup_err),
					}),
				}
			},
		}
	}

	fn transaction_config() -> RpcTransactionConfig {
		RpcTransactionConfig {
			encoding: Some(UiTransactionEncoding::Json),
			commitment: Some(CommitmentConfig::confirmed()),
			max_supported_transaction_version: Some(0),
		}
	}

	fn send_config() -> RpcSendTransactionConfig {
		RpcSendTransactionConfig {
			skip_preflight: true,
			max_retries: Some(0),
			..RpcSendTransactionConfig::default()
		}
	}
}

/// Reduces an encoded confirmed transaction to the envelope the deposit
/// validator consumes.
fn extract_envelope(
	fetched: EncodedConfirmedTransactionWithStatusMeta,
) -> Result<TransactionEnvelope, ChainError> {
	let meta = fetched
		.transaction
		.meta
		.ok_or_else(|| ChainError::MalformedResponse("transaction meta missing".to_string()))?;

	let ui_transaction = match fetched.transaction.transaction {
		EncodedTransaction::Json(tx) => tx,
		other => {
			return Err(ChainError::MalformedResponse(format!(
				"unexpected transaction encoding: {:?}",
				other
			)))
		},
	};

	let message = match ui_transaction.message {
		UiMessage::Raw(raw) => raw,
		UiMessage::Parsed(_) => {
			return Err(ChainError::MalformedResponse(
				"parsed message where raw was requested".to_string(),
			))
		},
	};

	let account_keys = message
		.account_keys
		.iter()
		.map(|key| Pubkey::from_str(key))
		.collect::<Result<Vec<_>, _>>()
		.map_err(|e| ChainError::MalformedResponse(format!("bad account key: {}", e)))?;

	Ok(TransactionEnvelope {
		account_keys,
		header: message.header,
		fee: meta.fee,
		pre_balances: meta.pre_balances.clone(),
		post_balances: meta.post_balances.clone(),
	})
}

#[async_trait]
impl ChainInterface for RpcChainGateway {
	async fn transaction_envelope(
		&self,
		signature: &Signature,
	) -> Result<TransactionEnvelope, ChainError> {
		let fetched = Self::failover(
			"get_transaction",
			self.primary
				.get_transaction_with_config(signature, Self::transaction_config()),
			self.backup
				.get_transaction_with_config(signature, Self::transaction_config()),
		)
		.await?;

		extract_envelope(fetched)
	}

	async fn account_data(&self, address: &Pubkey) -> Result<Vec<u8>, ChainError> {
		let account = Self::failover(
			"get_account",
			self.primary.get_account(address),
			self.backup.get_account(address),
		)
		.await?;

		Ok(account.data)
	}

	async fn latest_blockhash(&self) -> Result<(Hash, u64), ChainError> {
		Self::failover(
			"get_latest_blockhash",
			self.primary
				.get_latest_blockhash_with_commitment(CommitmentConfig::confirmed()),
			self.backup
				.get_latest_blockhash_with_commitment(CommitmentConfig::confirmed()),
		)
		.await
	}

	async fn block_height(&self) -> Result<u64, ChainError> {
		Self::failover(
			"get_block_height",
			self.primary.get_block_height(),
			self.backup.get_block_height(),
		)
		.await
	}

	async fn submit_transaction(&self, tx: &Transaction) -> Result<Signature, ChainError> {
		Self::failover(
			"send_transaction",
			self.primary
				.send_transaction_with_config(tx, Self::send_config()),
			self.backup
				.send_transaction_with_config(tx, Self::send_config()),
		)
		.await
	}
}
