//! Signature confirmation via websocket subscription.
//!
//! After the submission loop finishes firing, the worker blocks here until
//! the streaming endpoint reports a status for the signature at `confirmed`
//! commitment. One notification is consumed, then the subscription is torn
//! down. No timeout is enforced at this layer; if the chain never finalizes
//! the transaction the call blocks until the connection drops.

use crate::ChainError;
use async_trait::async_trait;
use futures::StreamExt;
use solana_client::nonblocking::pubsub_client::PubsubClient;
use solana_client::rpc_config::RpcSignatureSubscribeConfig;
use solana_client::rpc_response::RpcSignatureResult;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::Signature;

/// Trait defining the interface for confirmation listeners.
#[async_trait]
pub trait ConfirmationInterface: Send + Sync {
	/// Blocks until the chain reports a status for `signature`. Returns
	/// `Ok(())` for a successful transaction and
	/// [`ChainError::TransactionFailed`] when the status carries an error.
	async fn wait_for_signature(&self, signature: &Signature) -> Result<(), ChainError>;
}

/// Confirmation listener backed by a single streaming endpoint.
pub struct PubsubConfirmationListener {
	ws_url: String,
}

impl PubsubConfirmationListener {
	pub fn new(ws_url: impl Into<String>) -> Self {
		Self { ws_url: ws_url.into() }
	}
}

#[async_trait]
impl ConfirmationInterface for PubsubConfirmationListener {
	async fn wait_for_signature(&self, signature: &Signature) -> Result<(), ChainError> {
		let client = PubsubClient::new(&self.ws_url)
			.await
			.map_err(|e| ChainError::Subscription(e.to_string()))?;

		let config = RpcSignatureSubscribeConfig {
			commitment: Some(CommitmentConfig::confirmed()),
			enable_received_notification: Some(false),
		};

		let (mut notifications, unsubscribe) = client
			.signature_subscribe(signature, Some(config))
			.await
			.map_err(|e| ChainError::Subscription(e.to_string()))?;

		tracing::debug!(%signature, "Subscribed to signature");

		let update = notifications.next().await;
		drop(notifications);
		unsubscribe().await;

		match update {
			Some(response) => match response.value {
				RpcSignatureResult::ProcessedSignature(processed) => match processed.err {
					None => Ok(()),
					Some(err) => Err(ChainError::TransactionFailed(err.to_string())),
				},
				// Not expected with received notifications disabled; treat
				// as the one status update we were waiting for.
				RpcSignatureResult::ReceivedSignature(_) => Ok(()),
			},
			None => Err(ChainError::Subscription(
				"stream closed before a status notification arrived".to_string(),
			)),
		}
	}
}
