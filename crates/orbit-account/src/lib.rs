//! Manager account module for the orbit custody engine.
//!
//! Every pipeline transaction is paid for and signed by a single custodial
//! manager key. The key is loaded once at startup and shared read-only
//! across all concurrently executing jobs; signing is stateless, so there is
//! no key-holder contention.

use async_trait::async_trait;
use orbit_types::{ConfigSchema, ImplementationRegistry, SecretString};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// The configured key material could not be decoded.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// Transaction signing failed.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// The account implementation's configuration was invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for manager account implementations.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Returns the configuration schema for this account implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// The manager's public key; fee payer for every pipeline transaction.
	fn address(&self) -> Pubkey;

	/// Builds and signs a transaction from the given instructions, with the
	/// manager as fee payer, bound to the supplied recent blockhash.
	async fn sign_transaction(
		&self,
		instructions: &[Instruction],
		blockhash: Hash,
	) -> Result<Transaction, AccountError>;
}

/// Type alias for account factory functions.
pub type AccountFactory = fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError>;

/// Registry trait for account implementations.
pub trait AccountRegistry: ImplementationRegistry<Factory = AccountFactory> {}

/// All registered account implementations as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, AccountFactory)> {
	use implementations::local;

	vec![(local::Registry::NAME, local::Registry::factory())]
}

/// Service wrapping the configured account implementation.
pub struct AccountService {
	implementation: Box<dyn AccountInterface>,
}

impl AccountService {
	pub fn new(implementation: Box<dyn AccountInterface>) -> Self {
		Self { implementation }
	}

	/// Convenience constructor from a base58-encoded manager secret.
	pub fn from_secret(secret: &SecretString) -> Result<Self, AccountError> {
		let local = implementations::local::LocalAccount::from_secret(secret)?;
		Ok(Self::new(Box::new(local)))
	}

	/// The manager's public key.
	pub fn address(&self) -> Pubkey {
		self.implementation.address()
	}

	/// Signs a transaction carrying the given instructions.
	pub async fn sign_transaction(
		&self,
		instructions: &[Instruction],
		blockhash: Hash,
	) -> Result<Transaction, AccountError> {
		self.implementation
			.sign_transaction(instructions, blockhash)
			.await
	}
}
