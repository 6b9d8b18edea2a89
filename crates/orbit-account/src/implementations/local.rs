//! Local keypair account implementation.
//!
//! Holds the manager keypair in process memory, decoded from a base58
//! secret supplied through configuration.

use crate::{AccountError, AccountFactory, AccountInterface, AccountRegistry};
use async_trait::async_trait;
use orbit_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SecretString, ValidationError};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;

/// Manager account backed by an in-process keypair.
pub struct LocalAccount {
	keypair: Keypair,
}

impl LocalAccount {
	/// Decodes the base58 manager secret into a keypair.
	pub fn from_secret(secret: &SecretString) -> Result<Self, AccountError> {
		let bytes = bs58::decode(secret.expose_secret())
			.into_vec()
			.map_err(|e| AccountError::InvalidKey(format!("base58 decode failed: {}", e)))?;
		let keypair = Keypair::try_from(bytes.as_slice())
			.map_err(|e| AccountError::InvalidKey(e.to_string()))?;
		Ok(Self { keypair })
	}
}

#[async_trait]
impl AccountInterface for LocalAccount {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LocalAccountSchema)
	}

	fn address(&self) -> Pubkey {
		self.keypair.pubkey()
	}

	async fn sign_transaction(
		&self,
		instructions: &[Instruction],
		blockhash: Hash,
	) -> Result<Transaction, AccountError> {
		let message = Message::new(instructions, Some(&self.keypair.pubkey()));
		let mut tx = Transaction::new_unsigned(message);
		tx.try_sign(&[&self.keypair], blockhash)
			.map_err(|e| AccountError::SigningFailed(e.to_string()))?;
		Ok(tx)
	}
}

/// Configuration schema for LocalAccount.
pub struct LocalAccountSchema;

impl ConfigSchema for LocalAccountSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(
			vec![Field::new("secret", FieldType::String).with_validator(|v| {
				let s = v.as_str().unwrap_or_default();
				if s.is_empty() {
					Err("manager secret must not be empty".to_string())
				} else {
					Ok(())
				}
			})],
			vec![],
		)
		.validate(config)
	}
}

/// Registry entry for the local account implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "local";
	type Factory = AccountFactory;

	fn factory() -> Self::Factory {
		create_account
	}
}

impl AccountRegistry for Registry {}

/// Factory function to create a local account from configuration.
///
/// Configuration parameters:
/// - `secret`: base58-encoded manager keypair
pub fn create_account(config: &toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> {
	let secret = config
		.get("secret")
		.and_then(|v| v.as_str())
		.ok_or_else(|| AccountError::Configuration("missing manager secret".to_string()))?;

	Ok(Box::new(LocalAccount::from_secret(&SecretString::from(
		secret,
	))?))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn test_secret() -> (Keypair, SecretString) {
		let keypair = Keypair::new();
		let secret = SecretString::new(keypair.to_base58_string());
		(keypair, secret)
	}

	#[test]
	fn secret_round_trips_to_the_same_address() {
		let (keypair, secret) = test_secret();
		let account = LocalAccount::from_secret(&secret).unwrap();
		assert_eq!(account.address(), keypair.pubkey());
	}

	#[test]
	fn garbage_secret_is_rejected() {
		let err = LocalAccount::from_secret(&SecretString::from("not-base58-0OIl"));
		assert!(matches!(err, Err(AccountError::InvalidKey(_))));
	}

	#[tokio::test]
	async fn signed_transaction_has_manager_as_fee_payer() {
		let (_, secret) = test_secret();
		let account = LocalAccount::from_secret(&secret).unwrap();

		let program = Pubkey::new_unique();
		let ix = Instruction::new_with_bytes(
			program,
			&[7],
			vec![solana_sdk::instruction::AccountMeta::new(
				account.address(),
				true,
			)],
		);

		let tx = account
			.sign_transaction(&[ix], Hash::new_unique())
			.await
			.unwrap();
		assert_eq!(tx.message.account_keys[0], account.address());
		assert_eq!(tx.signatures.len(), 1);
		assert!(tx.signatures[0] != solana_sdk::signature::Signature::default());
	}
}
