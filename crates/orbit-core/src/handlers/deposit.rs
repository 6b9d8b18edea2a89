//! Deposit registration and lookup.
//!
//! Registration is the inbound edge of custody: the caller claims to have
//! landed a deposit transaction onto a planet, and we only create the
//! ledger record after the transaction has confirmed, fetched cleanly, and
//! survived full validation against its balance deltas. The insert itself
//! is conditioned on the wallet having no existing record, so a replayed
//! registration reports "already deposited" instead of overwriting.

use crate::truncate_key;
use orbit_chain::{ChainInterface, ConfirmationInterface};
use orbit_ledger::{LedgerError, LedgerService, Table};
use orbit_order::{DepositRejection, DepositValidator, UniverseSource};
use orbit_types::{unix_now, ActionCode, ActivityEntry, DepositRecord};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// A claimed deposit, as posted by the depositor's client.
#[derive(Debug, Clone)]
pub struct DepositRequest {
	/// Depositor wallet address.
	pub wallet: String,
	/// Claimed destination planet name.
	pub planet: String,
	/// Signature of the deposit transaction.
	pub signature: String,
}

/// Errors that can occur during deposit registration or lookup.
#[derive(Debug, Error)]
pub enum DepositError {
	#[error("User wallet address not valid")]
	InvalidWallet,
	#[error("Signature not valid")]
	InvalidSignature,
	/// The streaming endpoint failed before delivering a confirmation.
	#[error("Signature confirmation failed: {0}")]
	Confirmation(String),
	/// Neither RPC endpoint could serve the transaction.
	#[error("Signature not found in Solana")]
	TransactionUnavailable,
	#[error("Universe not found")]
	UniverseUnavailable,
	/// Validation rejected the claimed deposit; carries the fixed reason.
	#[error(transparent)]
	Rejected(#[from] DepositRejection),
	/// A deposit record already exists for this wallet.
	#[error("Already deposited")]
	AlreadyDeposited,
	#[error("Deposit data for wallet address not found")]
	NotFound,
	#[error("Record error: {0}")]
	Ledger(LedgerError),
}

impl From<LedgerError> for DepositError {
	fn from(err: LedgerError) -> Self {
		match err {
			LedgerError::PreconditionFailed => DepositError::AlreadyDeposited,
			LedgerError::NotFound => DepositError::NotFound,
			other => DepositError::Ledger(other),
		}
	}
}

/// Validates and records inbound deposits.
pub struct DepositHandler {
	chain: Arc<dyn ChainInterface>,
	confirmation: Arc<dyn ConfirmationInterface>,
	ledger: Arc<LedgerService>,
	validator: DepositValidator,
	universe: Arc<UniverseSource>,
}

impl DepositHandler {
	pub fn new(
		chain: Arc<dyn ChainInterface>,
		confirmation: Arc<dyn ConfirmationInterface>,
		ledger: Arc<LedgerService>,
		validator: DepositValidator,
		universe: Arc<UniverseSource>,
	) -> Self {
		Self {
			chain,
			confirmation,
			ledger,
			validator,
			universe,
		}
	}

	/// Validates the claimed deposit and creates its ledger record.
	pub async fn register(&self, request: &DepositRequest) -> Result<DepositRecord, DepositError> {
		tracing::info!(
			wallet = %truncate_key(&request.wallet),
			planet = %request.planet,
			signature = %truncate_key(&request.signature),
			"Registering deposit"
		);

		let wallet_key =
			Pubkey::from_str(&request.wallet).map_err(|_| DepositError::InvalidWallet)?;
		if !wallet_key.is_on_curve() {
			return Err(DepositError::InvalidWallet);
		}
		let signature =
			Signature::from_str(&request.signature).map_err(|_| DepositError::InvalidSignature)?;

		// Block until the transaction reaches confirmed commitment, then
		// fetch it with endpoint failover.
		self.confirmation
			.wait_for_signature(&signature)
			.await
			.map_err(|e| DepositError::Confirmation(e.to_string()))?;

		let envelope = self
			.chain
			.transaction_envelope(&signature)
			.await
			.map_err(|_| DepositError::TransactionUnavailable)?;

		let universe = self
			.universe
			.snapshot()
			.await
			.map_err(|_| DepositError::UniverseUnavailable)?;

		let validated =
			self.validator
				.validate(&envelope, &wallet_key, &request.planet, &universe)?;

		let now = unix_now();
		let record = DepositRecord {
			wallet: request.wallet.clone(),
			deposit: validated.lamports,
			location: validated.planet.clone(),
			hops: 0,
			planet_hop_fee: universe.planet_hop_fee,
			star_two_fee: universe.star_two_fee,
			star_three_fee: universe.star_three_fee,
			withdraw_fee: universe.withdraw_fee,
			created: now,
			last_updated: now,
			activity: vec![ActivityEntry {
				action: ActionCode::Deposit,
				to: validated.planet,
				time: now,
				signatures: vec![request.signature.clone()],
			}],
		};

		self.ledger
			.insert(Table::Deposits, &request.wallet, &record)
			.await?;

		tracing::info!(
			wallet = %truncate_key(&request.wallet),
			lamports = record.deposit,
			"Deposit created"
		);
		Ok(record)
	}

	/// Fetches the deposit record for a wallet.
	pub async fn lookup(&self, wallet: &str) -> Result<DepositRecord, DepositError> {
		let wallet_key = Pubkey::from_str(wallet).map_err(|_| DepositError::InvalidWallet)?;
		if !wallet_key.is_on_curve() {
			return Err(DepositError::InvalidWallet);
		}

		Ok(self.ledger.retrieve(Table::Deposits, wallet).await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use orbit_chain::{ChainError, TransactionEnvelope};
	use orbit_codec::{accounts::encode_universe, planet_address};
	use orbit_ledger::implementations::memory::MemoryLedger;
	use orbit_types::Universe;
	use solana_sdk::hash::Hash;
	use solana_sdk::message::MessageHeader;
	use solana_sdk::signature::Keypair;
	use solana_sdk::signer::Signer;
	use solana_sdk::transaction::Transaction;
	use std::sync::Mutex;

	const NETWORK_FEE: u64 = 5_000;

	struct ScriptedChain {
		envelope: Mutex<Option<TransactionEnvelope>>,
		universe: Universe,
	}

	#[async_trait]
	impl ChainInterface for ScriptedChain {
		async fn transaction_envelope(
			&self,
			_signature: &Signature,
		) -> Result<TransactionEnvelope, ChainError> {
			self.envelope
				.lock()
				.unwrap()
				.clone()
				.ok_or(ChainError::BothEndpointsFailed {
					operation: "get_transaction",
					detail: "scripted".to_string(),
				})
		}

		async fn account_data(&self, _address: &Pubkey) -> Result<Vec<u8>, ChainError> {
			Ok(encode_universe(&self.universe))
		}

		async fn latest_blockhash(&self) -> Result<(Hash, u64), ChainError> {
			unimplemented!("not used by deposit tests")
		}

		async fn block_height(&self) -> Result<u64, ChainError> {
			unimplemented!("not used by deposit tests")
		}

		async fn submit_transaction(&self, _tx: &Transaction) -> Result<Signature, ChainError> {
			unimplemented!("not used by deposit tests")
		}
	}

	struct InstantConfirmation;

	#[async_trait]
	impl ConfirmationInterface for InstantConfirmation {
		async fn wait_for_signature(&self, _signature: &Signature) -> Result<(), ChainError> {
			Ok(())
		}
	}

	struct Fixture {
		handler: DepositHandler,
		ledger: Arc<LedgerService>,
		chain: Arc<ScriptedChain>,
		request: DepositRequest,
	}

	fn fixture(planet_rise: u64) -> Fixture {
		let program_id = Pubkey::new_unique();
		let universe_address = Pubkey::new_unique();
		let treasury_address = Pubkey::new_unique();
		let depositor = Keypair::new().pubkey();
		let planet = planet_address("ANDORA", &program_id);

		let envelope = TransactionEnvelope {
			account_keys: vec![
				depositor,
				planet,
				universe_address,
				program_id,
				Pubkey::new_unique(),
				Pubkey::new_unique(),
			],
			header: MessageHeader {
				num_required_signatures: 1,
				num_readonly_signed_accounts: 0,
				num_readonly_unsigned_accounts: 3,
			},
			fee: NETWORK_FEE,
			pre_balances: vec![2_000_000 + NETWORK_FEE, 10_000, 1, 1, 1, 1],
			post_balances: vec![1_000_000, 10_000 + planet_rise, 1, 1, 1, 1],
		};

		let universe = Universe {
			planets: vec!["ANDORA".into(), "BETELGEUSE".into()],
			deposit_fee: 0,
			planet_hop_fee: 4_000,
			star_two_fee: 9_000,
			star_three_fee: 14_000,
			withdraw_fee: 6_000,
		};

		let chain = Arc::new(ScriptedChain {
			envelope: Mutex::new(Some(envelope)),
			universe,
		});
		let ledger = Arc::new(LedgerService::new(Box::new(MemoryLedger::new())));

		let handler = DepositHandler::new(
			chain.clone(),
			Arc::new(InstantConfirmation),
			ledger.clone(),
			DepositValidator::new(program_id, universe_address, treasury_address),
			Arc::new(UniverseSource::new(chain.clone(), universe_address)),
		);

		Fixture {
			handler,
			ledger,
			chain,
			request: DepositRequest {
				wallet: depositor.to_string(),
				planet: "ANDORA".to_string(),
				signature: Signature::default().to_string(),
			},
		}
	}

	#[tokio::test]
	async fn valid_deposit_creates_a_zero_hop_record() {
		let f = fixture(1_000_000);
		let record = f.handler.register(&f.request).await.unwrap();

		assert_eq!(record.location, "ANDORA");
		assert_eq!(record.deposit, 1_000_000);
		assert_eq!(record.hops, 0);
		assert_eq!(record.activity.len(), 1);
		assert_eq!(record.activity[0].action, ActionCode::Deposit);
		// Fee snapshot comes from the universe at registration time.
		assert_eq!(record.star_two_fee, 9_000);

		let stored: DepositRecord = f
			.ledger
			.retrieve(Table::Deposits, &f.request.wallet)
			.await
			.unwrap();
		assert_eq!(stored.deposit, 1_000_000);
	}

	#[tokio::test]
	async fn second_registration_reports_already_deposited() {
		let f = fixture(1_000_000);
		f.handler.register(&f.request).await.unwrap();
		let err = f.handler.register(&f.request).await.unwrap_err();
		assert!(matches!(err, DepositError::AlreadyDeposited));

		// Still exactly one record, untouched.
		let stored: DepositRecord = f
			.ledger
			.retrieve(Table::Deposits, &f.request.wallet)
			.await
			.unwrap();
		assert_eq!(stored.hops, 0);
	}

	#[tokio::test]
	async fn balance_mismatch_creates_no_record() {
		let f = fixture(999_999);
		let err = f.handler.register(&f.request).await.unwrap_err();
		assert!(matches!(
			err,
			DepositError::Rejected(DepositRejection::BalanceMismatch)
		));
		assert!(!f
			.ledger
			.exists(Table::Deposits, &f.request.wallet)
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn unfetchable_transaction_is_reported_as_not_found() {
		let f = fixture(1_000_000);
		// Drop the scripted envelope so the fetch fails on both endpoints.
		*f.chain.envelope.lock().unwrap() = None;
		let err = f.handler.register(&f.request).await.unwrap_err();
		assert!(matches!(err, DepositError::TransactionUnavailable));
	}

	#[tokio::test]
	async fn malformed_wallet_is_rejected_before_any_network_call() {
		let f = fixture(1_000_000);
		let request = DepositRequest {
			wallet: "garbage".to_string(),
			..f.request.clone()
		};
		let err = f.handler.register(&request).await.unwrap_err();
		assert!(matches!(err, DepositError::InvalidWallet));
	}

	#[tokio::test]
	async fn lookup_returns_not_found_for_unknown_wallets() {
		let f = fixture(1_000_000);
		let err = f.handler.lookup(&f.request.wallet).await.unwrap_err();
		assert!(matches!(err, DepositError::NotFound));
	}
}
