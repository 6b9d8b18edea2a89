//! In-memory ledger backend.
//!
//! Keeps all records in a map behind a read-write lock. Conditional writes
//! hold the write lock across check and insert, so they are atomic within
//! the process. Useful for tests and development; nothing survives a
//! restart.

use crate::{LedgerError, LedgerFactory, LedgerInterface, LedgerRegistry};
use async_trait::async_trait;
use orbit_types::{ConfigSchema, ImplementationRegistry, Schema, ValidationError};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory ledger implementation.
pub struct MemoryLedger {
	store: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryLedger {
	pub fn new() -> Self {
		Self {
			store: RwLock::new(HashMap::new()),
		}
	}
}

impl Default for MemoryLedger {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl LedgerInterface for MemoryLedger {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, LedgerError> {
		let store = self.store.read().await;
		store.get(key).cloned().ok_or(LedgerError::NotFound)
	}

	async fn put_bytes_if_absent(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
		let mut store = self.store.write().await;
		if store.contains_key(key) {
			return Err(LedgerError::PreconditionFailed);
		}
		store.insert(key.to_string(), value);
		Ok(())
	}

	async fn replace_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
		let mut store = self.store.write().await;
		if !store.contains_key(key) {
			return Err(LedgerError::PreconditionFailed);
		}
		store.insert(key.to_string(), value);
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), LedgerError> {
		let mut store = self.store.write().await;
		store.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, LedgerError> {
		let store = self.store.read().await;
		Ok(store.contains_key(key))
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryLedgerSchema)
	}
}

/// Configuration schema for MemoryLedger.
pub struct MemoryLedgerSchema;

impl ConfigSchema for MemoryLedgerSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// No configuration required.
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Registry entry for the memory backend.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = LedgerFactory;

	fn factory() -> Self::Factory {
		create_ledger
	}
}

impl LedgerRegistry for Registry {}

/// Factory function to create a memory ledger backend.
pub fn create_ledger(_config: &toml::Value) -> Result<Box<dyn LedgerInterface>, LedgerError> {
	Ok(Box::new(MemoryLedger::new()))
}
