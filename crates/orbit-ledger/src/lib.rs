//! Ledger store adapter for the orbit custody engine.
//!
//! This module provides the durable-store abstraction the engine tracks
//! deposits and jobs in. The storage engine itself is external; everything
//! here goes through conditional single-key operations, and a failed write
//! condition surfaces as [`LedgerError::PreconditionFailed`], distinct from
//! I/O failure, because callers treat it as a logical outcome ("already
//! deposited"), not a fault.

use async_trait::async_trait;
use orbit_types::{ConfigSchema, ImplementationRegistry};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
	/// The requested record does not exist.
	#[error("Not found")]
	NotFound,
	/// A conditional write's condition did not hold (record already present
	/// for put-if-absent, or absent for replace).
	#[error("Precondition failed")]
	PreconditionFailed,
	/// Record could not be encoded or decoded.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// The storage backend failed.
	#[error("Backend error: {0}")]
	Backend(String),
	/// The backend's configuration section was invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// The tables this engine owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
	/// Wallet -> current location, balance, activity log.
	Deposits,
	/// Wallet -> pending operation.
	Jobs,
}

impl Table {
	pub fn as_str(&self) -> &'static str {
		match self {
			Table::Deposits => "deposits",
			Table::Jobs => "jobs",
		}
	}
}

/// Low-level interface a ledger backend implements.
///
/// Keys are `table:wallet` strings assembled by [`LedgerService`]. The two
/// conditional writes must be atomic with respect to each other within the
/// backend: put-if-absent fails on an existing key, replace fails on a
/// missing key.
#[async_trait]
pub trait LedgerInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, LedgerError>;

	/// Stores raw bytes only if the key does not already exist.
	async fn put_bytes_if_absent(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;

	/// Overwrites raw bytes only if the key already exists.
	async fn replace_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;

	/// Deletes the value associated with the given key. Deleting a missing
	/// key is not an error.
	async fn delete(&self, key: &str) -> Result<(), LedgerError>;

	/// Checks whether a key exists.
	async fn exists(&self, key: &str) -> Result<bool, LedgerError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for ledger factory functions.
pub type LedgerFactory = fn(&toml::Value) -> Result<Box<dyn LedgerInterface>, LedgerError>;

/// Registry trait for ledger implementations.
pub trait LedgerRegistry: ImplementationRegistry<Factory = LedgerFactory> {}

/// All registered ledger implementations as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, LedgerFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// Typed ledger operations over a backend.
///
/// Wraps a [`LedgerInterface`] with JSON serialization and the table/key
/// scheme used throughout the engine.
pub struct LedgerService {
	/// The underlying backend implementation.
	backend: Box<dyn LedgerInterface>,
}

impl LedgerService {
	pub fn new(backend: Box<dyn LedgerInterface>) -> Self {
		Self { backend }
	}

	fn key(table: Table, id: &str) -> String {
		format!("{}:{}", table.as_str(), id)
	}

	/// Retrieves and deserializes a record. Missing records are
	/// [`LedgerError::NotFound`].
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		table: Table,
		id: &str,
	) -> Result<T, LedgerError> {
		let bytes = self.backend.get_bytes(&Self::key(table, id)).await?;
		serde_json::from_slice(&bytes).map_err(|e| LedgerError::Serialization(e.to_string()))
	}

	/// Like [`retrieve`](Self::retrieve) but maps a missing record to
	/// `None` for callers that treat absence as a normal outcome.
	pub async fn try_retrieve<T: DeserializeOwned>(
		&self,
		table: Table,
		id: &str,
	) -> Result<Option<T>, LedgerError> {
		match self.retrieve(table, id).await {
			Ok(record) => Ok(Some(record)),
			Err(LedgerError::NotFound) => Ok(None),
			Err(e) => Err(e),
		}
	}

	/// Inserts a record conditioned on the key being absent.
	pub async fn insert<T: Serialize>(
		&self,
		table: Table,
		id: &str,
		record: &T,
	) -> Result<(), LedgerError> {
		let bytes =
			serde_json::to_vec(record).map_err(|e| LedgerError::Serialization(e.to_string()))?;
		self.backend
			.put_bytes_if_absent(&Self::key(table, id), bytes)
			.await
	}

	/// Replaces a record conditioned on the key existing.
	pub async fn replace<T: Serialize>(
		&self,
		table: Table,
		id: &str,
		record: &T,
	) -> Result<(), LedgerError> {
		let bytes =
			serde_json::to_vec(record).map_err(|e| LedgerError::Serialization(e.to_string()))?;
		self.backend
			.replace_bytes(&Self::key(table, id), bytes)
			.await
	}

	/// Removes a record. Removing an absent record succeeds.
	pub async fn remove(&self, table: Table, id: &str) -> Result<(), LedgerError> {
		self.backend.delete(&Self::key(table, id)).await
	}

	/// Checks whether a record exists.
	pub async fn exists(&self, table: Table, id: &str) -> Result<bool, LedgerError> {
		self.backend.exists(&Self::key(table, id)).await
	}
}
