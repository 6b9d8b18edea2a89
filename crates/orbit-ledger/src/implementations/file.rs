//! File-based ledger backend.
//!
//! Stores each record as a JSON file under the configured base directory,
//! one file per `table:wallet` key. Writes go through a temp file and a
//! rename. Conditional writes are serialized behind a mutex so the
//! exists-check and the write cannot interleave within the process; the
//! engine's single-worker-per-wallet model makes cross-process races a
//! non-concern for this backend.

use crate::{LedgerError, LedgerFactory, LedgerInterface, LedgerRegistry};
use async_trait::async_trait;
use orbit_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

/// File-backed ledger implementation.
pub struct FileLedger {
	/// Base directory records are stored under.
	base_path: PathBuf,
	/// Serializes conditional check-then-write sequences.
	write_guard: Mutex<()>,
}

impl FileLedger {
	pub fn new(base_path: PathBuf) -> Self {
		Self {
			base_path,
			write_guard: Mutex::new(()),
		}
	}

	/// Filesystem-safe path for a record key.
	fn record_path(&self, key: &str) -> PathBuf {
		let safe_key = key.replace(['/', ':'], "_");
		self.base_path.join(format!("{}.json", safe_key))
	}

	async fn write_record(&self, path: &PathBuf, value: Vec<u8>) -> Result<(), LedgerError> {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| LedgerError::Backend(e.to_string()))?;
		}

		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, value)
			.await
			.map_err(|e| LedgerError::Backend(e.to_string()))?;
		fs::rename(&temp_path, path)
			.await
			.map_err(|e| LedgerError::Backend(e.to_string()))
	}
}

#[async_trait]
impl LedgerInterface for FileLedger {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, LedgerError> {
		match fs::read(self.record_path(key)).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(LedgerError::NotFound),
			Err(e) => Err(LedgerError::Backend(e.to_string())),
		}
	}

	async fn put_bytes_if_absent(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
		let _guard = self.write_guard.lock().await;
		let path = self.record_path(key);
		if path.exists() {
			return Err(LedgerError::PreconditionFailed);
		}
		self.write_record(&path, value).await
	}

	async fn replace_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
		let _guard = self.write_guard.lock().await;
		let path = self.record_path(key);
		if !path.exists() {
			return Err(LedgerError::PreconditionFailed);
		}
		self.write_record(&path, value).await
	}

	async fn delete(&self, key: &str) -> Result<(), LedgerError> {
		match fs::remove_file(self.record_path(key)).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(LedgerError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, LedgerError> {
		Ok(self.record_path(key).exists())
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileLedgerSchema)
	}
}

/// Configuration schema for FileLedger.
pub struct FileLedgerSchema;

impl ConfigSchema for FileLedgerSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(
			vec![],
			vec![Field::new("storage_path", FieldType::String)],
		)
		.validate(config)
	}
}

/// Registry entry for the file backend.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = LedgerFactory;

	fn factory() -> Self::Factory {
		create_ledger
	}
}

impl LedgerRegistry for Registry {}

/// Factory function to create a file ledger backend.
///
/// Configuration parameters:
/// - `storage_path`: base directory for record files (default: "./data/ledger")
pub fn create_ledger(config: &toml::Value) -> Result<Box<dyn LedgerInterface>, LedgerError> {
	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/ledger")
		.to_string();

	Ok(Box::new(FileLedger::new(PathBuf::from(storage_path))))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn records_survive_a_new_handle_on_the_same_directory() {
		let dir = tempfile::tempdir().unwrap();
		let ledger = FileLedger::new(dir.path().to_path_buf());
		ledger
			.put_bytes_if_absent("deposits:w", br#"{"deposit":1}"#.to_vec())
			.await
			.unwrap();

		let reopened = FileLedger::new(dir.path().to_path_buf());
		let data = reopened.get_bytes("deposits:w").await.unwrap();
		assert_eq!(data, br#"{"deposit":1}"#.to_vec());
	}

	#[tokio::test]
	async fn put_if_absent_rejects_existing_records() {
		let dir = tempfile::tempdir().unwrap();
		let ledger = FileLedger::new(dir.path().to_path_buf());

		ledger
			.put_bytes_if_absent("jobs:w", b"a".to_vec())
			.await
			.unwrap();
		let dup = ledger.put_bytes_if_absent("jobs:w", b"b".to_vec()).await;
		assert!(matches!(dup, Err(LedgerError::PreconditionFailed)));
	}

	#[tokio::test]
	async fn replace_rejects_missing_records() {
		let dir = tempfile::tempdir().unwrap();
		let ledger = FileLedger::new(dir.path().to_path_buf());
		let missing = ledger.replace_bytes("jobs:w", b"a".to_vec()).await;
		assert!(matches!(missing, Err(LedgerError::PreconditionFailed)));
	}
}
