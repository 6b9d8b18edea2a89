//! Configuration module for the orbit custody engine.
//!
//! Loads and validates the engine's TOML configuration: chain endpoints,
//! program addresses, the manager secret, ledger and notification backend
//! selection, and submission tuning. Backend sections are kept as raw TOML
//! values and validated by the chosen implementation's own schema at wiring
//! time.

use orbit_types::SecretString;
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration for the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	/// Engine instance settings.
	pub engine: EngineConfig,
	/// RPC and streaming endpoints.
	pub chain: ChainConfig,
	/// On-chain program and fixed account addresses.
	pub program: ProgramConfig,
	/// Custodial manager key.
	pub manager: ManagerConfig,
	/// Ledger backend selection.
	pub ledger: LedgerConfig,
	/// Submission loop tuning.
	#[serde(default)]
	pub submission: SubmissionConfig,
	/// Notification backend selection.
	#[serde(default)]
	pub notification: NotificationConfig,
}

/// Engine instance settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
	/// Identifier carried in logs.
	pub id: String,
}

/// RPC and streaming endpoints. The primary and backup HTTP endpoints must
/// be interchangeable; failover between them happens per call.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
	/// Primary HTTP RPC endpoint.
	pub primary_http_url: String,
	/// Backup HTTP RPC endpoint.
	pub backup_http_url: String,
	/// Websocket endpoint for signature subscriptions.
	pub ws_url: String,
}

/// On-chain program and fixed account addresses.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramConfig {
	/// The custody program id.
	pub program_id: String,
	/// The universe configuration account.
	pub universe_address: String,
	/// The treasury account deposit fees land on.
	pub treasury_address: String,
}

impl ProgramConfig {
	pub fn program_id(&self) -> Result<Pubkey, ConfigError> {
		parse_pubkey("program.program_id", &self.program_id)
	}

	pub fn universe_address(&self) -> Result<Pubkey, ConfigError> {
		parse_pubkey("program.universe_address", &self.universe_address)
	}

	pub fn treasury_address(&self) -> Result<Pubkey, ConfigError> {
		parse_pubkey("program.treasury_address", &self.treasury_address)
	}
}

/// Custodial manager key.
#[derive(Debug, Clone, Deserialize)]
pub struct ManagerConfig {
	/// Base58-encoded manager keypair.
	pub secret: SecretString,
}

/// Ledger backend selection.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
	/// Which implementation to use.
	pub primary: String,
	/// Map of ledger implementation names to their configurations.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

impl LedgerConfig {
	/// The selected implementation's raw TOML section, or an empty table.
	pub fn primary_section(&self) -> toml::Value {
		self.implementations
			.get(&self.primary)
			.cloned()
			.unwrap_or(toml::Value::Table(Default::default()))
	}
}

/// Submission loop tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionConfig {
	/// Attempt bound for one transaction.
	#[serde(default = "default_max_attempts")]
	pub max_attempts: u32,
	/// Pause between attempts in milliseconds.
	#[serde(default = "default_retry_delay_ms")]
	pub retry_delay_ms: u64,
}

impl Default for SubmissionConfig {
	fn default() -> Self {
		Self {
			max_attempts: default_max_attempts(),
			retry_delay_ms: default_retry_delay_ms(),
		}
	}
}

fn default_max_attempts() -> u32 {
	6
}

fn default_retry_delay_ms() -> u64 {
	1_500
}

/// Notification backend selection.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
	/// Which implementation to use.
	#[serde(default = "default_notifier")]
	pub primary: String,
	/// Topic completion and recovery messages are published to.
	#[serde(default = "default_topic")]
	pub topic: String,
	/// Map of notification implementation names to their configurations.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

impl Default for NotificationConfig {
	fn default() -> Self {
		Self {
			primary: default_notifier(),
			topic: default_topic(),
			implementations: HashMap::new(),
		}
	}
}

impl NotificationConfig {
	/// The selected implementation's raw TOML section, or an empty table.
	pub fn primary_section(&self) -> toml::Value {
		self.implementations
			.get(&self.primary)
			.cloned()
			.unwrap_or(toml::Value::Table(Default::default()))
	}
}

fn default_notifier() -> String {
	"log".to_string()
}

fn default_topic() -> String {
	"task-complete".to_string()
}

fn parse_pubkey(field: &str, value: &str) -> Result<Pubkey, ConfigError> {
	Pubkey::from_str(value)
		.map_err(|e| ConfigError::Validation(format!("{}: invalid address: {}", field, e)))
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let raw = std::fs::read_to_string(path)?;
		let config: Config = toml::from_str(&raw)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks everything that can be checked without network access:
	/// addresses parse, endpoints look like endpoints, the secret and
	/// backend names are non-empty.
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.program.program_id()?;
		self.program.universe_address()?;
		self.program.treasury_address()?;

		for (field, value) in [
			("chain.primary_http_url", &self.chain.primary_http_url),
			("chain.backup_http_url", &self.chain.backup_http_url),
		] {
			if !value.starts_with("http://") && !value.starts_with("https://") {
				return Err(ConfigError::Validation(format!(
					"{}: expected an http(s) url",
					field
				)));
			}
		}
		if !self.chain.ws_url.starts_with("ws://") && !self.chain.ws_url.starts_with("wss://") {
			return Err(ConfigError::Validation(
				"chain.ws_url: expected a ws(s) url".to_string(),
			));
		}

		if self.manager.secret.is_empty() {
			return Err(ConfigError::Validation(
				"manager.secret: must not be empty".to_string(),
			));
		}

		if self.ledger.primary.is_empty() {
			return Err(ConfigError::Validation(
				"ledger.primary: must name an implementation".to_string(),
			));
		}

		if self.submission.max_attempts == 0 {
			return Err(ConfigError::Validation(
				"submission.max_attempts: must be at least 1".to_string(),
			));
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn sample() -> String {
		format!(
			r#"
[engine]
id = "orbit-test"

[chain]
primary_http_url = "https://rpc.example.org"
backup_http_url = "https://rpc-backup.example.org"
ws_url = "wss://rpc.example.org"

[program]
program_id = "{}"
universe_address = "{}"
treasury_address = "{}"

[manager]
secret = "3yZe7d4h9GyVZKcKQ8tLfbQmwZXjAW3sdSXbDiZkSP2g"

[ledger]
primary = "memory"
"#,
			Pubkey::new_unique(),
			Pubkey::new_unique(),
			Pubkey::new_unique()
		)
	}

	#[test]
	fn sample_config_parses_with_defaults() {
		let config: Config = toml::from_str(&sample()).unwrap();
		config.validate().unwrap();

		assert_eq!(config.engine.id, "orbit-test");
		assert_eq!(config.submission.max_attempts, 6);
		assert_eq!(config.submission.retry_delay_ms, 1_500);
		assert_eq!(config.notification.primary, "log");
		assert_eq!(config.notification.topic, "task-complete");
	}

	#[test]
	fn bad_program_address_fails_validation() {
		let mut config: Config = toml::from_str(&sample()).unwrap();
		config.program.program_id = "not-an-address".to_string();
		assert!(matches!(
			config.validate(),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn non_ws_streaming_url_fails_validation() {
		let mut config: Config = toml::from_str(&sample()).unwrap();
		config.chain.ws_url = "https://rpc.example.org".to_string();
		assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn missing_section_is_a_parse_error() {
		let raw = sample().replace("[manager]", "[not_manager]");
		assert!(matches!(
			toml::from_str::<Config>(&raw),
			Err(_)
		));
	}

	#[test]
	fn from_file_round_trip() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(sample().as_bytes()).unwrap();
		let config = Config::from_file(file.path()).unwrap();
		assert_eq!(config.ledger.primary, "memory");
	}

	#[test]
	fn backend_sections_are_carried_as_raw_toml() {
		let raw = format!(
			"{}\n[ledger.implementations.file]\nstorage_path = \"/tmp/orbit\"\n",
			sample().replace("primary = \"memory\"", "primary = \"file\"")
		);
		let config: Config = toml::from_str(&raw).unwrap();
		let section = config.ledger.primary_section();
		assert_eq!(
			section.get("storage_path").and_then(|v| v.as_str()),
			Some("/tmp/orbit")
		);
	}
}
