//! Notification module for the orbit custody engine.
//!
//! Orphan-recovery and job-completion messages go out through a best-effort
//! publish channel. Delivery is fire-and-forget by contract: a failed
//! publish is logged and swallowed, never propagated into job processing.

use async_trait::async_trait;
use orbit_types::{ConfigSchema, ImplementationRegistry};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod log;
	pub mod webhook;
}

/// Errors that can occur while constructing a notification backend.
#[derive(Debug, Error)]
pub enum NotifyError {
	/// The backend's configuration section was invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait implemented by notification backends.
#[async_trait]
pub trait NotificationInterface: Send + Sync {
	/// Returns the configuration schema for this notification backend.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Publishes a message to a topic. Implementations log failures and
	/// never surface them to the caller.
	async fn publish(&self, topic: &str, message: &str);
}

/// Type alias for notification factory functions.
pub type NotifyFactory = fn(&toml::Value) -> Result<Box<dyn NotificationInterface>, NotifyError>;

/// Registry trait for notification implementations.
pub trait NotifyRegistry: ImplementationRegistry<Factory = NotifyFactory> {}

/// All registered notification implementations as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, NotifyFactory)> {
	use implementations::{log, webhook};

	vec![
		(log::Registry::NAME, log::Registry::factory()),
		(webhook::Registry::NAME, webhook::Registry::factory()),
	]
}

/// Service binding a notification backend to the engine's topic.
pub struct NotificationService {
	implementation: Box<dyn NotificationInterface>,
	topic: String,
}

impl NotificationService {
	pub fn new(implementation: Box<dyn NotificationInterface>, topic: impl Into<String>) -> Self {
		Self {
			implementation,
			topic: topic.into(),
		}
	}

	/// Publishes a message to the configured topic, best effort.
	pub async fn publish(&self, message: &str) {
		self.implementation.publish(&self.topic, message).await;
	}
}
