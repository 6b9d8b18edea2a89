//! Log-only notification backend.
//!
//! Writes every message to the process log instead of an external channel.
//! The default for development and for deployments without a notification
//! endpoint.

use crate::{NotificationInterface, NotifyError, NotifyFactory, NotifyRegistry};
use async_trait::async_trait;
use orbit_types::{ConfigSchema, ImplementationRegistry, Schema, ValidationError};

/// Notification backend that only logs.
pub struct LogNotifier;

#[async_trait]
impl NotificationInterface for LogNotifier {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LogNotifierSchema)
	}

	async fn publish(&self, topic: &str, message: &str) {
		tracing::info!(topic, message, "Notification published");
	}
}

/// Configuration schema for LogNotifier.
pub struct LogNotifierSchema;

impl ConfigSchema for LogNotifierSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Registry entry for the log backend.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "log";
	type Factory = NotifyFactory;

	fn factory() -> Self::Factory {
		create_notifier
	}
}

impl NotifyRegistry for Registry {}

/// Factory function to create a log notifier.
pub fn create_notifier(
	_config: &toml::Value,
) -> Result<Box<dyn NotificationInterface>, NotifyError> {
	Ok(Box::new(LogNotifier))
}
