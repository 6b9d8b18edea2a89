//! Webhook notification backend.
//!
//! POSTs `{topic, message}` as JSON to a configured endpoint. Failures are
//! logged and dropped; the publish contract is best effort and nothing
//! downstream waits on delivery.

use crate::{NotificationInterface, NotifyError, NotifyFactory, NotifyRegistry};
use async_trait::async_trait;
use orbit_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use std::time::Duration;

/// Notification backend posting to an HTTP endpoint.
pub struct WebhookNotifier {
	client: reqwest::Client,
	url: String,
}

impl WebhookNotifier {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			client: reqwest::Client::new(),
			url: url.into(),
		}
	}
}

#[async_trait]
impl NotificationInterface for WebhookNotifier {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(WebhookNotifierSchema)
	}

	async fn publish(&self, topic: &str, message: &str) {
		let payload = serde_json::json!({
			"topic": topic,
			"message": message,
		});

		let result = self
			.client
			.post(&self.url)
			.json(&payload)
			.timeout(Duration::from_secs(5))
			.send()
			.await;

		match result {
			Ok(response) if response.status().is_success() => {
				tracing::debug!(topic, "Notification delivered");
			},
			Ok(response) => {
				tracing::warn!(topic, status = %response.status(), "Notification endpoint rejected message");
			},
			Err(e) => {
				tracing::warn!(topic, error = %e, "Notification delivery failed");
			},
		}
	}
}

/// Configuration schema for WebhookNotifier.
pub struct WebhookNotifierSchema;

impl ConfigSchema for WebhookNotifierSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(
			vec![Field::new("url", FieldType::String).with_validator(|v| {
				let s = v.as_str().unwrap_or_default();
				if s.starts_with("http://") || s.starts_with("https://") {
					Ok(())
				} else {
					Err("url must be http(s)".to_string())
				}
			})],
			vec![],
		)
		.validate(config)
	}
}

/// Registry entry for the webhook backend.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "webhook";
	type Factory = NotifyFactory;

	fn factory() -> Self::Factory {
		create_notifier
	}
}

impl NotifyRegistry for Registry {}

/// Factory function to create a webhook notifier.
///
/// Configuration parameters:
/// - `url`: endpoint to POST notifications to
pub fn create_notifier(
	config: &toml::Value,
) -> Result<Box<dyn NotificationInterface>, NotifyError> {
	let url = config
		.get("url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| NotifyError::Configuration("missing webhook url".to_string()))?;

	Ok(Box::new(WebhookNotifier::new(url)))
}
