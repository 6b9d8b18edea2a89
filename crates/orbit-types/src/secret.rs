//! Zeroizing wrapper for the manager secret.
//!
//! The custodial signing key reaches the process as a base58 string in
//! configuration. `SecretString` keeps it out of logs and debug output and
//! zeroes the backing memory on drop.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

/// A string whose contents are redacted from all formatting and zeroed on
/// drop. Use for private keys and any other credential material.
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	pub fn new(s: String) -> Self {
		Self(Zeroizing::new(s))
	}

	/// Grants access to the underlying secret. Callers must not log or
	/// persist the returned slice.
	pub fn expose_secret(&self) -> &str {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SecretString(***)")
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("***")
	}
}

impl From<&str> for SecretString {
	fn from(s: &str) -> Self {
		Self::new(s.to_string())
	}
}

impl Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		// Never serialize the real value back out.
		serializer.serialize_str("***")
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		Ok(SecretString::new(String::deserialize(deserializer)?))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn formatting_never_leaks_the_value() {
		let secret = SecretString::from("5Kb8kLf9zgWQnogidDA76MzPL6TsZZY36hWXMssSzNydYXYB9KF");
		assert_eq!(format!("{:?}", secret), "SecretString(***)");
		assert_eq!(format!("{}", secret), "***");
		assert!(!format!("{:?}", secret).contains("5Kb8"));
	}

	#[test]
	fn expose_returns_the_original() {
		let secret = SecretString::from("manager-key");
		assert_eq!(secret.expose_secret(), "manager-key");
		assert!(!secret.is_empty());
	}

	#[test]
	fn serialization_is_redacted() {
		let secret = SecretString::from("manager-key");
		assert_eq!(serde_json::to_string(&secret).unwrap(), "\"***\"");
	}
}
