//! Registry trait for self-registering backend implementations.

/// Base trait for pluggable backend registries.
///
/// Each backend module (ledger, account, notification) exposes a `Registry`
/// struct implementing this trait, tying the name used in configuration to
/// the factory that builds the backend from its TOML section.
pub trait ImplementationRegistry {
	/// The name this implementation is selected by in configuration, e.g.
	/// `"memory"` for `ledger.implementations.memory`.
	const NAME: &'static str;

	/// The factory function type the owning module defines.
	type Factory;

	/// The factory for this implementation.
	fn factory() -> Self::Factory;
}
