//! Registry trait for implementations selected by name in configuration.

/// Ties an implementation to the name used for it in the TOML configuration
/// and to the factory that builds it.
///
/// For example `[settlement.implementations.simulated]` is served by the
/// registry whose `NAME` is `"simulated"`.
pub trait ImplementationRegistry {
	/// Key under `implementations` in the configuration file.
	const NAME: &'static str;

	/// Factory function type, defined by each component crate.
	type Factory;

	fn factory() -> Self::Factory;
}
