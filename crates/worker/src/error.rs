//! Error types for worker configuration.

use thiserror::Error;

/// Errors that can occur when loading worker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
	/// A configuration value could not be accepted.
	#[error("invalid value for {key}: '{value}' ({reason})")]
	InvalidValue {
		/// Environment key the value came from.
		key: &'static str,
		/// The rejected raw value.
		value: String,
		/// Why the value was rejected.
		reason: &'static str,
	},
}

/// Result type for worker configuration.
pub type Result<T> = std::result::Result<T, ConfigError>;
