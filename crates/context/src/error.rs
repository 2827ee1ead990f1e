//! Error types for context lookups.

use thiserror::Error;

/// Errors surfaced by context lookups that the caller chose to treat as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
	/// The variable has no binding in the current chain and no default.
	#[error("context variable '{variable}' is not bound")]
	Unbound {
		/// Diagnostic name of the variable.
		variable: &'static str,
	},
}

/// Result type for context operations.
pub type Result<T> = std::result::Result<T, ContextError>;
