//! Configuration for the fallback worker runtime.
//!
//! The fallback runtime is only built when work is spawned outside any tokio
//! runtime. Its shape can be tuned through `SCOPELINE_WORKER_THREADS` and
//! `SCOPELINE_WORKER_THREAD_NAME`.

use crate::error::{ConfigError, Result};

const THREADS_KEY: &str = "SCOPELINE_WORKER_THREADS";
const THREAD_NAME_KEY: &str = "SCOPELINE_WORKER_THREAD_NAME";

/// Shape of the fallback multi-thread runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
	pub worker_threads: usize,
	pub thread_name: String,
}

impl Default for WorkerConfig {
	fn default() -> Self {
		Self {
			worker_threads: 2,
			thread_name: "scopeline-worker".to_string(),
		}
	}
}

impl WorkerConfig {
	/// Loads overrides from the process environment.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Loads overrides through `lookup`, falling back to defaults for unset keys.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
		let mut config = Self::default();

		if let Some(raw) = lookup(THREADS_KEY) {
			config.worker_threads = match raw.trim().parse::<usize>() {
				Ok(0) => {
					return Err(ConfigError::InvalidValue {
						key: THREADS_KEY,
						value: raw,
						reason: "must be at least 1",
					});
				}
				Ok(n) => n,
				Err(_) => {
					return Err(ConfigError::InvalidValue {
						key: THREADS_KEY,
						value: raw,
						reason: "expected a positive integer",
					});
				}
			};
		}

		if let Some(raw) = lookup(THREAD_NAME_KEY) {
			let name = raw.trim();
			if name.is_empty() {
				return Err(ConfigError::InvalidValue {
					key: THREAD_NAME_KEY,
					value: raw,
					reason: "must not be empty",
				});
			}
			config.thread_name = name.to_string();
		}

		Ok(config)
	}

	/// Loads from the environment, logging and discarding invalid overrides.
	pub(crate) fn from_env_or_default() -> Self {
		Self::from_env().unwrap_or_else(|err| {
			tracing::warn!(error = %err, "worker.config.invalid");
			Self::default()
		})
	}
}
