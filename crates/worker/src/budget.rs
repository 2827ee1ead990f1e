use std::time::Duration;

/// Limits for one [`WorkerRuntime::drain`](crate::WorkerRuntime::drain) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainBudget {
	/// Wall-clock time the drain may spend waiting for completions.
	pub duration: Duration,
	/// Maximum number of completions to collect.
	pub max_completions: usize,
}

impl Default for DrainBudget {
	fn default() -> Self {
		Self {
			duration: Duration::from_millis(10),
			max_completions: 64,
		}
	}
}

/// Outcome of one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
	/// Tasks that finished during this pass.
	pub completed: u64,
	/// Interactive tasks still outstanding afterwards.
	pub pending_interactive: usize,
	/// Background and blocking tasks still outstanding afterwards.
	pub pending_background: usize,
	/// True when the pass stopped on its time or completion limit.
	pub budget_exhausted: bool,
}
