/// Execution class of spawned work.
///
/// Classes only label work for logging and pick the managed queue in
/// [`WorkerRuntime`](crate::WorkerRuntime); they never change how context is
/// inherited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Latency-sensitive work, drained first.
	Interactive,
	/// Async work that can wait.
	Background,
	/// Blocking I/O run on the blocking pool or a dedicated thread.
	IoBlocking,
	/// CPU-bound blocking work run on the blocking pool or a dedicated thread.
	CpuBlocking,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
			Self::IoBlocking => "io_blocking",
			Self::CpuBlocking => "cpu_blocking",
		}
	}

	/// Returns true for classes meant for blocking pools or threads.
	pub const fn is_blocking(self) -> bool {
		matches!(self, Self::IoBlocking | Self::CpuBlocking)
	}
}
