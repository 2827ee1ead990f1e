use std::future::Future;

use scopeline_context::{Inheritance, TaskFrame};
use tokio::task::{JoinError, JoinSet};

use crate::TaskClass;

/// Class-tagged wrapper for a Tokio [`JoinSet`].
///
/// Every spawn names its [`Inheritance`], and tasks are attached to the
/// current worker runtime handle.
#[derive(Debug)]
pub struct WorkerJoinSet<T> {
	class: TaskClass,
	inner: JoinSet<T>,
}

impl<T> WorkerJoinSet<T>
where
	T: Send + 'static,
{
	/// Creates an empty worker join set for the given task class.
	pub fn new(class: TaskClass) -> Self {
		Self { class, inner: JoinSet::new() }
	}

	/// Returns the number of tasks currently in the set.
	pub fn len(&self) -> usize {
		self.inner.len()
	}

	/// Returns `true` if the set is empty.
	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// Spawns a future into the set on the current worker runtime handle.
	pub fn spawn<F>(&mut self, inheritance: Inheritance, fut: F)
	where
		F: Future<Output = T> + Send + 'static,
	{
		self.spawn_frame(TaskFrame::new(inheritance), fut);
	}

	/// Spawns a future inside a frame captured earlier by the caller.
	#[allow(clippy::disallowed_methods)]
	pub(crate) fn spawn_frame<F>(&mut self, frame: TaskFrame, fut: F)
	where
		F: Future<Output = T> + Send + 'static,
	{
		tracing::trace!(
			worker_class = self.class.as_str(),
			depth = frame.head().depth(),
			pending = self.inner.len(),
			"worker.join_set.spawn"
		);
		let handle = crate::spawn::runtime_handle();
		let _guard = handle.enter();
		self.inner.spawn(frame.scope(fut));
	}

	/// Waits for the next completed task.
	pub async fn join_next(&mut self) -> Option<Result<T, JoinError>> {
		self.inner.join_next().await
	}

	/// Returns one ready completion without waiting.
	pub fn try_join_next(&mut self) -> Option<Result<T, JoinError>> {
		self.inner.try_join_next()
	}

	/// Waits for every task, returning outputs in completion order.
	pub async fn join_all(&mut self) -> Vec<Result<T, JoinError>> {
		let mut out = Vec::with_capacity(self.inner.len());
		while let Some(res) = self.inner.join_next().await {
			out.push(res);
		}
		out
	}

	/// Aborts every task in the set.
	pub fn abort_all(&mut self) {
		self.inner.abort_all();
	}
}
