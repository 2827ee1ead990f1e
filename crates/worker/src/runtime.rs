use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use scopeline_context::{Inheritance, TaskFrame};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::budget::{DrainBudget, DrainReport};
use crate::join_set::WorkerJoinSet;
use crate::{TaskClass, spawn, spawn_blocking, spawn_named_thread, spawn_thread};

/// Unified runtime entrypoint for spawning and managed task queues.
///
/// Submitted work is held in an interactive and a background queue and
/// collected by [`Self::drain`]. Cancelling the runtime drops every pending
/// submission; each one is dropped inside its own context.
#[derive(Debug, Clone)]
pub struct WorkerRuntime {
	interactive: Arc<Mutex<WorkerJoinSet<()>>>,
	background: Arc<Mutex<WorkerJoinSet<()>>>,
	cancel: CancellationToken,
}

impl Default for WorkerRuntime {
	fn default() -> Self {
		Self::new()
	}
}

impl WorkerRuntime {
	/// Creates a runtime with empty managed queues.
	pub fn new() -> Self {
		Self {
			interactive: Arc::new(Mutex::new(WorkerJoinSet::new(TaskClass::Interactive))),
			background: Arc::new(Mutex::new(WorkerJoinSet::new(TaskClass::Background))),
			cancel: CancellationToken::new(),
		}
	}

	/// Spawns an async task.
	pub fn spawn<F>(&self, class: TaskClass, inheritance: Inheritance, fut: F) -> tokio::task::JoinHandle<F::Output>
	where
		F: Future + Send + 'static,
		F::Output: Send + 'static,
	{
		spawn(class, inheritance, fut)
	}

	/// Spawns blocking work.
	pub fn spawn_blocking<F, R>(&self, class: TaskClass, inheritance: Inheritance, f: F) -> tokio::task::JoinHandle<R>
	where
		F: FnOnce() -> R + Send + 'static,
		R: Send + 'static,
	{
		spawn_blocking(class, inheritance, f)
	}

	/// Spawns an OS thread.
	pub fn spawn_thread<F, R>(&self, class: TaskClass, inheritance: Inheritance, f: F) -> std::thread::JoinHandle<R>
	where
		F: FnOnce() -> R + Send + 'static,
		R: Send + 'static,
	{
		spawn_thread(class, inheritance, f)
	}

	/// Spawns a named OS thread.
	pub fn spawn_named_thread<F, R>(&self, class: TaskClass, inheritance: Inheritance, name: impl Into<String>, f: F) -> std::io::Result<std::thread::JoinHandle<R>>
	where
		F: FnOnce() -> R + Send + 'static,
		R: Send + 'static,
	{
		spawn_named_thread(class, inheritance, name, f)
	}

	/// Submits managed work drained by [`Self::drain`].
	///
	/// The context is captured here, before the queue lock is awaited.
	/// Interactive work goes to the interactive queue, everything else to the
	/// background queue. Work submitted after [`Self::cancel`] is dropped
	/// without running.
	pub async fn submit<F>(&self, class: TaskClass, inheritance: Inheritance, fut: F)
	where
		F: Future<Output = ()> + Send + 'static,
	{
		let frame = TaskFrame::new(inheritance);
		let cancel = self.cancel.clone();
		let fut = async move {
			tokio::select! {
				biased;
				_ = cancel.cancelled() => tracing::debug!(worker_class = class.as_str(), "worker.submit.cancelled"),
				_ = fut => {}
			}
		};
		let queue = if class == TaskClass::Interactive { &self.interactive } else { &self.background };
		queue.lock().await.spawn_frame(frame, fut);
	}

	/// Drains managed runtime work under one budget.
	pub async fn drain(&self, budget: DrainBudget) -> DrainReport {
		if budget.max_completions == 0 {
			let i = self.interactive.lock().await.len();
			let b = self.background.lock().await.len();
			return DrainReport {
				pending_interactive: i,
				pending_background: b,
				..DrainReport::default()
			};
		}

		let start = Instant::now();
		let deadline = start + budget.duration;
		let mut completed = 0u64;

		loop {
			if completed as usize >= budget.max_completions || Instant::now() >= deadline {
				break;
			}

			let did_work = Self::join_one(&self.interactive, deadline).await;
			if did_work {
				completed = completed.wrapping_add(1);
				continue;
			}

			if Self::join_one(&self.background, deadline).await {
				completed = completed.wrapping_add(1);
			} else {
				break;
			}
		}

		let pending_interactive = self.interactive.lock().await.len();
		let pending_background = self.background.lock().await.len();
		DrainReport {
			completed,
			pending_interactive,
			pending_background,
			budget_exhausted: completed as usize >= budget.max_completions || Instant::now() >= deadline,
		}
	}

	async fn join_one(queue: &Mutex<WorkerJoinSet<()>>, deadline: Instant) -> bool {
		let mut queue = queue.lock().await;
		if queue.is_empty() {
			return false;
		}
		match tokio::time::timeout(deadline.saturating_duration_since(Instant::now()), queue.join_next()).await {
			Ok(Some(res)) => {
				if let Err(err) = res {
					tracing::warn!(error = %err, "worker.drain.join_failed");
				}
				true
			}
			_ => false,
		}
	}

	/// Requests cancellation of all managed work.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Returns true once [`Self::cancel`] was called.
	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}
}
