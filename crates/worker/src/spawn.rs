use std::future::Future;
use std::sync::OnceLock;

use scopeline_context::{Inheritance, TaskFrame};
use tokio::task::JoinHandle;

use crate::TaskClass;
use crate::config::WorkerConfig;

/// Returns the current tokio runtime handle, or the lazily built fallback one.
pub(crate) fn runtime_handle() -> tokio::runtime::Handle {
	if let Ok(handle) = tokio::runtime::Handle::try_current() {
		return handle;
	}

	static GLOBAL_RT: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
	let runtime = GLOBAL_RT.get_or_init(|| {
		let config = WorkerConfig::from_env_or_default();
		tracing::debug!(worker_threads = config.worker_threads, thread_name = %config.thread_name, "worker.global_runtime.start");
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(config.worker_threads)
			.thread_name(config.thread_name)
			.build()
			.expect("failed to build scopeline-worker global tokio runtime")
	});
	runtime.handle().clone()
}

/// Spawns an async task.
///
/// With [`Inheritance::Inherit`] the task sees exactly the bindings visible
/// to the caller at this call, whatever the caller does afterwards.
#[allow(clippy::disallowed_methods)]
pub fn spawn<F>(class: TaskClass, inheritance: Inheritance, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	let frame = TaskFrame::new(inheritance);
	tracing::trace!(worker_class = class.as_str(), inheritance = inheritance.as_str(), depth = frame.head().depth(), "worker.spawn");
	runtime_handle().spawn(frame.scope(fut))
}

/// Spawns blocking work on the blocking pool.
#[allow(clippy::disallowed_methods)]
pub fn spawn_blocking<F, R>(class: TaskClass, inheritance: Inheritance, f: F) -> JoinHandle<R>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	let frame = TaskFrame::new(inheritance);
	tracing::trace!(worker_class = class.as_str(), inheritance = inheritance.as_str(), depth = frame.head().depth(), "worker.spawn_blocking");
	runtime_handle().spawn_blocking(move || frame.run(f))
}

/// Spawns a dedicated OS thread.
#[allow(clippy::disallowed_methods)]
pub fn spawn_thread<F, R>(class: TaskClass, inheritance: Inheritance, f: F) -> std::thread::JoinHandle<R>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	let frame = TaskFrame::new(inheritance);
	tracing::trace!(worker_class = class.as_str(), inheritance = inheritance.as_str(), depth = frame.head().depth(), "worker.spawn_thread");
	std::thread::spawn(move || frame.run(f))
}

/// Spawns a dedicated named OS thread.
pub fn spawn_named_thread<F, R>(class: TaskClass, inheritance: Inheritance, name: impl Into<String>, f: F) -> std::io::Result<std::thread::JoinHandle<R>>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	let frame = TaskFrame::new(inheritance);
	tracing::trace!(worker_class = class.as_str(), inheritance = inheritance.as_str(), depth = frame.head().depth(), "worker.spawn_named_thread");
	std::thread::Builder::new().name(name.into()).spawn(move || frame.run(f))
}
