use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use pin_project_lite::pin_project;

use crate::bind::Bindings;
use crate::carrier::Snapshot;
use crate::current::{self, LocalsGuard};
use crate::local::LocalMap;

/// Whether a newly spawned task starts from its spawner's context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Inheritance {
	/// Share the spawner's current chain head.
	#[default]
	Inherit,
	/// Start with no bindings.
	Fresh,
}

impl Inheritance {
	/// Returns the chain head a new task should start with.
	pub fn snapshot(self) -> Snapshot {
		match self {
			Self::Inherit => Snapshot::capture(),
			Self::Fresh => Snapshot::empty(),
		}
	}

	/// Returns the lowercase label used in log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Inherit => "inherit",
			Self::Fresh => "fresh",
		}
	}
}

/// Initial execution state of a spawned task.
///
/// Holds the task's chain head and, as a separate field, its mutable slot
/// storage. The head may be shared with the spawner; the slot storage always
/// starts empty.
#[derive(Debug, Default)]
pub struct TaskFrame {
	head: Snapshot,
	locals: LocalMap,
}

impl TaskFrame {
	/// Captures a frame for a task about to be spawned from the caller.
	pub fn new(inheritance: Inheritance) -> Self {
		Self::from_snapshot(inheritance.snapshot())
	}

	/// Creates a frame starting from an explicit chain head.
	pub fn from_snapshot(head: Snapshot) -> Self {
		Self {
			head,
			locals: LocalMap::new(),
		}
	}

	/// Returns the chain head the task starts with.
	pub fn head(&self) -> &Snapshot {
		&self.head
	}

	/// Runs `f` as the body of the task.
	///
	/// Intended for blocking jobs and threads; the caller's chain head and
	/// slots are restored afterwards.
	pub fn run<R>(mut self, f: impl FnOnce() -> R) -> R {
		let _head = current::replace_head(self.head.clone());
		let _locals = LocalsGuard::enter(&mut self.locals);
		f()
	}

	/// Wraps `future` as the body of an async task.
	pub fn scope<F>(self, future: F) -> Scoped<F>
	where
		F: Future,
	{
		Scoped::new(future, self.head, Some(self.locals))
	}
}

pin_project! {
	/// A future running inside a chain head.
	///
	/// The head (and, for task bodies, the task's slot storage) is installed
	/// for the duration of each poll and of the inner future's drop, and the
	/// previous state is restored before either returns. A future built from
	/// [`Bindings::scope`](crate::Bindings::scope) fixes its head on first
	/// poll, on top of the chain in effect at that moment.
	pub struct Scoped<F> {
		#[pin]
		future: Option<F>,
		head: Snapshot,
		pending: Option<Bindings>,
		locals: Option<LocalMap>,
	}

	impl<F> PinnedDrop for Scoped<F> {
		fn drop(this: Pin<&mut Self>) {
			let mut this = this.project();
			if this.future.is_some() {
				let head = enter_head(this.head, this.pending);
				let _head = current::replace_head(head);
				let _locals = this.locals.as_mut().map(LocalsGuard::enter);
				this.future.set(None);
			}
		}
	}
}

impl<F> Scoped<F> {
	pub(crate) fn new(future: F, head: Snapshot, locals: Option<LocalMap>) -> Self {
		Self {
			future: Some(future),
			head,
			pending: None,
			locals,
		}
	}

	pub(crate) fn pending(future: F, bindings: Bindings) -> Self {
		Self {
			future: Some(future),
			head: Snapshot::empty(),
			pending: Some(bindings),
			locals: None,
		}
	}
}

/// Returns the head to install, resolving pending bindings against the
/// caller's chain the first time.
fn enter_head(head: &mut Snapshot, pending: &mut Option<Bindings>) -> Snapshot {
	if let Some(bindings) = pending.take() {
		*head = bindings.extend(current::head());
	}
	head.clone()
}

impl<F> Future for Scoped<F>
where
	F: Future,
{
	type Output = F::Output;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<F::Output> {
		let mut this = self.project();
		let head = enter_head(this.head, this.pending);
		let _head = current::replace_head(head);
		let _locals = this.locals.as_mut().map(LocalsGuard::enter);

		let Some(future) = this.future.as_mut().as_pin_mut() else {
			panic!("`Scoped` polled after completion");
		};
		let poll = future.poll(cx);
		if poll.is_ready() {
			// Drop the finished future while its context is still installed.
			this.future.set(None);
		}
		poll
	}
}
