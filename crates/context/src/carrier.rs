use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::current;
use crate::lookup::Lookup;
use crate::task::{Scoped, TaskFrame};
use crate::variable::{Variable, VariableId};

pub(crate) type Erased = Arc<dyn Any + Send + Sync>;

/// One immutable binding frame.
///
/// Frames are never mutated after construction; a chain grows only by
/// allocating a new head that points at the previous one.
pub(crate) struct Carrier {
	variable: VariableId,
	name: &'static str,
	value: Erased,
	parent: Option<Arc<Carrier>>,
}

impl Drop for Carrier {
	fn drop(&mut self) {
		// Unlink uniquely owned ancestors one at a time so deep chains do not
		// recurse through nested `Arc` drops.
		let mut next = self.parent.take();
		while let Some(frame) = next {
			next = match Arc::into_inner(frame) {
				Some(mut owned) => owned.parent.take(),
				None => None,
			};
		}
	}
}

/// A reference to the head of a carrier chain.
///
/// A snapshot is what a task holds as "the bindings currently in effect".
/// Cloning copies one pointer; the frames themselves are shared and
/// immutable, so any number of tasks can read the same chain concurrently.
#[derive(Clone, Default)]
pub struct Snapshot {
	head: Option<Arc<Carrier>>,
}

impl Snapshot {
	/// Returns a snapshot with no bindings.
	pub const fn empty() -> Self {
		Self { head: None }
	}

	/// Returns the chain head of the calling task.
	pub fn capture() -> Self {
		current::head()
	}

	/// Returns true when no variable is bound.
	pub fn is_empty(&self) -> bool {
		self.head.is_none()
	}

	/// Returns the number of frames in the chain, shadowed ones included.
	pub fn depth(&self) -> usize {
		self.frames().count()
	}

	/// Returns true when both snapshots point at the same chain head.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		match (&self.head, &other.head) {
			(Some(a), Some(b)) => Arc::ptr_eq(a, b),
			(None, None) => true,
			_ => false,
		}
	}

	/// Looks up `variable` in this snapshot instead of the current task.
	pub fn get<T>(&self, variable: &Variable<T>) -> Lookup<T>
	where
		T: Send + Sync + 'static,
	{
		Lookup::resolve(self.find(variable.id()).cloned(), variable)
	}

	/// Runs `f` with this snapshot as the calling task's chain head.
	///
	/// The previous head is restored when `f` returns or unwinds.
	pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
		let _guard = current::replace_head(self.clone());
		f()
	}

	/// Wraps `future` so that every poll sees this snapshot as its chain head.
	pub fn scope<F>(self, future: F) -> Scoped<F>
	where
		F: Future,
	{
		Scoped::new(future, self, None)
	}

	/// Converts this snapshot into the initial frame of a new task.
	pub fn into_task(self) -> TaskFrame {
		TaskFrame::from_snapshot(self)
	}

	pub(crate) fn push(&self, variable: VariableId, name: &'static str, value: Erased) -> Self {
		Self {
			head: Some(Arc::new(Carrier {
				variable,
				name,
				value,
				parent: self.head.clone(),
			})),
		}
	}

	/// Walks from the innermost frame outwards and returns the first match.
	pub(crate) fn find(&self, variable: VariableId) -> Option<&Erased> {
		self.frames().find(|frame| frame.variable == variable).map(|frame| &frame.value)
	}

	fn frames(&self) -> impl Iterator<Item = &Carrier> {
		std::iter::successors(self.head.as_deref(), |frame| frame.parent.as_deref())
	}
}

impl fmt::Debug for Snapshot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.frames().map(|frame| frame.name)).finish()
	}
}
