use std::future::Future;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::carrier::{Erased, Snapshot};
use crate::current;
use crate::lookup::Lookup;
use crate::task::Scoped;
use crate::variable::{Variable, VariableId};

struct Binding {
	variable: VariableId,
	name: &'static str,
	value: Erased,
}

/// An ordered set of variable bindings waiting to be entered.
///
/// Pairs are applied left to right, so a variable bound twice in one set
/// resolves to its last value, exactly as if the binds were nested.
///
/// ```
/// use scopeline_context::{Bindings, Variable};
///
/// let depth = Variable::<u32>::new();
/// let tag = Variable::<&'static str>::new();
///
/// let seen = Bindings::new().bind(&depth, 1).bind(&tag, "a").bind(&depth, 2).run(|| (*depth.get().unwrap(), *tag.get().unwrap()));
/// assert_eq!(seen, (2, "a"));
/// assert!(depth.get().is_none());
/// ```
#[derive(Default)]
#[must_use = "bindings do nothing until run or scoped"]
pub struct Bindings {
	pending: SmallVec<[Binding; 2]>,
}

impl Bindings {
	/// Creates an empty set; running it leaves the context unchanged.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends one binding.
	pub fn bind<T>(mut self, variable: &Variable<T>, value: T) -> Self
	where
		T: Send + Sync + 'static,
	{
		self.pending.push(Binding {
			variable: variable.id(),
			name: variable.name(),
			value: Arc::new(value),
		});
		self
	}

	/// Returns the number of pending bindings, duplicates included.
	pub fn len(&self) -> usize {
		self.pending.len()
	}

	/// Returns true when no binding is pending.
	pub fn is_empty(&self) -> bool {
		self.pending.is_empty()
	}

	/// Looks up `variable` among the pending bindings only.
	///
	/// The calling task's context is not consulted; an absent variable
	/// resolves to its default or [`Lookup::Unbound`].
	pub fn get<T>(&self, variable: &Variable<T>) -> Lookup<T>
	where
		T: Send + Sync + 'static,
	{
		let found = self.pending.iter().rev().find(|binding| binding.variable == variable.id()).map(|binding| Arc::clone(&binding.value));
		Lookup::resolve(found, variable)
	}

	/// Runs `body` with these bindings in effect for the calling task.
	///
	/// Whatever `body` returns, including an `Err`, is handed back after the
	/// previous bindings are restored. A panic unwinding out of `body` restores
	/// them as well.
	pub fn run<R>(self, body: impl FnOnce() -> R) -> R {
		if self.pending.is_empty() {
			return body();
		}
		let head = self.extend(current::head());
		let _guard = current::replace_head(head);
		body()
	}

	/// Wraps `future` so that it runs with these bindings in effect.
	///
	/// The bindings extend the chain of whichever task first polls the
	/// returned future, as it is at that first poll, and the resulting head is
	/// installed around every later poll. They are never visible to the task
	/// between polls.
	pub fn scope<F>(self, future: F) -> Scoped<F>
	where
		F: Future,
	{
		Scoped::pending(future, self)
	}

	/// Pushes every pending binding onto `base`, left to right.
	pub(crate) fn extend(self, base: Snapshot) -> Snapshot {
		let pushed = self.pending.len();
		let head = self.pending.into_iter().fold(base, |head, binding| head.push(binding.variable, binding.name, binding.value));
		tracing::trace!(pushed, depth = head.depth(), "context.bind");
		head
	}
}

impl<T> Variable<T>
where
	T: Send + Sync + 'static,
{
	/// Starts a [`Bindings`] set with this variable bound to `value`.
	pub fn bind(&self, value: T) -> Bindings {
		Bindings::new().bind(self, value)
	}

	/// Runs `body` with this variable bound to `value`.
	pub fn run<R>(&self, value: T, body: impl FnOnce() -> R) -> R {
		self.bind(value).run(body)
	}

	/// Wraps `future` so that it runs with this variable bound to `value`.
	pub fn scope<F>(&self, value: T, future: F) -> Scoped<F>
	where
		F: Future,
	{
		self.bind(value).scope(future)
	}
}
