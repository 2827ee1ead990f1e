use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;

use crate::current;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SlotId(NonZeroU64);

impl SlotId {
	fn next() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(1);
		match NonZeroU64::new(NEXT.fetch_add(1, Ordering::Relaxed)) {
			Some(id) => Self(id),
			None => unreachable!("slot id counter wrapped"),
		}
	}
}

/// Mutable per-task slot storage.
///
/// Kept apart from the chain head: spawned tasks always start with an empty
/// map, and binding never reads or writes it.
#[derive(Default)]
pub(crate) struct LocalMap {
	slots: Option<FxHashMap<SlotId, Box<dyn Any + Send>>>,
}

impl LocalMap {
	pub(crate) const fn new() -> Self {
		Self { slots: None }
	}

	fn insert(&mut self, id: SlotId, value: Box<dyn Any + Send>) -> Option<Box<dyn Any + Send>> {
		self.slots.get_or_insert_with(FxHashMap::default).insert(id, value)
	}

	fn remove(&mut self, id: SlotId) -> Option<Box<dyn Any + Send>> {
		self.slots.as_mut()?.remove(&id)
	}

	fn get(&self, id: SlotId) -> Option<&(dyn Any + Send)> {
		self.slots.as_ref()?.get(&id).map(|value| &**value)
	}

	fn len(&self) -> usize {
		self.slots.as_ref().map_or(0, |slots| slots.len())
	}
}

impl fmt::Debug for LocalMap {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LocalMap").field("len", &self.len()).finish()
	}
}

/// A mutable variable private to each task.
///
/// Every task (and every thread outside a task) sees its own value. Unlike
/// [`Variable`](crate::Variable) bindings, slot values are never inherited by
/// spawned tasks and can be overwritten at any time.
pub struct TaskSlot<T> {
	id: SlotId,
	_marker: PhantomData<fn() -> T>,
}

impl<T> TaskSlot<T>
where
	T: Send + 'static,
{
	/// Creates a new slot, empty in every task.
	pub fn new() -> Self {
		Self {
			id: SlotId::next(),
			_marker: PhantomData,
		}
	}

	/// Stores `value` for the current task, returning the previous value.
	pub fn set(&self, value: T) -> Option<T> {
		let prev = current::with_locals(|locals| locals.insert(self.id, Box::new(value))).flatten();
		prev.and_then(|prev| prev.downcast::<T>().ok()).map(|prev| *prev)
	}

	/// Removes and returns the current task's value.
	pub fn take(&self) -> Option<T> {
		let prev = current::with_locals(|locals| locals.remove(self.id)).flatten();
		prev.and_then(|prev| prev.downcast::<T>().ok()).map(|prev| *prev)
	}

	/// Returns true when the current task holds a value.
	pub fn is_set(&self) -> bool {
		current::with_locals(|locals| locals.get(self.id).is_some()).unwrap_or(false)
	}

	/// Edits the current task's value in place.
	///
	/// The value is taken out while `f` runs, so `f` may use other slots or
	/// bind variables freely. Writes `f` makes to this same slot are
	/// overwritten by the value it leaves behind.
	pub fn update<R>(&self, f: impl FnOnce(&mut Option<T>) -> R) -> R {
		let mut value = self.take();
		let out = f(&mut value);
		match value {
			Some(value) => {
				drop(self.set(value));
			}
			None => {
				drop(self.take());
			}
		}
		out
	}
}

impl<T> TaskSlot<T>
where
	T: Clone + Send + 'static,
{
	/// Returns a clone of the current task's value.
	///
	/// The value is cloned outside slot storage, so its `Clone` impl may use
	/// other slots.
	pub fn get(&self) -> Option<T> {
		self.update(|value| value.clone())
	}
}

impl<T> Default for TaskSlot<T>
where
	T: Send + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<T> fmt::Debug for TaskSlot<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TaskSlot").field("id", &self.id.0).finish()
	}
}
