//! Execution registers of the task running on this thread.
//!
//! `HEAD` holds the chain head and `LOCALS` the mutable slot storage of
//! whichever task is being run right now. Task wrappers swap their own state
//! in before running and back out afterwards, so the registers describe the
//! task, not the thread.

use std::cell::RefCell;

use crate::carrier::{Erased, Snapshot};
use crate::local::LocalMap;
use crate::variable::VariableId;

thread_local! {
	static HEAD: RefCell<Snapshot> = const { RefCell::new(Snapshot::empty()) };
	static LOCALS: RefCell<LocalMap> = const { RefCell::new(LocalMap::new()) };
}

/// Returns a copy of the current chain head reference.
pub(crate) fn head() -> Snapshot {
	HEAD.try_with(|head| head.borrow().clone()).unwrap_or_default()
}

/// Looks up one variable in the current chain without cloning the head.
pub(crate) fn find(variable: VariableId) -> Option<Erased> {
	HEAD.try_with(|head| head.borrow().find(variable).cloned()).ok().flatten()
}

/// Restores the previous chain head on drop.
#[must_use]
pub(crate) struct HeadGuard {
	prev: Option<Snapshot>,
}

impl Drop for HeadGuard {
	fn drop(&mut self) {
		if let Some(prev) = self.prev.take() {
			// The replaced chain may release the last reference to user values,
			// whose destructors are free to read context again.
			let exited = HEAD.try_with(|head| std::mem::replace(&mut *head.borrow_mut(), prev));
			drop(exited);
		}
	}
}

/// Installs `next` as the chain head until the returned guard drops.
pub(crate) fn replace_head(next: Snapshot) -> HeadGuard {
	let prev = HEAD.try_with(|head| std::mem::replace(&mut *head.borrow_mut(), next)).ok();
	HeadGuard { prev }
}

/// Keeps a task's slot storage installed while alive.
///
/// Entering swaps the task's map with the register; dropping swaps it back,
/// carrying any writes made in between into the task's map.
pub(crate) struct LocalsGuard<'a> {
	slot: &'a mut LocalMap,
	entered: bool,
}

impl<'a> LocalsGuard<'a> {
	pub(crate) fn enter(slot: &'a mut LocalMap) -> Self {
		let entered = LOCALS.try_with(|locals| std::mem::swap(&mut *locals.borrow_mut(), slot)).is_ok();
		Self { slot, entered }
	}
}

impl Drop for LocalsGuard<'_> {
	fn drop(&mut self) {
		if self.entered {
			let _ = LOCALS.try_with(|locals| std::mem::swap(&mut *locals.borrow_mut(), self.slot));
		}
	}
}

/// Runs `f` against the current task's slot storage.
///
/// `f` must not re-enter slot storage or drop slot values; the register stays
/// borrowed while it runs.
pub(crate) fn with_locals<R>(f: impl FnOnce(&mut LocalMap) -> R) -> Option<R> {
	LOCALS.try_with(|locals| f(&mut locals.borrow_mut())).ok()
}
