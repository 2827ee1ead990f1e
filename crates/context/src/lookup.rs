use std::sync::Arc;

use crate::carrier::Erased;
use crate::current;
use crate::error::{ContextError, Result};
use crate::variable::Variable;

/// Outcome of resolving a [`Variable`] against a carrier chain.
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<T> {
	/// The nearest binding in the chain.
	Bound(Arc<T>),
	/// No binding was found; the declared default was used.
	Default(Arc<T>),
	/// No binding was found and no default was declared.
	Unbound,
}

impl<T> Lookup<T>
where
	T: Send + Sync + 'static,
{
	pub(crate) fn resolve(found: Option<Erased>, variable: &Variable<T>) -> Self {
		if let Some(value) = found.and_then(|value| value.downcast::<T>().ok()) {
			return Self::Bound(value);
		}
		match variable.default_value() {
			Some(default) => Self::Default(default.resolve()),
			None => Self::Unbound,
		}
	}
}

impl<T> Lookup<T> {
	/// Returns the resolved value, bound or default.
	pub fn into_option(self) -> Option<Arc<T>> {
		match self {
			Self::Bound(value) | Self::Default(value) => Some(value),
			Self::Unbound => None,
		}
	}

	/// Returns true for an actual binding; defaults do not count.
	pub fn is_bound(&self) -> bool {
		matches!(self, Self::Bound(_))
	}
}

impl<T> Clone for Lookup<T> {
	fn clone(&self) -> Self {
		match self {
			Self::Bound(value) => Self::Bound(Arc::clone(value)),
			Self::Default(value) => Self::Default(Arc::clone(value)),
			Self::Unbound => Self::Unbound,
		}
	}
}

impl<T> Variable<T>
where
	T: Send + Sync + 'static,
{
	/// Resolves this variable in the calling task's chain.
	///
	/// Walks from the innermost binding outwards, so the cost grows with the
	/// number of active bindings, not with the number of declared variables.
	pub fn lookup(&self) -> Lookup<T> {
		Lookup::resolve(current::find(self.id()), self)
	}

	/// Returns the bound value, else the default, else `None`.
	pub fn get(&self) -> Option<Arc<T>> {
		self.lookup().into_option()
	}

	/// Returns true when the calling task has a binding for this variable.
	pub fn is_bound(&self) -> bool {
		current::find(self.id()).is_some()
	}

	/// Returns the resolved value or `fallback`.
	pub fn get_or(&self, fallback: T) -> Arc<T> {
		self.get().unwrap_or_else(|| Arc::new(fallback))
	}

	/// Returns the resolved value, treating absence as an error.
	pub fn require(&self) -> Result<Arc<T>> {
		self.get().ok_or(ContextError::Unbound { variable: self.name() })
	}

	/// Calls `f` with a reference to the resolved value, if any.
	pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
		let value = self.get();
		f(value.as_deref())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Bindings;

	#[test]
	fn unbound_without_default() {
		let var = Variable::<u32>::new().named("missing");
		assert_eq!(var.lookup(), Lookup::Unbound);
		assert_eq!(var.get(), None);
		assert!(!var.is_bound());
		assert_eq!(var.require(), Err(ContextError::Unbound { variable: "missing" }));
		assert_eq!(var.require().unwrap_err().to_string(), "context variable 'missing' is not bound");
	}

	#[test]
	fn default_used_when_unbound() {
		let var = Variable::with_default(5u32);
		assert_eq!(var.lookup(), Lookup::Default(Arc::new(5)));
		assert!(!var.is_bound());
		assert_eq!(*var.require().expect("default resolves"), 5);
	}

	#[test]
	fn binding_beats_default() {
		let var = Variable::with_default(5u32);
		var.run(9, || {
			assert_eq!(var.lookup(), Lookup::Bound(Arc::new(9)));
			assert!(var.is_bound());
		});
		assert_eq!(*var.get_or(0), 5);
	}

	#[test]
	fn get_or_uses_fallback() {
		let var = Variable::<String>::new();
		assert_eq!(*var.get_or("fallback".into()), "fallback");
		var.run("bound".into(), || assert_eq!(*var.get_or("fallback".into()), "bound"));
	}

	#[test]
	fn with_borrows_resolved_value() {
		let var = Variable::<Vec<u8>>::new();
		assert_eq!(var.with(|v| v.map(Vec::len)), None);
		Bindings::new().bind(&var, vec![1, 2, 3]).run(|| {
			assert_eq!(var.with(|v| v.map(Vec::len)), Some(3));
		});
	}

	#[test]
	fn with_callback_may_rebind() {
		let var = Variable::<u32>::new();
		var.run(1, || {
			var.with(|outer| {
				assert_eq!(outer, Some(&1));
				var.run(2, || assert_eq!(var.get().as_deref(), Some(&2)));
			});
		});
	}
}
