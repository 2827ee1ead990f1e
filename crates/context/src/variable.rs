use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::NonZeroU64;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

const ANONYMOUS: &str = "<anonymous>";

/// Process-unique identity of one [`Variable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(NonZeroU64);

impl VariableId {
	fn next() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(1);
		let raw = NEXT.fetch_add(1, Ordering::Relaxed);
		match NonZeroU64::new(raw) {
			Some(id) => Self(id),
			None => unreachable!("variable id counter wrapped"),
		}
	}

	/// Returns the raw numeric identity.
	pub const fn get(self) -> u64 {
		self.0.get()
	}
}

pub(crate) enum DefaultValue<T> {
	Value(Arc<T>),
	Supplier(Arc<dyn Fn() -> T + Send + Sync>),
}

impl<T> Clone for DefaultValue<T> {
	fn clone(&self) -> Self {
		match self {
			Self::Value(value) => Self::Value(Arc::clone(value)),
			Self::Supplier(supplier) => Self::Supplier(Arc::clone(supplier)),
		}
	}
}

impl<T> DefaultValue<T> {
	pub(crate) fn resolve(&self) -> Arc<T> {
		match self {
			Self::Value(value) => Arc::clone(value),
			Self::Supplier(supplier) => Arc::new(supplier()),
		}
	}
}

/// An opaque key identifying one slot of scoped context.
///
/// A variable holds no value of its own. Values are attached to it for the
/// extent of a unit of work with [`Variable::scope`] or
/// [`Bindings`](crate::Bindings) and read back with [`Variable::get`].
///
/// Identity is fixed at construction: clones refer to the same slot, while
/// two separately constructed variables never match, even when their types,
/// names and defaults are equal.
pub struct Variable<T> {
	id: VariableId,
	name: &'static str,
	default: Option<DefaultValue<T>>,
}

impl<T> Variable<T>
where
	T: Send + Sync + 'static,
{
	/// Declares a new variable without a default.
	pub fn new() -> Self {
		Self {
			id: VariableId::next(),
			name: ANONYMOUS,
			default: None,
		}
	}

	/// Declares a new variable that resolves to `value` when unbound.
	pub fn with_default(value: T) -> Self {
		Self {
			id: VariableId::next(),
			name: ANONYMOUS,
			default: Some(DefaultValue::Value(Arc::new(value))),
		}
	}

	/// Declares a new variable whose unbound lookups call `supplier`.
	///
	/// The supplier runs on every unresolved lookup; results are not cached.
	pub fn with_default_fn(supplier: impl Fn() -> T + Send + Sync + 'static) -> Self {
		Self {
			id: VariableId::next(),
			name: ANONYMOUS,
			default: Some(DefaultValue::Supplier(Arc::new(supplier))),
		}
	}

	/// Sets the diagnostic name used in logs and errors.
	#[must_use]
	pub fn named(mut self, name: &'static str) -> Self {
		self.name = name;
		self
	}
}

impl<T> Variable<T> {
	/// Returns the identity of this variable.
	pub const fn id(&self) -> VariableId {
		self.id
	}

	/// Returns the diagnostic name.
	pub const fn name(&self) -> &'static str {
		self.name
	}

	/// Returns true when a default value or supplier was declared.
	pub const fn has_default(&self) -> bool {
		self.default.is_some()
	}

	pub(crate) fn default_value(&self) -> Option<&DefaultValue<T>> {
		self.default.as_ref()
	}
}

impl<T> Default for Variable<T>
where
	T: Send + Sync + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<T> Clone for Variable<T> {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			name: self.name,
			default: self.default.clone(),
		}
	}
}

impl<T> PartialEq for Variable<T> {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl<T> Eq for Variable<T> {}

impl<T> Hash for Variable<T> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl<T> fmt::Debug for Variable<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Variable")
			.field("id", &self.id.get())
			.field("name", &self.name)
			.field("has_default", &self.default.is_some())
			.finish()
	}
}
