//! Scoped context variables for tasks.
//!
//! A [`Variable`] names a slot of implicit, read-mostly context. Values are
//! attached to it for the dynamic extent of a unit of work with
//! [`Bindings::run`] (or [`Bindings::scope`] for futures), and any callee
//! inside that extent reads them back with [`Variable::get`].
//!
//! The set of live bindings of a task is an immutable, reference-counted
//! chain of carrier frames. Binding pushes a new head that points at the
//! previous one; leaving the extent only repoints the task's head back. A
//! spawned task inherits its parent's context by copying that single head
//! reference (see [`TaskFrame`] and [`Inheritance`]), so inheritance costs
//! the same no matter how many values are bound.
//!
//! ```
//! use std::sync::LazyLock;
//!
//! use scopeline_context::Variable;
//!
//! static USER: LazyLock<Variable<String>> = LazyLock::new(|| Variable::new().named("user"));
//!
//! fn greet() -> String {
//! 	match USER.get() {
//! 		Some(user) => format!("hello {user}"),
//! 		None => "hello stranger".to_string(),
//! 	}
//! }
//!
//! assert_eq!(USER.run("ada".to_string(), greet), "hello ada");
//! assert_eq!(greet(), "hello stranger");
//! ```
//!
//! Mutable per-task state lives in [`TaskSlot`], a separate facility that is
//! never inherited and never interacts with bindings.

mod bind;
mod carrier;
mod current;
mod error;
mod local;
mod lookup;
mod task;
mod variable;

pub use bind::Bindings;
pub use carrier::Snapshot;
pub use error::{ContextError, Result};
pub use local::TaskSlot;
pub use lookup::Lookup;
pub use task::{Inheritance, Scoped, TaskFrame};
pub use variable::{Variable, VariableId};
