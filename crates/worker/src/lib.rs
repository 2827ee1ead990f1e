//! Task spawning for scopeline.
//!
//! Every spawn entry point takes an [`Inheritance`] choice: the new task
//! either shares the spawner's chain head (a single reference copy, taken
//! synchronously at the call site) or starts with no bindings. Mutable
//! [`TaskSlot`](scopeline_context::TaskSlot) state is never carried over.

mod budget;
mod class;
mod config;
mod error;
mod join_set;
mod runtime;
mod spawn;

pub use budget::{DrainBudget, DrainReport};
pub use class::TaskClass;
pub use config::WorkerConfig;
pub use error::{ConfigError, Result};
pub use join_set::WorkerJoinSet;
pub use runtime::WorkerRuntime;
pub use scopeline_context::Inheritance;
pub use spawn::{spawn, spawn_blocking, spawn_named_thread, spawn_thread};
