//! Configuration source contracts and built-in key-value backends.

pub mod file;
pub mod memory;

pub use file::LocalStore;
pub use memory::MemoryStore;

// self
use crate::_prelude::*;

/// Read contract implemented by configuration sources.
///
/// Sources are consulted in priority order by
/// [`ConfigResolver`](crate::config::ConfigResolver); absence is represented as
/// [`None`], never as an error.
pub trait ConfigSource
where
	Self: Send + Sync,
{
	/// Returns the value stored under `key`, if any.
	fn get(&self, key: &str) -> Option<String>;
}

/// Error type produced by persistent store backends.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
