//! Thread-safe in-memory [`ConfigSource`] for host globals, tests, and demos.

// self
use crate::{_prelude::*, store::ConfigSource};

type SourceMap = Arc<RwLock<HashMap<String, String>>>;

/// In-process key-value source.
///
/// Doubles as the "host globals" layer of config resolution and as a scripted
/// source in tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SourceMap);
impl MemoryStore {
	/// Stores `value` under `key`, replacing any previous value.
	pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
		self.0.write().insert(key.into(), value.into());
	}

	/// Removes the value stored under `key`, if any.
	pub fn unset(&self, key: &str) {
		self.0.write().remove(key);
	}
}
impl ConfigSource for MemoryStore {
	fn get(&self, key: &str) -> Option<String> {
		self.0.read().get(key).cloned()
	}
}
impl FromIterator<(String, String)> for MemoryStore {
	fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
		Self(Arc::new(RwLock::new(iter.into_iter().collect())))
	}
}
