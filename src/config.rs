//! Provider configuration resolution from layered host sources.

// self
use crate::{_prelude::*, error::ConfigError, store::ConfigSource};

/// Source key for the provider endpoint URL.
pub const ENDPOINT_URL_KEY: &str = "endpoint_url";
/// Source key for the provider public (anon) key.
pub const PUBLIC_KEY_KEY: &str = "public_key";

/// Immutable provider configuration consumed by the client factory.
///
/// Either field resolving to an empty string degrades the whole subsystem to a
/// disabled, status-reporting no-op.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
	/// Base URL of the hosted identity provider.
	pub endpoint_url: String,
	/// Public API key presented by the client library.
	pub public_key: String,
}
impl ProviderConfig {
	/// Returns `true` when both required fields are non-empty.
	pub fn is_complete(&self) -> bool {
		!self.endpoint_url.is_empty() && !self.public_key.is_empty()
	}

	/// Names the first missing field, if any.
	pub fn missing_field(&self) -> Option<&'static str> {
		if self.endpoint_url.is_empty() {
			Some(ENDPOINT_URL_KEY)
		} else if self.public_key.is_empty() {
			Some(PUBLIC_KEY_KEY)
		} else {
			None
		}
	}

	/// Parses the endpoint URL for callers that need a typed value.
	pub fn endpoint(&self) -> Result<Url, ConfigError> {
		Url::parse(&self.endpoint_url).map_err(|source| ConfigError::InvalidEndpoint { source })
	}
}

/// Derives [`ProviderConfig`] from process-wide configuration sources.
///
/// Sources are consulted in registration order; the first non-empty value for a
/// key wins, so host globals shadow the local persisted store. Resolution is
/// pure and infallible: absence is represented as an empty string.
#[derive(Clone, Default)]
pub struct ConfigResolver {
	sources: Vec<Arc<dyn ConfigSource>>,
}
impl ConfigResolver {
	/// Creates a resolver with no sources; `resolve` yields empty fields.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a source at the lowest priority registered so far.
	pub fn with_source(mut self, source: Arc<dyn ConfigSource>) -> Self {
		self.sources.push(source);

		self
	}

	/// Resolves the provider configuration, falling back to empty strings.
	pub fn resolve(&self) -> ProviderConfig {
		ProviderConfig {
			endpoint_url: self.lookup(ENDPOINT_URL_KEY),
			public_key: self.lookup(PUBLIC_KEY_KEY),
		}
	}

	fn lookup(&self, key: &str) -> String {
		self.sources
			.iter()
			.find_map(|source| source.get(key).filter(|value| !value.is_empty()))
			.unwrap_or_default()
	}
}
impl Debug for ConfigResolver {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConfigResolver").field("sources", &self.sources.len()).finish()
	}
}
