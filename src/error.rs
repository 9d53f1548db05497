//! Bridge-level error types shared across the bootstrap, sign-in, and callback stages.

// self
use crate::_prelude::*;

/// Bridge-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical bridge error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; fatal to the subsystem, shown as a persistent status.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The provider client library never became available; fatal for this bootstrap.
	#[error(transparent)]
	Load(#[from] LoadError),
	/// A required form field failed validation before any network call.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// An error raised by the provider's own calls; shown as transient status text.
	#[error("Provider call failed: {reason}.")]
	Provider {
		/// Provider- or bridge-supplied reason string.
		reason: String,
	},
	/// A credential exchange succeeded but no session materialized; retryable.
	#[error("Sign-in completed but no session was returned.")]
	NoSession,
	/// A backend endpoint responded with a non-success status.
	#[error("Backend endpoint returned HTTP {status}.")]
	Backend {
		/// HTTP status code reported by the backend.
		status: u16,
	},
	/// A JSON payload could not be decoded into the expected shape.
	#[error("Response payload could not be decoded.")]
	Decode {
		/// Structured parsing failure with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl Error {
	/// Wraps a provider-reported failure inside [`Error::Provider`].
	pub fn provider(reason: impl Into<String>) -> Self {
		Self::Provider { reason: reason.into() }
	}
}

/// Configuration and validation failures raised while wiring the subsystem.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required provider configuration value resolved to an empty string.
	#[error("Provider configuration is missing `{field}`.")]
	Incomplete {
		/// Name of the missing configuration field.
		field: &'static str,
	},
	/// The resolved endpoint value is not a valid URL.
	#[error("Provider endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A redirect target could not be derived from the host origin.
	#[error("Redirect target is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Failures raised while provisioning the provider client library.
#[derive(Debug, ThisError)]
pub enum LoadError {
	/// The distribution artifact could not be fetched.
	#[error("Provider library fetch failed.")]
	FetchFailed {
		/// Underlying fetch failure.
		#[source]
		source: BoxError,
	},
	/// The artifact loaded but the library never reported itself present.
	#[error("Provider library never became ready after {polls} readiness checks.")]
	NeverBecameReady {
		/// Number of presence probes performed before giving up.
		polls: u32,
	},
}
impl LoadError {
	/// Wraps a fetcher-specific failure inside [`LoadError::FetchFailed`].
	pub fn fetch_failed(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::FetchFailed { source: Box::new(src) }
	}
}

/// Pre-network validation failures for user-supplied input.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// The sign-in identifier field was empty.
	#[error("An identifier is required to sign in.")]
	MissingIdentifier,
	/// The sign-in secret field was empty.
	#[error("A password is required to sign in.")]
	MissingSecret,
	/// A chat message was empty.
	#[error("A message is required.")]
	MissingMessage,
	/// An uploaded image payload was empty.
	#[error("An image is required.")]
	MissingImage,
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for Error {
	fn from(e: ReqwestError) -> Self {
		Self::Transport(e.into())
	}
}
