//! Provider-issued session payloads and the auth-state event stream.

// crates.io
use serde_json::Value;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
// self
use crate::_prelude::*;

/// Payload fields probed for a bearer token, in priority order.
///
/// The alias and relay fields tolerate schema drift across provider library
/// versions; do not extend this list without evidence of a new variant.
const TOKEN_FIELDS: [&str; 3] = ["access_token", "accessToken", "provider_token"];

/// Redacted bearer token wrapper keeping credential material out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);
impl AccessToken {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for AccessToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AccessToken").field(&"<redacted>").finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Provider-issued proof of authentication.
///
/// Sessions are transient: they are never persisted client-side, and their only
/// durable effect is the bearer-token POST performed by
/// [`SessionBridge`](crate::bridge::SessionBridge).
#[derive(Clone)]
pub struct Session {
	raw: Value,
}
impl Session {
	/// Wraps a provider-specific session payload.
	pub fn new(raw: Value) -> Self {
		Self { raw }
	}

	/// Decodes a session payload from raw JSON bytes.
	pub fn from_slice(bytes: &[u8]) -> Result<Self> {
		let mut deserializer = serde_json::Deserializer::from_slice(bytes);
		let raw = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::Decode { source })?;

		Ok(Self::new(raw))
	}

	/// Extracts the bearer token from the payload, probing the primary, alias,
	/// and provider-relay fields in that priority order.
	pub fn bearer_token(&self) -> Option<AccessToken> {
		TOKEN_FIELDS.iter().find_map(|field| {
			self.raw
				.get(field)
				.and_then(Value::as_str)
				.filter(|value| !value.is_empty())
				.map(AccessToken::new)
		})
	}

	/// Returns the provider-specific payload.
	pub fn raw(&self) -> &Value {
		&self.raw
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("bearer_token_present", &self.bearer_token().is_some())
			.finish()
	}
}

/// Auth-state notifications emitted by the provider after initial load.
#[derive(Clone, Debug)]
pub enum AuthEvent {
	/// The provider established a session.
	SignedIn(Session),
	/// The provider cleared its session.
	SignedOut,
}

/// Receiving half of the provider's unbounded auth-state stream.
pub type AuthEventStream = UnboundedReceiver<AuthEvent>;
/// Sending half used by provider client implementations.
pub type AuthEventSender = UnboundedSender<AuthEvent>;

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn token_formatters_redact() {
		let token = AccessToken::new("super-secret");

		assert_eq!(format!("{token:?}"), "AccessToken(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");
	}

	#[test]
	fn bearer_token_probes_fields_in_priority_order() {
		let session = Session::new(json!({
			"provider_token": "relay",
			"accessToken": "alias",
			"access_token": "primary",
		}));

		assert_eq!(session.bearer_token().map(|t| t.expose().to_owned()), Some("primary".into()));

		let alias_only = Session::new(json!({ "accessToken": "alias", "provider_token": "relay" }));

		assert_eq!(alias_only.bearer_token().map(|t| t.expose().to_owned()), Some("alias".into()));

		let relay_only = Session::new(json!({ "provider_token": "relay" }));

		assert_eq!(relay_only.bearer_token().map(|t| t.expose().to_owned()), Some("relay".into()));
	}

	#[test]
	fn empty_or_missing_token_fields_yield_none() {
		assert!(Session::new(json!({})).bearer_token().is_none());
		assert!(Session::new(json!({ "access_token": "" })).bearer_token().is_none());
		assert!(Session::new(json!({ "access_token": 42 })).bearer_token().is_none());
	}

	#[test]
	fn session_debug_omits_payload() {
		let session = Session::new(json!({ "access_token": "abc123" }));

		assert!(!format!("{session:?}").contains("abc123"));
	}

	#[test]
	fn from_slice_reports_decode_failures() {
		let err = Session::from_slice(b"{ not json").expect_err("Malformed JSON should fail.");

		assert!(matches!(err, Error::Decode { .. }));
	}
}
