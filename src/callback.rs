//! OAuth implicit-flow redirect detection and consumption.
//!
//! The fragment is parsed into a typed [`FragmentKind`] up front so the rest of
//! the flow branches on a value instead of re-inspecting the raw string. The
//! fragment is scrubbed exactly once, immediately after a callback resolves
//! (success or error); the `Inconclusive` terminal branch leaves it intact as
//! diagnostic evidence for a manual retry.

// crates.io
use tokio::time;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	bridge::SessionBridge,
	client::ClientHandle,
	obs::{self, StageKind, StageOutcome, StageSpan},
	retry,
	session::Session,
	surface::{self, LANDING_PATH, StatusLevel, Surface},
};

/// Wait after detecting a token fragment, letting the client library finish
/// parsing the fragment internally before the first session query.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);
/// Wait before the one retried session query when the first returns nothing.
pub const SESSION_RETRY_DELAY: Duration = Duration::from_millis(1000);
/// Session queries performed per callback: the initial one plus one retry.
const SESSION_QUERIES: u32 = 2;

/// Typed classification of a raw URL fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FragmentKind {
	/// Neither an access-token marker nor an error marker is present.
	NotACallback,
	/// The provider reported an error; the value is already URL-decoded.
	Error(String),
	/// The provider returned an access token.
	AccessToken,
}

/// Classifies a fragment (with or without its leading `#`).
///
/// The grammar is `&`-separated pairs; an error marker takes precedence over an
/// access-token marker so provider-reported failures are never misread as
/// half-finished sign-ins.
pub fn classify_fragment(fragment: &str) -> FragmentKind {
	let raw = fragment.strip_prefix('#').unwrap_or(fragment);
	let mut has_token = false;
	let mut error = None;

	for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
		match &*key {
			"error" if error.is_none() => error = Some(value.into_owned()),
			"access_token" => has_token = true,
			_ => {},
		}
	}

	if let Some(message) = error {
		FragmentKind::Error(message)
	} else if has_token {
		FragmentKind::AccessToken
	} else {
		FragmentKind::NotACallback
	}
}

/// Outcome of one callback-detection pass; produced exactly once per bootstrap.
#[derive(Debug)]
pub enum CallbackOutcome {
	/// The current location is not an OAuth callback.
	NotACallback,
	/// The provider redirected back with an error message.
	ErrorCallback(String),
	/// A session was recovered and handed to the session bridge.
	SessionEstablished(Session),
	/// The fragment carried a token but no session materialized; soft failure,
	/// fragment preserved for a manual retry.
	Inconclusive,
}

/// Detects and consumes an OAuth redirect fragment on the host surface.
#[derive(Clone)]
pub struct CallbackHandler {
	surface: Arc<dyn Surface>,
	bridge: SessionBridge,
}
impl CallbackHandler {
	/// Creates a handler over the host surface and session bridge.
	pub fn new(surface: Arc<dyn Surface>, bridge: SessionBridge) -> Self {
		Self { surface, bridge }
	}

	/// Runs the callback state machine once.
	pub async fn detect_and_handle(&self, client: &ClientHandle) -> CallbackOutcome {
		const KIND: StageKind = StageKind::Callback;

		let Some(raw) = self.surface.fragment() else {
			return CallbackOutcome::NotACallback;
		};
		let kind = classify_fragment(&raw);

		if kind == FragmentKind::NotACallback {
			return CallbackOutcome::NotACallback;
		}

		let span = StageSpan::new(KIND, "detect_and_handle");

		obs::record_stage_outcome(KIND, StageOutcome::Attempt);

		let outcome = span
			.instrument(async {
				match kind {
					FragmentKind::NotACallback => CallbackOutcome::NotACallback,
					FragmentKind::Error(message) => self.resolve_error(message),
					FragmentKind::AccessToken => self.resolve_token_callback(client).await,
				}
			})
			.await;

		match &outcome {
			CallbackOutcome::SessionEstablished(_) =>
				obs::record_stage_outcome(KIND, StageOutcome::Success),
			_ => obs::record_stage_outcome(KIND, StageOutcome::Failure),
		}

		outcome
	}

	fn resolve_error(&self, message: String) -> CallbackOutcome {
		self.surface.scrub_fragment();
		self.surface.show_status(StatusLevel::Error, &format!("Sign-in failed: {message}."));

		CallbackOutcome::ErrorCallback(message)
	}

	async fn resolve_token_callback(&self, client: &ClientHandle) -> CallbackOutcome {
		time::sleep(SETTLE_DELAY).await;

		let queried = retry::poll_until(SESSION_QUERIES, SESSION_RETRY_DELAY, || {
			client.current_session()
		})
		.await;

		match queried {
			Ok(Some(session)) => {
				self.bridge.persist(&session).await;
				self.surface.scrub_fragment();
				self.surface.show_status(StatusLevel::Info, "Signed in. Redirecting...");
				surface::redirect_soon(self.surface.as_ref(), LANDING_PATH).await;

				CallbackOutcome::SessionEstablished(session)
			},
			Ok(None) => {
				self.surface.show_status(
					StatusLevel::Error,
					"Sign-in could not be confirmed yet. Please try again.",
				);

				CallbackOutcome::Inconclusive
			},
			Err(e) => self.resolve_error(e.to_string()),
		}
	}
}
impl Debug for CallbackHandler {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("CallbackHandler(..)")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn fragments_without_markers_are_not_callbacks() {
		assert_eq!(classify_fragment(""), FragmentKind::NotACallback);
		assert_eq!(classify_fragment("#"), FragmentKind::NotACallback);
		assert_eq!(classify_fragment("section-2"), FragmentKind::NotACallback);
		assert_eq!(classify_fragment("foo=bar&baz=qux"), FragmentKind::NotACallback);
	}

	#[test]
	fn error_markers_are_decoded() {
		assert_eq!(
			classify_fragment("#error=access_denied"),
			FragmentKind::Error("access_denied".into())
		);
		assert_eq!(
			classify_fragment("error=user%20cancelled%20the%20request"),
			FragmentKind::Error("user cancelled the request".into())
		);
	}

	#[test]
	fn error_markers_take_precedence_over_token_markers() {
		assert_eq!(
			classify_fragment("access_token=abc123&error=server_error"),
			FragmentKind::Error("server_error".into())
		);
	}

	#[test]
	fn token_markers_classify_as_access_token() {
		assert_eq!(
			classify_fragment("#access_token=abc123&token_type=bearer&expires_in=3600"),
			FragmentKind::AccessToken
		);
	}
}
