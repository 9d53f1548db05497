//! User-triggered sign-in flows: provider redirect and direct credentials.
//!
//! Handlers absorb every failure at their boundary and convert it to
//! user-visible status text; nothing propagates to the host uncaught.

// self
use crate::{
	_prelude::*,
	bridge::SessionBridge,
	client::{ClientHandle, Credentials},
	error::ConfigError,
	obs::{self, StageKind, StageOutcome, StageSpan},
	session::Session,
	surface::{self, LANDING_PATH, SIGN_IN_PATH, StatusLevel, Surface},
};

/// Sign-in entry points wired up at the end of a successful bootstrap.
#[derive(Clone)]
pub struct SignInHandlers {
	client: ClientHandle,
	surface: Arc<dyn Surface>,
	bridge: SessionBridge,
}
impl SignInHandlers {
	/// Wires handlers over the shared client, host surface, and session bridge.
	pub fn new(client: ClientHandle, surface: Arc<dyn Surface>, bridge: SessionBridge) -> Self {
		Self { client, surface, bridge }
	}

	/// Starts a provider redirect for a named external identity source.
	///
	/// The navigation is expected to leave the page; an error raised before
	/// navigation is shown as transient status text, not treated as fatal.
	pub async fn sign_in_with_redirect(&self, identity_source: &str) {
		match self.begin_redirect(identity_source).await {
			Ok(authorize_url) => self.surface.navigate(authorize_url.as_str()),
			Err(e) => self.surface.show_status(
				StatusLevel::Error,
				&format!("Could not start provider sign-in: {e}"),
			),
		}
	}

	/// Submits credentials directly, persisting and redirecting on success.
	pub async fn sign_in_with_password(&self, credentials: &Credentials) {
		const KIND: StageKind = StageKind::SignIn;

		// Validation happens before any network call.
		if let Err(e) = credentials.validate() {
			self.surface.show_status(StatusLevel::Error, &e.to_string());

			return;
		}

		let span = StageSpan::new(KIND, "sign_in_with_password");

		obs::record_stage_outcome(KIND, StageOutcome::Attempt);

		let exchanged = span.instrument(self.exchange(credentials)).await;

		match exchanged {
			Ok(session) => {
				obs::record_stage_outcome(KIND, StageOutcome::Success);
				self.bridge.persist(&session).await;
				self.surface.show_status(StatusLevel::Info, "Signed in. Redirecting...");
				surface::redirect_soon(self.surface.as_ref(), LANDING_PATH).await;
			},
			Err(e) => {
				obs::record_stage_outcome(KIND, StageOutcome::Failure);
				self.surface.show_status(StatusLevel::Error, &e.to_string());
			},
		}
	}

	async fn begin_redirect(&self, identity_source: &str) -> Result<Url> {
		let redirect_to = self
			.surface
			.origin()
			.join(SIGN_IN_PATH)
			.map_err(|source| ConfigError::InvalidRedirect { source })?;

		self.client.authorize_url(identity_source, &redirect_to).await
	}

	/// Resolves a session from the immediate exchange response or, when that
	/// is absent, from a follow-up session query.
	async fn exchange(&self, credentials: &Credentials) -> Result<Session> {
		if let Some(session) = self.client.sign_in_with_password(credentials).await? {
			return Ok(session);
		}
		if let Some(session) = self.client.current_session().await? {
			return Ok(session);
		}

		Err(Error::NoSession)
	}
}
impl Debug for SignInHandlers {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("SignInHandlers(..)")
	}
}
