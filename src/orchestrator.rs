//! Page-load sequencing: config, library, client, callback, session, listener.
//!
//! The bootstrap order is strict: the library load completes before client
//! construction, callback handling completes before the existing-session
//! check, and the listener is installed last so it cannot race the initial
//! checks. A resolved callback (`SessionEstablished` or `ErrorCallback`)
//! short-circuits the rest of initialization; `NotACallback` and
//! `Inconclusive` let it continue.

// self
use crate::{
	_prelude::*,
	bridge::SessionBridge,
	callback::{CallbackHandler, CallbackOutcome},
	client::{ClientFactory, ClientHandle, ProviderLibrary, SharedClientSlot},
	config::ConfigResolver,
	listener::AuthStateListener,
	loader::{LibraryFetcher, Loader},
	obs::{self, StageKind, StageOutcome, StageSpan},
	signin::SignInHandlers,
	surface::{LANDING_PATH, SIGN_IN_PATH, StatusLevel, Surface},
};

/// Outcome of one bootstrap pass.
#[derive(Debug)]
pub enum Bootstrap {
	/// The subsystem degraded to a disabled, status-reporting no-op; sign-in
	/// controls stay inert while unrelated page features keep working.
	Disabled,
	/// An OAuth callback fully resolved; no handlers were wired because the
	/// page is either navigating away or reporting the provider's error.
	CallbackResolved(CallbackOutcome),
	/// Normal path: the client is published and the UI triggers are wired.
	Ready(Ready),
}

/// Wired handles returned by a completed bootstrap.
pub struct Ready {
	/// The shared client handle built for this bootstrap.
	pub client: ClientHandle,
	/// Sign-in entry points for the host to hook to its UI triggers.
	pub handlers: SignInHandlers,
	/// Standing auth-state subscription; the host drives or spawns `run`.
	pub listener: AuthStateListener,
}
impl Debug for Ready {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Ready(..)")
	}
}

/// Sequences the authentication subsystem at page load.
pub struct Orchestrator {
	resolver: ConfigResolver,
	fetcher: Arc<dyn LibraryFetcher>,
	library: Arc<dyn ProviderLibrary>,
	surface: Arc<dyn Surface>,
	bridge: SessionBridge,
	slot: SharedClientSlot,
}
impl Orchestrator {
	/// Assembles an orchestrator from the host's collaborators.
	pub fn new(
		resolver: ConfigResolver,
		fetcher: Arc<dyn LibraryFetcher>,
		library: Arc<dyn ProviderLibrary>,
		surface: Arc<dyn Surface>,
		bridge: SessionBridge,
	) -> Self {
		Self { resolver, fetcher, library, surface, bridge, slot: SharedClientSlot::default() }
	}

	/// Shared slot that later-initialized host modules read the client from.
	pub fn shared_client(&self) -> &SharedClientSlot {
		&self.slot
	}

	/// Runs the bootstrap sequence once.
	pub async fn bootstrap(&self) -> Bootstrap {
		const KIND: StageKind = StageKind::Bootstrap;

		let span = StageSpan::new(KIND, "bootstrap");

		obs::record_stage_outcome(KIND, StageOutcome::Attempt);

		let outcome = span.instrument(self.run_sequence()).await;

		match &outcome {
			Bootstrap::Ready(_)
			| Bootstrap::CallbackResolved(CallbackOutcome::SessionEstablished(_)) =>
				obs::record_stage_outcome(KIND, StageOutcome::Success),
			_ => obs::record_stage_outcome(KIND, StageOutcome::Failure),
		}

		outcome
	}

	async fn run_sequence(&self) -> Bootstrap {
		let config = self.resolver.resolve();

		// Invalid config disables the subsystem before any network access.
		if let Some(field) = config.missing_field() {
			obs::note_soft_failure(StageKind::Bootstrap, &format!("missing config field {field}"));
			self.surface.show_status(
				StatusLevel::Error,
				"Authentication is not configured. Sign-in is unavailable.",
			);

			return Bootstrap::Disabled;
		}

		if let Err(e) = Loader::new(self.fetcher.clone()).ensure_loaded().await {
			obs::note_soft_failure(StageKind::Bootstrap, &e.to_string());
			self.surface.show_status(
				StatusLevel::Error,
				"Authentication library failed to load. Sign-in is unavailable.",
			);

			return Bootstrap::Disabled;
		}

		let client = match ClientFactory::build(&config, self.library.as_ref(), &self.slot) {
			Ok(client) => client,
			Err(e) => {
				obs::note_soft_failure(StageKind::Bootstrap, &e.to_string());
				self.surface.show_status(
					StatusLevel::Error,
					"Authentication could not be initialized. Sign-in is unavailable.",
				);

				return Bootstrap::Disabled;
			},
		};
		let callback = CallbackHandler::new(self.surface.clone(), self.bridge.clone());

		match callback.detect_and_handle(&client).await {
			outcome @ (CallbackOutcome::SessionEstablished(_)
			| CallbackOutcome::ErrorCallback(_)) => return Bootstrap::CallbackResolved(outcome),
			CallbackOutcome::NotACallback | CallbackOutcome::Inconclusive => {},
		}

		self.reconcile_existing_session(&client).await;

		// Installed last so it cannot race the initial checks.
		let listener = AuthStateListener::install(&client, self.surface.clone(), self.bridge.clone());
		let handlers =
			SignInHandlers::new(client.clone(), self.surface.clone(), self.bridge.clone());

		Bootstrap::Ready(Ready { client, handlers, listener })
	}

	async fn reconcile_existing_session(&self, client: &ClientHandle) {
		match client.current_session().await {
			Ok(Some(session)) => {
				self.bridge.persist(&session).await;

				if self.surface.current_path() == SIGN_IN_PATH {
					self.surface.navigate(LANDING_PATH);
				}
			},
			Ok(None) => {},
			// An unreachable provider at this point is not fatal; the user can
			// still trigger a sign-in manually.
			Err(e) => obs::note_soft_failure(StageKind::Bootstrap, &e.to_string()),
		}
	}
}
impl Debug for Orchestrator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Orchestrator").field("slot", &self.slot).finish()
	}
}
