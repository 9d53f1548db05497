//! Standing subscription to the provider's auth-state stream.

// self
use crate::{
	_prelude::*,
	bridge::SessionBridge,
	client::ClientHandle,
	session::{AuthEvent, AuthEventStream},
	surface::{LANDING_PATH, SIGN_IN_PATH, Surface},
};

/// Reacts to provider-side sign-in and sign-out notifications emitted after
/// initial load.
///
/// The subscription lives for the host's lifetime; no unsubscribe path exists
/// in this scope. Hosts that outlive a single page (in-app navigation) should
/// drop the running future to detach.
pub struct AuthStateListener {
	events: AuthEventStream,
	surface: Arc<dyn Surface>,
	bridge: SessionBridge,
}
impl AuthStateListener {
	/// Subscribes once to the client's event stream.
	pub fn install(
		client: &ClientHandle,
		surface: Arc<dyn Surface>,
		bridge: SessionBridge,
	) -> Self {
		Self { events: client.subscribe(), surface, bridge }
	}

	/// Consumes events until the provider drops its sending half.
	pub async fn run(mut self) {
		while let Some(event) = self.events.recv().await {
			self.handle(event).await;
		}
	}

	async fn handle(&self, event: AuthEvent) {
		match event {
			AuthEvent::SignedIn(session) => {
				self.bridge.persist(&session).await;

				if self.surface.current_path() == SIGN_IN_PATH {
					self.surface.navigate(LANDING_PATH);
				}
			},
			// Session state is owned by the provider and the backend; nothing
			// is cached client-side to clear.
			AuthEvent::SignedOut => {},
		}
	}
}
impl Debug for AuthStateListener {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("AuthStateListener(..)")
	}
}
