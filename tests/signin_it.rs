// crates.io
use tokio::time;
// self
use auth_bridge::{
	_preludet::*,
	bridge::SessionBridge,
	client::{ClientHandle, Credentials},
	signin::SignInHandlers,
	surface::{LANDING_PATH, MemorySurface, REDIRECT_DELAY, SIGN_IN_PATH, StatusLevel},
};

struct Harness {
	provider: Arc<MockProviderClient>,
	surface: Arc<MemorySurface>,
	sink: Arc<CountingSink>,
	handlers: SignInHandlers,
}

fn harness() -> Harness {
	let provider = Arc::new(MockProviderClient::new());
	let client: ClientHandle = provider.clone();
	let surface = Arc::new(MemorySurface::default());
	let sink = Arc::new(CountingSink::default());
	let handlers =
		SignInHandlers::new(client, surface.clone(), SessionBridge::new(sink.clone()));

	Harness { provider, surface, sink, handlers }
}

#[tokio::test(start_paused = true)]
async fn blank_secret_is_rejected_before_any_provider_call() {
	let h = harness();

	h.handlers.sign_in_with_password(&Credentials::new("user@example.com", "")).await;

	assert_eq!(h.provider.password_calls(), 0);
	assert_eq!(h.provider.session_calls(), 0);
	assert!(h.sink.pushes().is_empty());
	assert_eq!(
		h.surface.statuses(),
		vec![(StatusLevel::Error, "A password is required to sign in.".to_owned())]
	);
}

#[tokio::test(start_paused = true)]
async fn blank_identifier_is_rejected_before_any_provider_call() {
	let h = harness();

	h.handlers.sign_in_with_password(&Credentials::new("", "hunter2")).await;

	assert_eq!(h.provider.password_calls(), 0);
	assert_eq!(
		h.surface.statuses(),
		vec![(StatusLevel::Error, "An identifier is required to sign in.".to_owned())]
	);
}

#[tokio::test(start_paused = true)]
async fn prompt_exchange_session_persists_and_redirects() {
	let h = harness();
	let started = time::Instant::now();

	h.provider
		.set_password_reply(Ok(Some(session_with_token("access_token", "pw-tok"))));
	h.handlers.sign_in_with_password(&Credentials::new("user@example.com", "hunter2")).await;

	assert_eq!(h.provider.password_calls(), 1);
	// The exchange answered directly, so no follow-up session query runs.
	assert_eq!(h.provider.session_calls(), 0);
	assert_eq!(h.sink.pushes(), vec!["pw-tok".to_owned()]);
	assert_eq!(
		h.surface.statuses(),
		vec![(StatusLevel::Info, "Signed in. Redirecting...".to_owned())]
	);
	assert_eq!(h.surface.navigations(), vec![LANDING_PATH.to_owned()]);
	assert_eq!(started.elapsed(), REDIRECT_DELAY);
}

#[tokio::test(start_paused = true)]
async fn tokenless_exchange_falls_back_to_a_session_query() {
	let h = harness();

	h.provider.set_password_reply(Ok(None));
	h.provider.push_session(session_with_token("access_token", "queried-tok"));
	h.handlers.sign_in_with_password(&Credentials::new("user@example.com", "hunter2")).await;

	assert_eq!(h.provider.password_calls(), 1);
	assert_eq!(h.provider.session_calls(), 1);
	assert_eq!(h.sink.pushes(), vec!["queried-tok".to_owned()]);
	assert_eq!(h.surface.navigations(), vec![LANDING_PATH.to_owned()]);
}

#[tokio::test(start_paused = true)]
async fn absent_session_after_exchange_reports_the_no_session_error() {
	let h = harness();

	h.provider.set_password_reply(Ok(None));
	h.handlers.sign_in_with_password(&Credentials::new("user@example.com", "hunter2")).await;

	assert!(h.sink.pushes().is_empty());
	assert!(h.surface.navigations().is_empty());
	assert_eq!(
		h.surface.statuses(),
		vec![(StatusLevel::Error, "Sign-in completed but no session was returned.".to_owned())]
	);
}

#[tokio::test(start_paused = true)]
async fn provider_rejection_surfaces_as_status_text() {
	let h = harness();

	h.provider.set_password_reply(Err("invalid login credentials".into()));
	h.handlers.sign_in_with_password(&Credentials::new("user@example.com", "wrong")).await;

	assert!(h.surface.navigations().is_empty());

	let statuses = h.surface.statuses();

	assert_eq!(statuses.len(), 1);
	assert_eq!(statuses[0].0, StatusLevel::Error);
	assert!(statuses[0].1.contains("invalid login credentials"));
}

#[tokio::test(start_paused = true)]
async fn redirect_sign_in_navigates_to_the_authorize_url() {
	let h = harness();

	h.handlers.sign_in_with_redirect("github").await;

	assert_eq!(h.provider.authorize_calls(), 1);

	let navigations = h.surface.navigations();

	assert_eq!(navigations.len(), 1);
	assert!(navigations[0].starts_with("https://provider.example.com/authorize"));
	assert!(navigations[0].contains("provider=github"));
	// The callback returns to the page this flow started from.
	assert!(navigations[0].contains(SIGN_IN_PATH.trim_start_matches('/')));
	assert!(h.surface.statuses().is_empty());
}

#[tokio::test(start_paused = true)]
async fn redirect_sign_in_failure_surfaces_as_status_text() {
	let h = harness();

	h.provider.fail_authorize("network down");
	h.handlers.sign_in_with_redirect("github").await;

	assert!(h.surface.navigations().is_empty());

	let statuses = h.surface.statuses();

	assert_eq!(statuses.len(), 1);
	assert_eq!(statuses[0].0, StatusLevel::Error);
	assert!(statuses[0].1.starts_with("Could not start provider sign-in:"));
}
