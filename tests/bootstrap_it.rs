// self
use auth_bridge::{
	_preludet::*,
	bridge::SessionBridge,
	config::{ConfigResolver, ENDPOINT_URL_KEY, PUBLIC_KEY_KEY},
	orchestrator::{Bootstrap, Orchestrator},
	session::AuthEvent,
	store::MemoryStore,
	surface::{LANDING_PATH, MemorySurface, StatusLevel, Surface},
};

struct Harness {
	provider: Arc<MockProviderClient>,
	library: Arc<MockLibrary>,
	surface: Arc<MemorySurface>,
	sink: Arc<CountingSink>,
	orchestrator: Orchestrator,
}

fn harness(endpoint_url: &str, public_key: &str) -> Harness {
	let globals = MemoryStore::default();

	if !endpoint_url.is_empty() {
		globals.set(ENDPOINT_URL_KEY, endpoint_url);
	}
	if !public_key.is_empty() {
		globals.set(PUBLIC_KEY_KEY, public_key);
	}

	let provider = Arc::new(MockProviderClient::new());
	let library = Arc::new(MockLibrary::new());

	library.set_client(provider.clone());

	let surface = Arc::new(MemorySurface::default());
	let sink = Arc::new(CountingSink::default());
	let orchestrator = Orchestrator::new(
		ConfigResolver::new().with_source(Arc::new(globals)),
		library.clone(),
		library.clone(),
		surface.clone(),
		SessionBridge::new(sink.clone()),
	);

	Harness { provider, library, surface, sink, orchestrator }
}

fn configured_harness() -> Harness {
	harness("https://project.example.co", "public-anon-key")
}

#[tokio::test(start_paused = true)]
async fn incomplete_config_disables_the_subsystem_without_any_fetch() {
	for (endpoint_url, public_key) in
		[("", ""), ("https://project.example.co", ""), ("", "public-anon-key")]
	{
		let h = harness(endpoint_url, public_key);
		let outcome = h.orchestrator.bootstrap().await;

		assert!(matches!(outcome, Bootstrap::Disabled));
		assert_eq!(h.library.fetch_calls(), 0);
		assert!(h.orchestrator.shared_client().get().is_none());
		assert_eq!(
			h.surface.statuses(),
			vec![(
				StatusLevel::Error,
				"Authentication is not configured. Sign-in is unavailable.".to_owned()
			)]
		);
	}
}

#[tokio::test(start_paused = true)]
async fn exhausted_library_fetches_disable_the_subsystem() {
	let h = configured_harness();

	h.library.fail_fetches(u32::MAX);

	let outcome = h.orchestrator.bootstrap().await;

	assert!(matches!(outcome, Bootstrap::Disabled));
	assert_eq!(h.library.fetch_calls(), 3);
	assert!(h.orchestrator.shared_client().get().is_none());
	assert_eq!(
		h.surface.statuses(),
		vec![(
			StatusLevel::Error,
			"Authentication library failed to load. Sign-in is unavailable.".to_owned()
		)]
	);
}

#[tokio::test(start_paused = true)]
async fn error_callback_short_circuits_after_publishing_the_client() {
	let h = configured_harness();

	h.surface.set_fragment("error=access_denied");

	let outcome = h.orchestrator.bootstrap().await;

	assert!(matches!(
		outcome,
		Bootstrap::CallbackResolved(
			auth_bridge::callback::CallbackOutcome::ErrorCallback(message)
		) if message == "access_denied"
	));
	// The client is still published for later page modules even though the
	// bootstrap stopped at the callback.
	assert!(h.orchestrator.shared_client().get().is_some());
	assert_eq!(h.surface.scrub_count(), 1);
	assert_eq!(h.provider.session_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn clean_boot_without_a_session_wires_handlers_quietly() {
	let h = configured_harness();
	let outcome = h.orchestrator.bootstrap().await;

	assert!(matches!(outcome, Bootstrap::Ready(_)));
	assert_eq!(h.library.fetch_calls(), 1);
	assert!(h.orchestrator.shared_client().get().is_some());
	// One existing-session check, nothing to persist or redirect.
	assert_eq!(h.provider.session_calls(), 1);
	assert!(h.sink.pushes().is_empty());
	assert!(h.surface.navigations().is_empty());
	assert!(h.surface.statuses().is_empty());
}

#[tokio::test(start_paused = true)]
async fn existing_session_on_the_sign_in_page_persists_and_redirects() {
	let h = configured_harness();

	h.provider.push_session(session_with_token("access_token", "resumed-tok"));

	let outcome = h.orchestrator.bootstrap().await;

	assert!(matches!(outcome, Bootstrap::Ready(_)));
	assert_eq!(h.sink.pushes(), vec!["resumed-tok".to_owned()]);
	assert_eq!(h.surface.navigations(), vec![LANDING_PATH.to_owned()]);
}

#[tokio::test(start_paused = true)]
async fn existing_session_elsewhere_persists_without_redirecting() {
	let h = configured_harness();

	h.surface.set_path(LANDING_PATH);
	h.provider.push_session(session_with_token("access_token", "resumed-tok"));

	let outcome = h.orchestrator.bootstrap().await;

	assert!(matches!(outcome, Bootstrap::Ready(_)));
	assert_eq!(h.sink.pushes(), vec!["resumed-tok".to_owned()]);
	assert!(h.surface.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn inconclusive_callback_continues_into_a_ready_boot() {
	let h = configured_harness();

	h.surface.set_fragment("access_token=abc123");

	let outcome = h.orchestrator.bootstrap().await;

	assert!(matches!(outcome, Bootstrap::Ready(_)));
	// Two callback session queries plus the existing-session check.
	assert_eq!(h.provider.session_calls(), 3);
	// The fragment stays in place so a reload can retry the recovery.
	assert_eq!(h.surface.fragment(), Some("access_token=abc123".into()));
	assert_eq!(h.surface.scrub_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn listener_persists_and_redirects_on_a_later_sign_in() {
	let h = configured_harness();
	let outcome = h.orchestrator.bootstrap().await;
	let Bootstrap::Ready(ready) = outcome else {
		panic!("The bootstrap should reach the ready state.");
	};

	h.provider.emit(AuthEvent::SignedIn(session_with_token("access_token", "event-tok")));
	h.provider.close_events();
	ready.listener.run().await;

	assert_eq!(h.sink.pushes(), vec!["event-tok".to_owned()]);
	assert_eq!(h.surface.navigations(), vec![LANDING_PATH.to_owned()]);
}

#[tokio::test(start_paused = true)]
async fn listener_ignores_sign_out_events() {
	let h = configured_harness();
	let outcome = h.orchestrator.bootstrap().await;
	let Bootstrap::Ready(ready) = outcome else {
		panic!("The bootstrap should reach the ready state.");
	};

	h.provider.emit(AuthEvent::SignedOut);
	h.provider.close_events();
	ready.listener.run().await;

	assert!(h.sink.pushes().is_empty());
	assert!(h.surface.navigations().is_empty());
}
