// crates.io
use tokio::time;
// self
use auth_bridge::{
	_preludet::*,
	bridge::SessionBridge,
	callback::{CallbackHandler, CallbackOutcome, SESSION_RETRY_DELAY, SETTLE_DELAY},
	client::ClientHandle,
	surface::{LANDING_PATH, MemorySurface, REDIRECT_DELAY, Surface},
};

struct Harness {
	provider: Arc<MockProviderClient>,
	client: ClientHandle,
	surface: Arc<MemorySurface>,
	sink: Arc<CountingSink>,
	handler: CallbackHandler,
}

fn harness() -> Harness {
	let provider = Arc::new(MockProviderClient::new());
	let client: ClientHandle = provider.clone();
	let surface = Arc::new(MemorySurface::default());
	let sink = Arc::new(CountingSink::default());
	let handler = CallbackHandler::new(surface.clone(), SessionBridge::new(sink.clone()));

	Harness { provider, client, surface, sink, handler }
}

#[tokio::test(start_paused = true)]
async fn missing_fragment_is_not_a_callback() {
	let h = harness();
	let outcome = h.handler.detect_and_handle(&h.client).await;

	assert!(matches!(outcome, CallbackOutcome::NotACallback));
	assert_eq!(h.provider.session_calls(), 0);
	assert_eq!(h.surface.scrub_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn unrelated_fragment_is_left_untouched() {
	let h = harness();

	h.surface.set_fragment("section-2");

	let outcome = h.handler.detect_and_handle(&h.client).await;

	assert!(matches!(outcome, CallbackOutcome::NotACallback));
	assert_eq!(h.surface.fragment(), Some("section-2".into()));
	assert_eq!(h.surface.scrub_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn error_fragment_is_decoded_scrubbed_and_reported() {
	let h = harness();

	h.surface.set_fragment("error=access_denied");

	let outcome = h.handler.detect_and_handle(&h.client).await;

	assert!(matches!(outcome, CallbackOutcome::ErrorCallback(message) if message == "access_denied"));
	assert_eq!(h.surface.fragment(), None);
	assert_eq!(h.surface.scrub_count(), 1);
	assert_eq!(h.provider.session_calls(), 0);
	assert!(h.sink.pushes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn token_fragment_with_prompt_session_persists_once_and_redirects_once() {
	let h = harness();
	let started = time::Instant::now();

	h.surface.set_fragment("access_token=abc123&token_type=bearer&expires_in=3600");
	h.provider.push_session(session_with_token("access_token", "abc123"));

	let outcome = h.handler.detect_and_handle(&h.client).await;

	assert!(matches!(outcome, CallbackOutcome::SessionEstablished(_)));
	assert_eq!(h.provider.session_calls(), 1);
	assert_eq!(h.sink.pushes(), vec!["abc123".to_owned()]);
	assert_eq!(h.surface.fragment(), None);
	assert_eq!(h.surface.scrub_count(), 1);
	assert_eq!(h.surface.navigations(), vec![LANDING_PATH.to_owned()]);
	assert_eq!(started.elapsed(), SETTLE_DELAY + REDIRECT_DELAY);
}

#[tokio::test(start_paused = true)]
async fn token_fragment_retries_the_session_query_once() {
	let h = harness();
	let started = time::Instant::now();

	h.surface.set_fragment("access_token=late-tok");
	h.provider.push_no_session();
	h.provider.push_session(session_with_token("access_token", "late-tok"));

	let outcome = h.handler.detect_and_handle(&h.client).await;

	assert!(matches!(outcome, CallbackOutcome::SessionEstablished(_)));
	assert_eq!(h.provider.session_calls(), 2);
	assert_eq!(h.sink.pushes(), vec!["late-tok".to_owned()]);
	assert_eq!(started.elapsed(), SETTLE_DELAY + SESSION_RETRY_DELAY + REDIRECT_DELAY);
}

#[tokio::test(start_paused = true)]
async fn absent_session_on_both_queries_is_inconclusive_and_preserves_the_fragment() {
	let h = harness();

	h.surface.set_fragment("access_token=abc123");

	let outcome = h.handler.detect_and_handle(&h.client).await;

	assert!(matches!(outcome, CallbackOutcome::Inconclusive));
	assert_eq!(h.provider.session_calls(), 2);
	assert_eq!(h.surface.fragment(), Some("access_token=abc123".into()));
	assert_eq!(h.surface.scrub_count(), 0);
	assert!(h.sink.pushes().is_empty());
	assert!(h.surface.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn provider_errors_during_recovery_scrub_and_report() {
	let h = harness();

	h.surface.set_fragment("access_token=abc123");
	h.provider.push_session_error("token inspection failed");

	let outcome = h.handler.detect_and_handle(&h.client).await;

	assert!(
		matches!(outcome, CallbackOutcome::ErrorCallback(message) if message.contains("token inspection failed"))
	);
	assert_eq!(h.surface.fragment(), None);
	assert_eq!(h.surface.scrub_count(), 1);
	assert!(h.sink.pushes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn persistence_failure_does_not_block_the_callback_flow() {
	let h = harness();

	h.surface.set_fragment("access_token=abc123");
	h.provider.push_session(session_with_token("access_token", "abc123"));
	h.sink.fail_next_pushes(1);

	let outcome = h.handler.detect_and_handle(&h.client).await;

	// The remote session may still function, so a failed persistence attempt
	// must not degrade the user-visible outcome.
	assert!(matches!(outcome, CallbackOutcome::SessionEstablished(_)));
	assert_eq!(h.surface.navigations(), vec![LANDING_PATH.to_owned()]);
}
