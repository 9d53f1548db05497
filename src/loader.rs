//! Resilient provisioning of the remote provider client library.
//!
//! The loader tolerates slow or failed network loads via bounded retry with
//! linear backoff, deduplicates concurrent load requests through a singleflight
//! guard, and polls for the library's presence after a fetch completes because
//! some distributions finish the network load before finishing internal
//! initialization.

// self
use crate::{
	_prelude::*,
	error::LoadError,
	obs::{self, StageKind, StageOutcome, StageSpan},
	retry::{self, RetryPolicy},
};

/// Boxed future returned by [`LibraryFetcher`] implementations.
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<(), LoadError>> + 'a + Send>>;

/// Abstraction over the runtime that hosts the provider client library.
///
/// `fetch` injects a single load request for the library's distribution
/// artifact; `is_present` reports the runtime's view of whether the library has
/// finished initializing. The loader owns all retry and dedup discipline, so
/// implementations stay one-shot and stateless beyond the runtime itself.
pub trait LibraryFetcher
where
	Self: Send + Sync,
{
	/// Issues one load request for the library's distribution artifact.
	fn fetch(&self) -> FetchFuture<'_>;

	/// Reports whether the library is present and initialized in the runtime.
	fn is_present(&self) -> bool;
}

/// Number of load attempts before surfacing the last failure.
pub const LOAD_ATTEMPTS: u32 = 3;
/// Base delay between load attempts; multiplied by the attempt index.
pub const LOAD_BACKOFF: Duration = Duration::from_millis(500);
/// Number of presence probes performed after a fetch completes.
pub const READY_POLLS: u32 = 10;
/// Interval between presence probes.
pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Ensures the provider client library is present in the runtime.
#[derive(Clone)]
pub struct Loader {
	fetcher: Arc<dyn LibraryFetcher>,
	policy: RetryPolicy,
	inflight: Arc<AsyncMutex<()>>,
}
impl Loader {
	/// Creates a loader with the standard attempt and backoff discipline.
	pub fn new(fetcher: Arc<dyn LibraryFetcher>) -> Self {
		Self {
			fetcher,
			policy: RetryPolicy::new(LOAD_ATTEMPTS, LOAD_BACKOFF),
			inflight: Arc::new(AsyncMutex::new(())),
		}
	}

	/// Resolves once the library is available, fetching it if necessary.
	///
	/// Concurrent callers attach to the in-flight load instead of issuing a
	/// duplicate fetch. Fails with [`LoadError`] when every attempt exhausts.
	pub async fn ensure_loaded(&self) -> Result<()> {
		const KIND: StageKind = StageKind::LibraryLoad;

		if self.fetcher.is_present() {
			return Ok(());
		}

		let span = StageSpan::new(KIND, "ensure_loaded");

		obs::record_stage_outcome(KIND, StageOutcome::Attempt);

		let result = span
			.instrument(async {
				let _singleflight = self.inflight.lock().await;

				// A concurrent caller may have completed the load while this one
				// was waiting on the guard.
				if self.fetcher.is_present() {
					return Ok(());
				}

				self.policy.run(|| self.attempt()).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_stage_outcome(KIND, StageOutcome::Success),
			Err(_) => obs::record_stage_outcome(KIND, StageOutcome::Failure),
		}

		result
	}

	async fn attempt(&self) -> Result<()> {
		self.fetcher.fetch().await?;

		let ready =
			retry::poll_until(READY_POLLS, READY_POLL_INTERVAL, || async move {
				Ok(self.fetcher.is_present().then_some(()))
			})
			.await?;

		match ready {
			Some(()) => Ok(()),
			None => Err(LoadError::NeverBecameReady { polls: READY_POLLS }.into()),
		}
	}
}
impl Debug for Loader {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Loader").field("policy", &self.policy).finish()
	}
}
