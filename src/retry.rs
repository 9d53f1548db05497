//! Bounded retry and polling combinators shared by the loader and callback stages.

// crates.io
use tokio::time;
// self
use crate::_prelude::*;

/// Retry discipline with a linear backoff between attempts.
///
/// Attempt `n` (1-based) is followed by a `base_delay * n` wait, so three
/// attempts with a 500 ms base spend 1500 ms waiting in aggregate before the
/// last failure surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Maximum number of attempts, including the first.
	pub max_attempts: u32,
	/// Base delay multiplied by the attempt index between attempts.
	pub base_delay: Duration,
}
impl RetryPolicy {
	/// Creates a policy; zero attempts are clamped to one.
	pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
		Self { max_attempts: max_attempts.max(1), base_delay }
	}

	/// Runs `op` until it succeeds or attempts exhaust, surfacing the last failure.
	pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		let mut last = None;

		for attempt in 1..=self.max_attempts {
			match op().await {
				Ok(value) => return Ok(value),
				Err(e) => last = Some(e),
			}

			if attempt < self.max_attempts {
				time::sleep(self.base_delay * attempt).await;
			}
		}

		match last {
			Some(e) => Err(e),
			None => Err(Error::provider("Retry policy permitted no attempts")),
		}
	}
}

/// Probes `probe` up to `max_attempts` times, sleeping `interval` between
/// probes, until it yields a value or fails.
///
/// Used for library readiness polling and the session-after-callback query.
pub async fn poll_until<T, F, Fut>(
	max_attempts: u32,
	interval: Duration,
	mut probe: F,
) -> Result<Option<T>>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<Option<T>>>,
{
	for attempt in 1..=max_attempts {
		if let Some(value) = probe().await? {
			return Ok(Some(value));
		}

		if attempt < max_attempts {
			time::sleep(interval).await;
		}
	}

	Ok(None)
}
