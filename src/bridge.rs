//! Persists provider sessions to the backend session endpoint.
//!
//! Persistence is a non-essential side effect: any failure is absorbed here and
//! only logged, so the surrounding sign-in experience never hangs or fails on
//! it. One awaited attempt, no retry.

// self
use crate::{
	_prelude::*,
	obs::{self, StageKind, StageOutcome},
	session::Session,
};

/// Path of the backend session endpoint, relative to the backend origin.
pub const SESSION_ENDPOINT_PATH: &str = "/session";

/// Boxed future returned by [`SessionSink`] implementations.
pub type SinkFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + 'a + Send>>;

/// Transport contract for delivering a bearer token to the backend.
pub trait SessionSink
where
	Self: Send + Sync,
{
	/// Delivers `token` to the backend session endpoint once.
	fn push<'a>(&'a self, token: &'a str) -> SinkFuture<'a>;
}

/// Forwards session credentials to the backend session store.
#[derive(Clone)]
pub struct SessionBridge {
	sink: Arc<dyn SessionSink>,
}
impl SessionBridge {
	/// Creates a bridge over the provided transport.
	pub fn new(sink: Arc<dyn SessionSink>) -> Self {
		Self { sink }
	}

	/// Persists the session's bearer token to the backend.
	///
	/// Returns `false` without network I/O when no token is extractable, and
	/// `false` when the single delivery attempt fails; never raises.
	pub async fn persist(&self, session: &Session) -> bool {
		const KIND: StageKind = StageKind::Persist;

		obs::record_stage_outcome(KIND, StageOutcome::Attempt);

		let Some(token) = session.bearer_token() else {
			obs::note_soft_failure(KIND, "session payload carries no recognized bearer token");
			obs::record_stage_outcome(KIND, StageOutcome::Failure);

			return false;
		};

		match self.sink.push(token.expose()).await {
			Ok(()) => {
				obs::record_stage_outcome(KIND, StageOutcome::Success);

				true
			},
			Err(e) => {
				obs::note_soft_failure(KIND, &e.to_string());
				obs::record_stage_outcome(KIND, StageOutcome::Failure);

				false
			},
		}
	}
}
impl Debug for SessionBridge {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("SessionBridge(..)")
	}
}

#[cfg(feature = "reqwest")]
pub use http::HttpSessionSink;
#[cfg(feature = "reqwest")]
mod http {
	// self
	use super::*;
	use crate::error::ConfigError;

	#[derive(Serialize)]
	struct SessionBody<'a> {
		access_token: &'a str,
	}

	/// Reqwest-backed [`SessionSink`] posting `{ "access_token": ... }` JSON.
	#[derive(Clone, Debug)]
	pub struct HttpSessionSink {
		client: ReqwestClient,
		endpoint: Url,
	}
	impl HttpSessionSink {
		/// Builds a sink targeting `backend_origin` with a default client.
		pub fn new(backend_origin: &Url) -> Result<Self> {
			Self::with_client(ReqwestClient::default(), backend_origin)
		}

		/// Builds a sink targeting `backend_origin` over an existing client.
		pub fn with_client(client: ReqwestClient, backend_origin: &Url) -> Result<Self> {
			let endpoint = backend_origin
				.join(SESSION_ENDPOINT_PATH)
				.map_err(|source| ConfigError::InvalidEndpoint { source })?;

			Ok(Self { client, endpoint })
		}

		async fn post_token(&self, token: &str) -> Result<()> {
			let response =
				self.client.post(self.endpoint.clone()).json(&SessionBody { access_token: token }).send().await?;
			let status = response.status();

			if status.is_success() {
				Ok(())
			} else {
				Err(Error::Backend { status: status.as_u16() })
			}
		}
	}
	impl SessionSink for HttpSessionSink {
		fn push<'a>(&'a self, token: &'a str) -> SinkFuture<'a> {
			Box::pin(self.post_token(token))
		}
	}
}
