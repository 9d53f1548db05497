//! Client-side authentication orchestrator: bootstrap a hosted identity provider's client
//! library, consume OAuth implicit-flow callbacks, and bridge sessions to a first-party
//! backend in one crate built for embedding.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod bridge;
pub mod callback;
pub mod client;
pub mod collab;
pub mod config;
pub mod error;
pub mod listener;
pub mod loader;
pub mod obs;
pub mod orchestrator;
pub mod retry;
pub mod session;
pub mod signin;
pub mod store;
pub mod surface;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Scripted provider doubles and helpers for integration tests; enabled via `cfg(test)` or
	//! the `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{
		collections::VecDeque,
		io,
		sync::atomic::{AtomicBool, AtomicU32, Ordering},
	};
	// crates.io
	use tokio::sync::mpsc;
	// self
	use crate::{
		bridge::{SessionSink, SinkFuture},
		client::{ClientFuture, ClientHandle, Credentials, ProviderClient, ProviderLibrary},
		config::ProviderConfig,
		error::LoadError,
		loader::{FetchFuture, LibraryFetcher},
		session::{AuthEvent, AuthEventSender, AuthEventStream, Session},
	};

	type SessionReply = Result<Option<Session>, String>;

	// Consumes one charge from a scripted counter; `u32::MAX` means unlimited.
	fn consume_charge(counter: &AtomicU32) -> bool {
		counter
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
				(remaining > 0 && remaining != u32::MAX).then(|| remaining - 1)
			})
			.map_or_else(|remaining| remaining > 0, |_| true)
	}

	/// Builds a session fixture carrying `token` under the given payload field.
	pub fn session_with_token(field: &str, token: &str) -> Session {
		Session::new(serde_json::json!({ field: token }))
	}

	/// Scripted [`ProviderClient`] double with call counters and an event feed.
	pub struct MockProviderClient {
		session_queue: Mutex<VecDeque<SessionReply>>,
		password_reply: Mutex<SessionReply>,
		authorize_error: Mutex<Option<String>>,
		session_calls: AtomicU32,
		password_calls: AtomicU32,
		authorize_calls: AtomicU32,
		event_tx: Mutex<Option<AuthEventSender>>,
		event_rx: Mutex<Option<AuthEventStream>>,
	}
	impl MockProviderClient {
		/// Creates a client that reports no session and succeeds on redirects.
		pub fn new() -> Self {
			let (event_tx, event_rx) = mpsc::unbounded_channel();

			Self {
				session_queue: Mutex::new(VecDeque::new()),
				password_reply: Mutex::new(Ok(None)),
				authorize_error: Mutex::new(None),
				session_calls: AtomicU32::new(0),
				password_calls: AtomicU32::new(0),
				authorize_calls: AtomicU32::new(0),
				event_tx: Mutex::new(Some(event_tx)),
				event_rx: Mutex::new(Some(event_rx)),
			}
		}

		/// Queues the next `current_session` reply; an empty queue replies `Ok(None)`.
		pub fn push_session(&self, session: Session) {
			self.session_queue.lock().push_back(Ok(Some(session)));
		}

		/// Queues one empty `current_session` reply.
		pub fn push_no_session(&self) {
			self.session_queue.lock().push_back(Ok(None));
		}

		/// Queues one failing `current_session` reply.
		pub fn push_session_error(&self, reason: impl Into<String>) {
			self.session_queue.lock().push_back(Err(reason.into()));
		}

		/// Scripts the password-exchange reply returned on every call.
		pub fn set_password_reply(&self, reply: Result<Option<Session>, String>) {
			*self.password_reply.lock() = reply;
		}

		/// Makes every `authorize_url` call fail with `reason`.
		pub fn fail_authorize(&self, reason: impl Into<String>) {
			*self.authorize_error.lock() = Some(reason.into());
		}

		/// Emits an auth-state event to the subscribed listener.
		pub fn emit(&self, event: AuthEvent) {
			if let Some(tx) = self.event_tx.lock().as_ref() {
				let _ = tx.send(event);
			}
		}

		/// Drops the sending half so a listener's `run` loop terminates.
		pub fn close_events(&self) {
			self.event_tx.lock().take();
		}

		/// Number of `current_session` calls observed.
		pub fn session_calls(&self) -> u32 {
			self.session_calls.load(Ordering::SeqCst)
		}

		/// Number of password-exchange calls observed.
		pub fn password_calls(&self) -> u32 {
			self.password_calls.load(Ordering::SeqCst)
		}

		/// Number of `authorize_url` calls observed.
		pub fn authorize_calls(&self) -> u32 {
			self.authorize_calls.load(Ordering::SeqCst)
		}

		fn clone_reply(reply: &SessionReply) -> Result<Option<Session>> {
			match reply {
				Ok(session) => Ok(session.clone()),
				Err(reason) => Err(Error::provider(reason.clone())),
			}
		}
	}
	impl Default for MockProviderClient {
		fn default() -> Self {
			Self::new()
		}
	}
	impl ProviderClient for MockProviderClient {
		fn current_session(&self) -> ClientFuture<'_, Option<Session>> {
			self.session_calls.fetch_add(1, Ordering::SeqCst);

			let reply = self
				.session_queue
				.lock()
				.pop_front()
				.map_or(Ok(None), |queued| Self::clone_reply(&queued));

			Box::pin(async move { reply })
		}

		fn sign_in_with_password<'a>(
			&'a self,
			_credentials: &'a Credentials,
		) -> ClientFuture<'a, Option<Session>> {
			self.password_calls.fetch_add(1, Ordering::SeqCst);

			let reply = Self::clone_reply(&self.password_reply.lock());

			Box::pin(async move { reply })
		}

		fn authorize_url<'a>(
			&'a self,
			identity_source: &'a str,
			redirect_to: &'a Url,
		) -> ClientFuture<'a, Url> {
			self.authorize_calls.fetch_add(1, Ordering::SeqCst);

			let scripted_error = self.authorize_error.lock().clone();

			Box::pin(async move {
				if let Some(reason) = scripted_error {
					return Err(Error::provider(reason));
				}

				let mut url = Url::parse("https://provider.example.com/authorize")
					.expect("Mock authorize endpoint literal should parse.");

				url.query_pairs_mut()
					.append_pair("provider", identity_source)
					.append_pair("redirect_to", redirect_to.as_str());

				Ok(url)
			})
		}

		fn subscribe(&self) -> AuthEventStream {
			self.event_rx.lock().take().expect("Auth event stream was already taken.")
		}
	}

	/// Scripted [`LibraryFetcher`] + [`ProviderLibrary`] double.
	pub struct MockLibrary {
		fetched: AtomicBool,
		present_override: AtomicBool,
		fetch_calls: AtomicU32,
		failing_fetches: AtomicU32,
		presence_delay: AtomicU32,
		client: Mutex<Option<ClientHandle>>,
	}
	impl MockLibrary {
		/// Creates a library that loads on the first fetch and is immediately ready.
		pub fn new() -> Self {
			Self {
				fetched: AtomicBool::new(false),
				present_override: AtomicBool::new(false),
				fetch_calls: AtomicU32::new(0),
				failing_fetches: AtomicU32::new(0),
				presence_delay: AtomicU32::new(0),
				client: Mutex::new(None),
			}
		}

		/// Marks the library present without any fetch.
		pub fn mark_present(&self) {
			self.present_override.store(true, Ordering::SeqCst);
		}

		/// Makes the next `count` fetches fail.
		pub fn fail_fetches(&self, count: u32) {
			self.failing_fetches.store(count, Ordering::SeqCst);
		}

		/// Keeps `is_present` false for `count` probes after a successful fetch.
		pub fn delay_presence_checks(&self, count: u32) {
			self.presence_delay.store(count, Ordering::SeqCst);
		}

		/// Number of fetches issued against the distribution artifact.
		pub fn fetch_calls(&self) -> u32 {
			self.fetch_calls.load(Ordering::SeqCst)
		}

		/// Seeds the client handle returned by `build_client`.
		pub fn set_client(&self, client: ClientHandle) {
			*self.client.lock() = Some(client);
		}
	}
	impl Default for MockLibrary {
		fn default() -> Self {
			Self::new()
		}
	}
	impl LibraryFetcher for MockLibrary {
		fn fetch(&self) -> FetchFuture<'_> {
			self.fetch_calls.fetch_add(1, Ordering::SeqCst);

			let failing = consume_charge(&self.failing_fetches);

			if !failing {
				self.fetched.store(true, Ordering::SeqCst);
			}

			Box::pin(async move {
				if failing {
					Err(LoadError::fetch_failed(io::Error::other("mock fetch refused")))
				} else {
					Ok(())
				}
			})
		}

		fn is_present(&self) -> bool {
			if self.present_override.load(Ordering::SeqCst) {
				return true;
			}
			if !self.fetched.load(Ordering::SeqCst) {
				return false;
			}

			!consume_charge(&self.presence_delay)
		}
	}
	impl ProviderLibrary for MockLibrary {
		fn build_client(&self, _config: &ProviderConfig) -> Result<ClientHandle> {
			let mut guard = self.client.lock();
			let handle =
				guard.get_or_insert_with(|| Arc::new(MockProviderClient::new())).clone();

			Ok(handle)
		}
	}

	/// [`SessionSink`] double recording every delivered token.
	#[derive(Default)]
	pub struct CountingSink {
		pushes: Mutex<Vec<String>>,
		failing_pushes: AtomicU32,
	}
	impl CountingSink {
		/// Tokens delivered so far, oldest first.
		pub fn pushes(&self) -> Vec<String> {
			self.pushes.lock().clone()
		}

		/// Makes the next `count` deliveries fail after recording the token.
		pub fn fail_next_pushes(&self, count: u32) {
			self.failing_pushes.store(count, Ordering::SeqCst);
		}
	}
	impl SessionSink for CountingSink {
		fn push<'a>(&'a self, token: &'a str) -> SinkFuture<'a> {
			self.pushes.lock().push(token.to_owned());

			let failing = consume_charge(&self.failing_pushes);

			Box::pin(async move {
				if failing {
					Err(Error::provider("mock sink refused the token"))
				} else {
					Ok(())
				}
			})
		}
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {auth_bridge as _, httpmock as _};
