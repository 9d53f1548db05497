//! Provider client contract, construction, and process-wide sharing.

// self
use crate::{
	_prelude::*,
	config::ProviderConfig,
	error::{ConfigError, ValidationError},
	session::{AuthEventStream, Session},
};

/// Boxed future returned by [`ProviderClient`] methods.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Sign-in credentials submitted through the direct-credential flow.
#[derive(Clone)]
pub struct Credentials {
	identifier: String,
	secret: String,
}
impl Credentials {
	/// Creates a credential pair; validation happens in [`Credentials::validate`].
	pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
		Self { identifier: identifier.into(), secret: secret.into() }
	}

	/// Rejects empty fields before any network call is made.
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.identifier.is_empty() {
			return Err(ValidationError::MissingIdentifier);
		}
		if self.secret.is_empty() {
			return Err(ValidationError::MissingSecret);
		}

		Ok(())
	}

	/// Returns the sign-in identifier.
	pub fn identifier(&self) -> &str {
		&self.identifier
	}

	/// Returns the sign-in secret. Callers must avoid logging this string.
	pub fn secret(&self) -> &str {
		&self.secret
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("identifier", &self.identifier)
			.field("secret", &"<redacted>")
			.finish()
	}
}

/// Capability contract exposed by the loaded provider client library.
///
/// The trait is the bridge's only dependency on the provider's wire protocol;
/// implementations wrap whatever connection the loaded library established.
pub trait ProviderClient
where
	Self: Send + Sync,
{
	/// Queries the provider for its current session, if any.
	fn current_session(&self) -> ClientFuture<'_, Option<Session>>;

	/// Exchanges credentials for a session.
	///
	/// Some provider versions return the session inline; others require a
	/// follow-up [`ProviderClient::current_session`] query.
	fn sign_in_with_password<'a>(
		&'a self,
		credentials: &'a Credentials,
	) -> ClientFuture<'a, Option<Session>>;

	/// Builds the provider redirect URL for a named external identity source,
	/// returning the caller to `redirect_to` after the provider-side handshake.
	fn authorize_url<'a>(
		&'a self,
		identity_source: &'a str,
		redirect_to: &'a Url,
	) -> ClientFuture<'a, Url>;

	/// Subscribes to the provider's auth-state stream for the host's lifetime.
	fn subscribe(&self) -> AuthEventStream;
}

/// Shared, opaque handle to the one provider client built per bootstrap.
pub type ClientHandle = Arc<dyn ProviderClient>;

/// Constructs [`ClientHandle`]s from resolved configuration and a loaded library.
pub trait ProviderLibrary
where
	Self: Send + Sync,
{
	/// Builds one authenticated client bound to `config`. Pure construction,
	/// no network call.
	fn build_client(&self, config: &ProviderConfig) -> Result<ClientHandle>;
}

/// Write-once slot publishing the client handle as shared process-wide state.
///
/// Later-initialized host modules read the slot instead of re-deriving config;
/// the slot is written exactly once, before any reader is wired up, so no
/// concurrent-write hazard exists.
#[derive(Clone, Default)]
pub struct SharedClientSlot(Arc<RwLock<Option<ClientHandle>>>);
impl SharedClientSlot {
	/// Publishes `handle`, keeping the first value on repeated calls.
	///
	/// Returns `false` when a handle was already published.
	pub fn publish(&self, handle: ClientHandle) -> bool {
		let mut guard = self.0.write();

		if guard.is_some() {
			return false;
		}

		*guard = Some(handle);

		true
	}

	/// Returns the published handle, if any.
	pub fn get(&self) -> Option<ClientHandle> {
		self.0.read().clone()
	}
}
impl Debug for SharedClientSlot {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SharedClientSlot").field("published", &self.0.read().is_some()).finish()
	}
}

/// Builds one client handle per bootstrap and publishes it for reuse.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientFactory;
impl ClientFactory {
	/// Builds a client from `config` using `library`, publishing the handle to `slot`.
	///
	/// Fails with [`ConfigError::Incomplete`] when either config field is empty;
	/// the orchestrator checks completeness first, so reaching that branch here
	/// indicates a wiring bug in the host.
	pub fn build(
		config: &ProviderConfig,
		library: &dyn ProviderLibrary,
		slot: &SharedClientSlot,
	) -> Result<ClientHandle> {
		if let Some(field) = config.missing_field() {
			return Err(ConfigError::Incomplete { field }.into());
		}

		let handle = library.build_client(config)?;

		slot.publish(handle.clone());

		Ok(handle)
	}
}
