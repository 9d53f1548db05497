//! Thin clients for the backend's external collaborator endpoints.
//!
//! The prediction and chat collaborators are outside the authentication core;
//! they are reached only through their HTTP contracts, and these clients encode
//! exactly those contracts and nothing more.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, error::ValidationError};

/// Path of the prediction collaborator endpoint.
pub const PREDICT_ENDPOINT_PATH: &str = "/predict";
/// Path of the chat collaborator endpoint.
pub const CHAT_ENDPOINT_PATH: &str = "/gemini";
/// Chat model requested when the caller does not override it.
pub const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-flash";

/// Encodes raw PNG bytes as a `data:image/png;base64,...` URL suitable for the
/// prediction endpoint's request body.
pub fn png_data_url(bytes: &[u8]) -> String {
	format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

/// Decodes a JSON response body with path-aware error reporting.
pub(crate) fn decode_json<T>(bytes: &[u8]) -> Result<T>
where
	T: for<'de> Deserialize<'de>,
{
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| Error::Decode { source })
}

#[cfg(feature = "reqwest")] pub use http::{ChatClient, PredictClient};
#[cfg(feature = "reqwest")]
mod http {
	// self
	use super::*;
	use crate::error::ConfigError;

	#[derive(Deserialize)]
	struct PredictResponse {
		result: String,
	}

	#[derive(Serialize)]
	struct ChatBody<'a> {
		message: &'a str,
		model: &'a str,
	}

	#[derive(Deserialize)]
	struct ChatResponse {
		reply: String,
	}

	/// Client for the image-classification collaborator.
	#[derive(Clone, Debug)]
	pub struct PredictClient {
		client: ReqwestClient,
		endpoint: Url,
	}
	impl PredictClient {
		/// Builds a client targeting `backend_origin`.
		pub fn new(backend_origin: &Url) -> Result<Self> {
			Self::with_client(ReqwestClient::default(), backend_origin)
		}

		/// Builds a client targeting `backend_origin` over an existing client.
		pub fn with_client(client: ReqwestClient, backend_origin: &Url) -> Result<Self> {
			let endpoint = backend_origin
				.join(PREDICT_ENDPOINT_PATH)
				.map_err(|source| ConfigError::InvalidEndpoint { source })?;

			Ok(Self { client, endpoint })
		}

		/// Submits a base64 data-URL image and returns the classification label.
		pub async fn classify(&self, data_url: &str) -> Result<String> {
			if data_url.trim().is_empty() {
				return Err(ValidationError::MissingImage.into());
			}

			// The endpoint expects the data URL as a bare JSON string body.
			let response = self.client.post(self.endpoint.clone()).json(&data_url).send().await?;
			let status = response.status();

			if !status.is_success() {
				return Err(Error::Backend { status: status.as_u16() });
			}

			let bytes = response.bytes().await?;
			let parsed: PredictResponse = decode_json(&bytes)?;

			Ok(parsed.result)
		}
	}

	/// Client for the chat/assistant collaborator.
	#[derive(Clone, Debug)]
	pub struct ChatClient {
		client: ReqwestClient,
		endpoint: Url,
		model: String,
	}
	impl ChatClient {
		/// Builds a client targeting `backend_origin` with the default model.
		pub fn new(backend_origin: &Url) -> Result<Self> {
			Self::with_client(ReqwestClient::default(), backend_origin)
		}

		/// Builds a client targeting `backend_origin` over an existing client.
		pub fn with_client(client: ReqwestClient, backend_origin: &Url) -> Result<Self> {
			let endpoint = backend_origin
				.join(CHAT_ENDPOINT_PATH)
				.map_err(|source| ConfigError::InvalidEndpoint { source })?;

			Ok(Self { client, endpoint, model: DEFAULT_CHAT_MODEL.into() })
		}

		/// Overrides the model name forwarded with each message.
		pub fn with_model(mut self, model: impl Into<String>) -> Self {
			self.model = model.into();

			self
		}

		/// Sends a text message and returns the assistant's reply.
		pub async fn send(&self, message: &str) -> Result<String> {
			if message.trim().is_empty() {
				return Err(ValidationError::MissingMessage.into());
			}

			let body = ChatBody { message, model: &self.model };
			let response = self.client.post(self.endpoint.clone()).json(&body).send().await?;
			let status = response.status();

			if !status.is_success() {
				return Err(Error::Backend { status: status.as_u16() });
			}

			let bytes = response.bytes().await?;
			let parsed: ChatResponse = decode_json(&bytes)?;

			Ok(parsed.reply)
		}
	}
}
