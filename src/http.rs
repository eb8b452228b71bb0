//! HTTP transport shared by the credential exchange and the Graph client.
//!
//! The `oauth2` crate drives token requests through an [`AsyncHttpClient`]. The provider
//! asks its [`TokenHttpClient`] for a fresh handle per exchange, bound to a [`StatusSlot`],
//! so a rejected or unparsable token response can still be reported with the status the
//! identity provider answered with.

// std
use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
// self
use crate::_prelude::*;

/// Transport able to execute token exchanges while recording the response status.
///
/// Implementations live for the whole process behind an `Arc`, so they must be
/// `Send + Sync + 'static`; the handles own their state so request futures stay `Send`.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Error raised by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Per-exchange [`AsyncHttpClient`] handle.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Returns a handle that clears `slot` before sending and records the status afterwards.
	fn recording(&self, slot: StatusSlot) -> Self::Handle;
}

/// Shared cell holding the status code of the latest token endpoint response.
#[derive(Clone, Debug, Default)]
pub struct StatusSlot(Arc<Mutex<Option<u16>>>);
impl StatusSlot {
	/// Records `status`, replacing any previous value.
	pub fn record(&self, status: u16) {
		*self.0.lock() = Some(status);
	}

	/// Takes the recorded status, leaving the slot empty.
	pub fn take(&self) -> Option<u16> {
		self.0.lock().take()
	}
}

/// Reqwest client shared between token exchanges and Graph calls.
///
/// A custom [`ReqwestClient`] used for token exchanges should not follow redirects.
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an already configured client.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl Debug for ReqwestHttpClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ReqwestHttpClient(..)")
	}
}
impl TokenHttpClient for ReqwestHttpClient {
	type Handle = RecordingHandle;
	type TransportError = ReqwestError;

	fn recording(&self, slot: StatusSlot) -> Self::Handle {
		RecordingHandle { client: self.0.clone(), slot }
	}
}

/// [`AsyncHttpClient`] handed to `oauth2` by [`ReqwestHttpClient`].
#[derive(Clone)]
pub struct RecordingHandle {
	client: ReqwestClient,
	slot: StatusSlot,
}
impl<'c> AsyncHttpClient<'c> for RecordingHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.client.clone();
		let slot = self.slot.clone();

		Box::pin(async move {
			slot.take();

			let response = client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().clone();

			slot.record(status.as_u16());

			let mut converted = HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*converted.status_mut() = status;
			*converted.headers_mut() = headers;

			Ok(converted)
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_slot_is_shared_and_drained() {
		let slot = StatusSlot::default();
		let handle = ReqwestHttpClient::default().recording(slot.clone());

		handle.slot.record(401);

		assert_eq!(slot.take(), Some(401));
		assert_eq!(slot.take(), None);
	}
}
