//! Client-credentials exchange against the identity provider's token endpoint.

// crates.io
use oauth2::{
	AuthType, ClientId as OAuthClientId, ClientSecret, HttpClientError, RequestTokenError, Scope,
	TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{CachedCredential, CredentialFuture},
	config::IdentityConfig,
	error::{AuthenticationError, ConfigError, TransportError},
	http::{ReqwestHttpClient, StatusSlot, TokenHttpClient},
};

const TOKEN_ENDPOINT: &str = "the token endpoint";

/// Source of fresh bearer credentials, consulted only when the cache cannot serve a token.
pub trait CredentialProvider
where
	Self: Send + Sync,
{
	/// Exchanges the application identity for a new credential.
	fn exchange(&self) -> CredentialFuture<'_, CachedCredential>;
}

/// [`CredentialProvider`] performing the OAuth 2.0 client-credentials grant.
///
/// Secrets are read from the held [`IdentityConfig`] on every exchange, so an incomplete
/// configuration fails the first token request rather than construction. The client
/// authenticates with `client_secret_post`.
pub struct ClientCredentialsProvider<C = ReqwestHttpClient>
where
	C: ?Sized + TokenHttpClient,
{
	identity: IdentityConfig,
	http_client: Arc<C>,
}
impl<C> ClientCredentialsProvider<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates a provider for `identity` that sends exchanges through `http_client`.
	pub fn new(identity: IdentityConfig, http_client: impl Into<Arc<C>>) -> Self {
		Self { identity, http_client: http_client.into() }
	}

	/// Identity configuration consulted on every exchange.
	pub fn identity(&self) -> &IdentityConfig {
		&self.identity
	}
}
impl<C> CredentialProvider for ClientCredentialsProvider<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn exchange(&self) -> CredentialFuture<'_, CachedCredential> {
		Box::pin(async move {
			let credentials = self.identity.client_credentials()?;
			let oauth_client = BasicClient::new(OAuthClientId::new(credentials.client_id.to_string()))
				.set_client_secret(ClientSecret::new(credentials.client_secret.expose().to_owned()))
				.set_token_uri(TokenUrl::from_url(credentials.token_url))
				.set_auth_type(AuthType::RequestBody);
			let slot = StatusSlot::default();
			let handle = self.http_client.recording(slot.clone());
			let issued_at = OffsetDateTime::now_utc();
			let response = oauth_client
				.exchange_client_credentials()
				.add_scope(Scope::new(credentials.scope))
				.request_async(&handle)
				.await
				.map_err(|err| map_request_error(slot.take(), err))?;

			map_token_response(issued_at, &response)
		})
	}
}
impl<C> Debug for ClientCredentialsProvider<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentialsProvider").field("identity", &self.identity).finish()
	}
}

fn map_token_response(
	issued_at: OffsetDateTime,
	response: &BasicTokenResponse,
) -> Result<CachedCredential> {
	let mut builder = CachedCredential::builder()
		.token(response.access_token().secret().to_owned())
		.issued_at(issued_at);

	// Unrepresentable lifetimes are treated like a missing `expires_in`.
	if let Some(expires_in) = response.expires_in().and_then(|value| Duration::try_from(value).ok())
	{
		builder = builder.expires_in(expires_in);
	}

	builder.build().map_err(|e| AuthenticationError::from(e).into())
}

fn map_request_error<E>(status: Option<u16>, err: BasicRequestTokenError<HttpClientError<E>>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response, status),
		RequestTokenError::Request(error) => map_transport_error(error, status),
		RequestTokenError::Parse(source, _body) =>
			AuthenticationError::MalformedResponse { source, status }.into(),
		RequestTokenError::Other(message) =>
			AuthenticationError::Unexpected { message, status }.into(),
	}
}

fn map_server_response_error(response: BasicErrorResponse, status: Option<u16>) -> Error {
	let reason = match response.error_description() {
		Some(description) => description.clone(),
		None => response.error().as_ref().to_owned(),
	};

	AuthenticationError::Rejected { reason, status }.into()
}

fn map_transport_error<E>(err: HttpClientError<E>, status: Option<u16>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::network(TOKEN_ENDPOINT, *inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => AuthenticationError::Unexpected { message, status }.into(),
		_ => AuthenticationError::Unexpected {
			message: "HTTP client error occurred while calling the token endpoint".into(),
			status,
		}
		.into(),
	}
}
