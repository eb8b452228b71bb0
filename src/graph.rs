//! Downstream Microsoft Graph client whose every call is authenticated on demand.
//!
//! [`GraphClient`] asks its [`CredentialSupplier`] for a token immediately before each
//! request and never sends a request without one. [`GraphClientFactory`] hands out clients
//! that share one connection pool and one supplier.

// crates.io
use reqwest::{Response, StatusCode, header};
// self
use crate::{
	_prelude::*,
	auth::{CredentialSupplier, Secret},
	config::GraphConfig,
	error::{ConfigError, TransportError},
	http::ReqwestHttpClient,
	obs::{GatewaySpan, Stage},
};

const DOWNSTREAM: &str = "the downstream API";

/// Boxed future returned by [`DownstreamClient`] calls.
pub type DownstreamFuture<'a> = Pin<Box<dyn Future<Output = Result<Value>> + 'a + Send>>;

/// Generic resource-call surface of the downstream API.
pub trait DownstreamClient
where
	Self: Send + Sync,
{
	/// Issues `GET <resource_path>`; the path may carry a query string.
	fn get<'a>(&'a self, resource_path: &'a str) -> DownstreamFuture<'a>;

	/// Issues `POST <resource_path>` with a JSON body.
	fn post<'a>(&'a self, resource_path: &'a str, body: &'a Value) -> DownstreamFuture<'a>;
}

/// Produces downstream clients for individual requests.
pub trait ClientFactory
where
	Self: Send + Sync,
{
	/// Concrete client type handed to the dispatcher.
	type Client: DownstreamClient;

	/// Builds a client for one inbound request.
	fn create_client(&self) -> Self::Client;
}

/// Graph client authenticating each call through a [`CredentialSupplier`].
#[derive(Clone)]
pub struct GraphClient {
	http_client: ReqwestHttpClient,
	base_url: Url,
	supplier: Arc<dyn CredentialSupplier>,
}
impl GraphClient {
	/// Creates a client rooted at `base_url`.
	pub fn new(
		http_client: ReqwestHttpClient,
		base_url: Url,
		supplier: Arc<dyn CredentialSupplier>,
	) -> Self {
		Self { http_client, base_url, supplier }
	}

	/// Resolves a resource path (e.g. `/sites?search=*`) against the base URL.
	pub fn resource_url(&self, resource_path: &str) -> Result<Url> {
		let raw = format!(
			"{}/{}",
			self.base_url.as_str().trim_end_matches('/'),
			resource_path.trim_start_matches('/')
		);

		Url::parse(&raw)
			.map_err(|source| ConfigError::InvalidUrl { name: "resource_path", source }.into())
	}

	async fn send(&self, method: Method, resource_path: &str, body: Option<&Value>) -> Result<Value> {
		let url = self.resource_url(resource_path)?;
		let token: Secret = self.supplier.access_token().await?;
		let mut request = self
			.http_client
			.request(method, url)
			.bearer_auth(token.expose())
			.header(header::ACCEPT, "application/json");

		if let Some(body) = body {
			request = request.json(body);
		}

		let response = request.send().await.map_err(map_reqwest_error)?;

		read_response(response).await
	}
}
impl DownstreamClient for GraphClient {
	fn get<'a>(&'a self, resource_path: &'a str) -> DownstreamFuture<'a> {
		let span = GatewaySpan::new(Stage::Downstream, "GET");

		Box::pin(span.instrument(self.send(Method::GET, resource_path, None)))
	}

	fn post<'a>(&'a self, resource_path: &'a str, body: &'a Value) -> DownstreamFuture<'a> {
		let span = GatewaySpan::new(Stage::Downstream, "POST");

		Box::pin(span.instrument(self.send(Method::POST, resource_path, Some(body))))
	}
}
impl Debug for GraphClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GraphClient").field("base_url", &self.base_url.as_str()).finish()
	}
}

/// [`ClientFactory`] producing [`GraphClient`]s that share one pool and supplier.
#[derive(Clone)]
pub struct GraphClientFactory {
	config: GraphConfig,
	http_client: ReqwestHttpClient,
	supplier: Arc<dyn CredentialSupplier>,
}
impl GraphClientFactory {
	/// Creates a factory over `http_client` that authenticates through `supplier`.
	pub fn new(
		config: GraphConfig,
		http_client: ReqwestHttpClient,
		supplier: Arc<dyn CredentialSupplier>,
	) -> Self {
		Self { config, http_client, supplier }
	}
}
impl ClientFactory for GraphClientFactory {
	type Client = GraphClient;

	fn create_client(&self) -> Self::Client {
		GraphClient::new(
			self.http_client.clone(),
			self.config.base_url.clone(),
			self.supplier.clone(),
		)
	}
}
impl Debug for GraphClientFactory {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GraphClientFactory").field("config", &self.config).finish()
	}
}

/// Graph error payload: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug, Default, Deserialize)]
struct GraphErrorBody {
	#[serde(default)]
	error: GraphErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct GraphErrorDetail {
	#[serde(default)]
	code: Option<String>,
	#[serde(default)]
	message: Option<String>,
}

async fn read_response(response: Response) -> Result<Value> {
	let status = response.status();
	let bytes = response.bytes().await.map_err(map_reqwest_error)?;

	if status.is_success() {
		if bytes.is_empty() {
			return Ok(Value::Null);
		}

		return serde_json::from_slice(&bytes).map_err(|e| Error::Downstream {
			status: None,
			message: format!("Downstream API returned malformed JSON: {e}"),
		});
	}

	Err(Error::Downstream { status: Some(status.as_u16()), message: error_message(status, &bytes) })
}

fn error_message(status: StatusCode, bytes: &[u8]) -> String {
	let detail = serde_json::from_slice::<GraphErrorBody>(bytes).unwrap_or_default().error;

	detail
		.message
		.filter(|message| !message.is_empty())
		.or(detail.code)
		.unwrap_or_else(|| match status.canonical_reason() {
			Some(reason) => format!("Downstream API responded with {} {reason}", status.as_u16()),
			None => format!("Downstream API responded with {}", status.as_u16()),
		})
}

fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	TransportError::network(DOWNSTREAM, err).into()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::CredentialFuture;

	struct StaticSupplier;
	impl CredentialSupplier for StaticSupplier {
		fn access_token(&self) -> CredentialFuture<'_, Secret> {
			Box::pin(async { Ok(Secret::new("static")) })
		}
	}

	fn client(base: &str) -> GraphClient {
		GraphClient::new(
			ReqwestHttpClient::default(),
			Url::parse(base).expect("Base URL fixture should parse."),
			Arc::new(StaticSupplier),
		)
	}

	#[test]
	fn resource_urls_keep_base_path_and_query() {
		let client = client("https://graph.microsoft.com/v1.0");

		assert_eq!(
			client.resource_url("/sites?search=*").expect("Resource URL should resolve.").as_str(),
			"https://graph.microsoft.com/v1.0/sites?search=*"
		);
		assert_eq!(
			client
				.resource_url("/sites/contoso.sharepoint.com,1,2/drives")
				.expect("Resource URL should resolve.")
				.as_str(),
			"https://graph.microsoft.com/v1.0/sites/contoso.sharepoint.com,1,2/drives"
		);
	}

	#[test]
	fn error_messages_prefer_graph_payload() {
		let body = br#"{"error":{"code":"accessDenied","message":"Access denied"}}"#;

		assert_eq!(error_message(StatusCode::FORBIDDEN, body), "Access denied");
		assert_eq!(
			error_message(StatusCode::FORBIDDEN, br#"{"error":{"code":"accessDenied"}}"#),
			"accessDenied"
		);
		assert_eq!(
			error_message(StatusCode::BAD_GATEWAY, b"<html>"),
			"Downstream API responded with 502 Bad Gateway"
		);
	}
}
