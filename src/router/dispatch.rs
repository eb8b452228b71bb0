//! Single-shot dispatcher: one inbound request, at most one downstream operation, exactly
//! one response envelope.

// self
use crate::{
	_prelude::*,
	auth::{ClientCredentialsProvider, CredentialCache, CredentialProvider},
	config::GatewayConfig,
	error::{BadRequestError, ConfigError, NotFoundError},
	graph::{ClientFactory, DownstreamClient, GraphClientFactory},
	http::ReqwestHttpClient,
	obs,
	router::{InboundRequest, Operation, ResponseEnvelope, RouteMatch, RouteTable},
};

/// Item field carrying the pre-authenticated, short-lived download link.
pub const DOWNLOAD_URL_FIELD: &str = "@microsoft.graph.downloadUrl";

const SEARCH_QUERY_PARAM: &str = "q";
const SEARCH_ENTITY_TYPES: [&str; 2] = ["listItem", "driveItem"];
const UNMATCHED: &str = "unmatched";

/// Dispatcher specialized for the default Graph + reqwest stack.
pub type ReqwestDispatcher = Dispatcher<GraphClientFactory>;

/// Routes inbound requests onto downstream operations.
///
/// The dispatcher owns no per-request state; it is safe to share one instance across
/// concurrent invocations.
#[derive(Clone, Debug)]
pub struct Dispatcher<F>
where
	F: ClientFactory,
{
	factory: F,
	routes: RouteTable,
}
impl<F> Dispatcher<F>
where
	F: ClientFactory,
{
	/// Creates a dispatcher over the standard route table.
	pub fn new(factory: F) -> Self {
		Self::with_routes(factory, RouteTable::standard())
	}

	/// Creates a dispatcher over a custom route table.
	pub fn with_routes(factory: F, routes: RouteTable) -> Self {
		Self { factory, routes }
	}

	/// Route table consulted by [`dispatch`](Self::dispatch).
	pub fn routes(&self) -> &RouteTable {
		&self.routes
	}

	/// Handles one request. Never fails: every error becomes an error envelope.
	pub async fn dispatch(&self, request: &InboundRequest) -> ResponseEnvelope {
		obs::log_request(&request.method, &request.path);

		let matched = self.routes.resolve(&request.method, &request.path);
		let label = matched.as_ref().map_or(UNMATCHED, |matched| matched.route.kind.as_str());
		let result = match matched {
			Some(matched) => self.invoke(matched, request).await,
			None => Err(NotFoundError::Route {
				method: request.method.clone(),
				path: request.path.clone(),
			}
			.into()),
		};
		let envelope = match result {
			Ok(data) => ResponseEnvelope::success(&data),
			Err(e) => {
				obs::log_failure(label, e.status_code(), &e);

				ResponseEnvelope::from_error(&e)
			},
		};

		obs::record_dispatch_outcome(label, envelope.status_code);

		envelope
	}

	/// Decodes a raw proxy event and dispatches it; undecodable events yield a `400`.
	pub async fn handle_event(&self, event: Value) -> ResponseEnvelope {
		match serde_json::from_value::<InboundRequest>(event) {
			Ok(request) => self.dispatch(&request).await,
			Err(e) => {
				let err: Error = BadRequestError::MalformedEvent { reason: e.to_string() }.into();

				obs::log_failure(UNMATCHED, 400, &err);

				ResponseEnvelope::from_error(&err)
			},
		}
	}

	async fn invoke(&self, matched: RouteMatch<'_>, request: &InboundRequest) -> Result<Value> {
		// Validate caller input before a client (and so a token) is ever requested.
		let search_query = match matched.operation {
			Operation::Search => Some(
				request
					.query(SEARCH_QUERY_PARAM)
					.filter(|query| !query.is_empty())
					.ok_or(BadRequestError::MissingQueryParameter { name: SEARCH_QUERY_PARAM })?,
			),
			_ => None,
		};
		let client = self.factory.create_client();

		match matched.operation {
			Operation::ListSites => client.get("/sites?search=*").await,
			Operation::SiteDrives { site_id } =>
				client.get(&format!("/sites/{site_id}/drives")).await,
			Operation::DriveRootChildren { drive_id } =>
				client.get(&format!("/drives/{drive_id}/root/children")).await,
			Operation::ItemContent { drive_id, item_id } => {
				let item = client.get(&format!("/drives/{drive_id}/items/{item_id}")).await?;

				download_projection(&item)
			},
			Operation::Search => {
				let body = search_request(search_query.unwrap_or_default());

				client.post("/search/query", &body).await
			},
		}
	}
}
impl Dispatcher<GraphClientFactory> {
	/// Wires credential provider, cache, and Graph client factory on the default reqwest
	/// stack. The returned cache is the one every client authenticates through.
	pub fn from_config(config: GatewayConfig) -> (Self, Arc<CredentialCache>) {
		let http_client = ReqwestHttpClient::default();
		let provider: Arc<dyn CredentialProvider> =
			Arc::new(ClientCredentialsProvider::new(config.identity, http_client.clone()));
		let cache = Arc::new(CredentialCache::new(provider));
		let factory = GraphClientFactory::new(config.graph, http_client, cache.clone());

		(Self::new(factory), cache)
	}

	/// Reads [`GatewayConfig`] from the environment and wires the default stack.
	pub fn from_env() -> Result<Self, ConfigError> {
		GatewayConfig::from_env().map(|config| Self::from_config(config).0)
	}
}

/// Builds the single-request search body scoped to list items and drive items.
pub fn search_request(query: &str) -> Value {
	serde_json::json!({
		"requests": [{
			"entityTypes": SEARCH_ENTITY_TYPES,
			"query": { "queryString": query },
		}],
	})
}

/// Projects item metadata onto `{filename, downloadUrl, webUrl, lastModifiedDateTime}`.
///
/// Fields missing from the item are omitted. An absent, `null`, or empty download URL
/// means the item is not a downloadable file.
pub fn download_projection(item: &Value) -> Result<Value> {
	let download_url = item
		.get(DOWNLOAD_URL_FIELD)
		.filter(|value| match value {
			Value::String(url) => !url.is_empty(),
			Value::Null | Value::Bool(false) => false,
			_ => true,
		})
		.ok_or(NotFoundError::DownloadUrl)?;
	let mut projection = serde_json::Map::new();

	if let Some(name) = item.get("name") {
		projection.insert("filename".into(), name.clone());
	}

	projection.insert("downloadUrl".into(), download_url.clone());

	for field in ["webUrl", "lastModifiedDateTime"] {
		if let Some(value) = item.get(field) {
			projection.insert(field.into(), value.clone());
		}
	}

	Ok(Value::Object(projection))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::graph::DownstreamFuture;

	#[derive(Clone, Debug, PartialEq, Eq)]
	enum Call {
		Get(String),
		Post(String, Value),
	}

	#[derive(Clone, Default)]
	struct Recorder {
		calls: Arc<Mutex<Vec<Call>>>,
		response: Arc<Mutex<Option<Value>>>,
		failure: Arc<Mutex<Option<(Option<u16>, String)>>>,
	}
	impl Recorder {
		fn responding(value: Value) -> Self {
			let recorder = Self::default();

			*recorder.response.lock() = Some(value);

			recorder
		}

		fn failing(status: Option<u16>, message: &str) -> Self {
			let recorder = Self::default();

			*recorder.failure.lock() = Some((status, message.into()));

			recorder
		}

		fn calls(&self) -> Vec<Call> {
			self.calls.lock().clone()
		}

		fn reply(&self, call: Call) -> DownstreamFuture<'_> {
			self.calls.lock().push(call);

			let outcome = match self.failure.lock().clone() {
				Some((status, message)) => Err(Error::Downstream { status, message }),
				None => Ok(self.response.lock().clone().unwrap_or_else(|| serde_json::json!({}))),
			};

			Box::pin(async move { outcome })
		}
	}
	impl DownstreamClient for Recorder {
		fn get<'a>(&'a self, resource_path: &'a str) -> DownstreamFuture<'a> {
			self.reply(Call::Get(resource_path.into()))
		}

		fn post<'a>(&'a self, resource_path: &'a str, body: &'a Value) -> DownstreamFuture<'a> {
			self.reply(Call::Post(resource_path.into(), body.clone()))
		}
	}
	impl ClientFactory for Recorder {
		type Client = Recorder;

		fn create_client(&self) -> Self::Client {
			self.clone()
		}
	}

	fn body(envelope: &ResponseEnvelope) -> Value {
		envelope.json_body().expect("Envelope body should be JSON.")
	}

	#[tokio::test]
	async fn site_id_reaches_resource_path() {
		let recorder = Recorder::responding(serde_json::json!({ "value": [] }));
		let dispatcher = Dispatcher::new(recorder.clone());
		let envelope = dispatcher.dispatch(&InboundRequest::new("GET", "/sites/ABC123/drives")).await;

		assert_eq!(envelope.status_code, 200);
		assert_eq!(recorder.calls(), vec![Call::Get("/sites/ABC123/drives".into())]);
	}

	#[tokio::test]
	async fn sites_uses_search_all_query() {
		let recorder = Recorder::default();
		let dispatcher = Dispatcher::new(recorder.clone());

		dispatcher.dispatch(&InboundRequest::new("GET", "/sites")).await;

		assert_eq!(recorder.calls(), vec![Call::Get("/sites?search=*".into())]);
	}

	#[tokio::test]
	async fn search_requires_query_without_calling_downstream() {
		let recorder = Recorder::default();
		let dispatcher = Dispatcher::new(recorder.clone());

		for request in
			[InboundRequest::new("GET", "/search"), InboundRequest::new("GET", "/search").with_query("q", "")]
		{
			let envelope = dispatcher.dispatch(&request).await;

			assert_eq!(envelope.status_code, 400);
			assert_eq!(body(&envelope), serde_json::json!({ "error": "Missing search query parameter 'q'" }));
		}

		assert!(recorder.calls().is_empty());
	}

	#[tokio::test]
	async fn search_posts_structured_request() {
		let recorder = Recorder::default();
		let dispatcher = Dispatcher::new(recorder.clone());
		let envelope = dispatcher
			.dispatch(&InboundRequest::new("GET", "/search").with_query("q", "quarterly report"))
			.await;

		assert_eq!(envelope.status_code, 200);
		assert_eq!(
			recorder.calls(),
			vec![Call::Post(
				"/search/query".into(),
				serde_json::json!({
					"requests": [{
						"entityTypes": ["listItem", "driveItem"],
						"query": { "queryString": "quarterly report" }
					}]
				})
			)]
		);
	}

	#[tokio::test]
	async fn unmatched_route_is_not_found() {
		let recorder = Recorder::default();
		let dispatcher = Dispatcher::new(recorder.clone());
		let envelope = dispatcher.dispatch(&InboundRequest::new("DELETE", "/unknown")).await;

		assert_eq!(envelope.status_code, 404);
		assert_eq!(body(&envelope), serde_json::json!({ "error": "Route not found: DELETE /unknown" }));
		assert!(recorder.calls().is_empty());
	}

	#[tokio::test]
	async fn downstream_status_is_preserved_or_defaulted() {
		let forbidden = Dispatcher::new(Recorder::failing(Some(403), "Access denied"));
		let envelope = forbidden.dispatch(&InboundRequest::new("GET", "/sites")).await;

		assert_eq!(envelope.status_code, 403);
		assert_eq!(body(&envelope), serde_json::json!({ "error": "Access denied" }));

		let opaque = Dispatcher::new(Recorder::failing(None, ""));
		let envelope = opaque.dispatch(&InboundRequest::new("GET", "/sites")).await;

		assert_eq!(envelope.status_code, 500);
		assert_eq!(body(&envelope), serde_json::json!({ "error": "Internal Server Error" }));
	}

	#[tokio::test]
	async fn malformed_events_are_bad_requests() {
		let dispatcher = Dispatcher::new(Recorder::default());
		let envelope = dispatcher.handle_event(serde_json::json!({ "path": 42 })).await;

		assert_eq!(envelope.status_code, 400);

		let envelope = dispatcher
			.handle_event(serde_json::json!({ "httpMethod": "GET", "path": "/sites" }))
			.await;

		assert_eq!(envelope.status_code, 200);
	}

	#[test]
	fn projection_requires_download_url() {
		let folder = serde_json::json!({ "name": "Shared", "folder": { "childCount": 3 } });
		let err = download_projection(&folder).expect_err("Folders have no download URL.");

		assert_eq!(err.status_code(), 404);
		assert_eq!(err.to_string(), "Download URL not found for this item. It might be a folder.");
		assert!(download_projection(&serde_json::json!({ DOWNLOAD_URL_FIELD: "" })).is_err());
	}

	#[test]
	fn projection_picks_file_fields() {
		let item = serde_json::json!({
			"id": "01ABC",
			"name": "report.pdf",
			"webUrl": "https://contoso.sharepoint.com/report.pdf",
			"lastModifiedDateTime": "2025-05-01T10:00:00Z",
			"size": 1024,
			DOWNLOAD_URL_FIELD: "https://download.example/report"
		});

		assert_eq!(
			download_projection(&item).expect("Files should project."),
			serde_json::json!({
				"filename": "report.pdf",
				"downloadUrl": "https://download.example/report",
				"webUrl": "https://contoso.sharepoint.com/report.pdf",
				"lastModifiedDateTime": "2025-05-01T10:00:00Z"
			})
		);
	}
}
