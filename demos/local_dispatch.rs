//! Runs the gateway against a mocked identity provider and Graph API, dispatching a few
//! proxy events the way the serverless runtime would.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use tracing_subscriber::EnvFilter;
use url::Url;
// self
use graph_gateway::{
	config::{GatewayConfig, GraphConfig, IdentityConfig},
	router::Dispatcher,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("graph_gateway=debug")),
		)
		.init();

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/contoso/oauth2/v2.0/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":3599}",
			);
		})
		.await;
	let sites_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1.0/sites").query_param("search", "*");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"value\":[{\"id\":\"contoso,1,2\",\"displayName\":\"Finance\"}]}");
		})
		.await;
	let base = Url::parse(&server.base_url())?;
	let config = GatewayConfig {
		identity: IdentityConfig::new(base.clone())
			.with_tenant_id("contoso")
			.with_client_id("demo-client")
			.with_client_secret("super-secret"),
		graph: GraphConfig { base_url: base.join("v1.0")? },
	};
	let (dispatcher, cache) = Dispatcher::from_config(config);

	for event in [
		serde_json::json!({ "httpMethod": "GET", "path": "/sites" }),
		serde_json::json!({ "httpMethod": "GET", "path": "/sites" }),
		serde_json::json!({ "httpMethod": "GET", "path": "/search" }),
		serde_json::json!({ "httpMethod": "DELETE", "path": "/unknown" }),
	] {
		let envelope = dispatcher.handle_event(event).await;

		println!("{} {}", envelope.status_code, envelope.body);
	}

	if let Some(credential) = cache.current() {
		println!("Cached credential expires at {}.", credential.expires_at);
	}

	token_mock.assert_async().await;
	sites_mock.assert_calls_async(2).await;

	Ok(())
}
