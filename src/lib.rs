//! Serverless backend-for-frontend for Microsoft Graph: acquire an application token with the
//! client-credentials grant, reuse it until it nears expiry, and route a handful of REST paths
//! onto Graph resources behind one uniform JSON envelope.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod graph;
pub mod http;
pub mod obs;
pub mod router;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{ClientCredentialsProvider, CredentialCache, CredentialProvider},
		config::{GatewayConfig, GraphConfig, IdentityConfig},
		graph::GraphClientFactory,
		http::ReqwestHttpClient,
		router::{Dispatcher, ReqwestDispatcher},
	};

	/// Tenant identifier used by integration fixtures.
	pub const TEST_TENANT: &str = "tenant-test";
	/// Client identifier used by integration fixtures.
	pub const TEST_CLIENT_ID: &str = "client-test";
	/// Client secret used by integration fixtures.
	pub const TEST_CLIENT_SECRET: &str = "secret-test";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Returns a fully populated configuration whose identity authority and Graph base URL
	/// both point at `base_url` (typically an `httpmock` server).
	pub fn test_config(base_url: &str) -> GatewayConfig {
		let base = Url::parse(base_url).expect("Mock server URL should parse successfully.");
		let graph_base = base.join("v1.0").expect("Mock Graph base URL should parse successfully.");

		GatewayConfig {
			identity: IdentityConfig::new(base)
				.with_tenant_id(TEST_TENANT)
				.with_client_id(TEST_CLIENT_ID)
				.with_client_secret(TEST_CLIENT_SECRET),
			graph: GraphConfig { base_url: graph_base },
		}
	}

	/// Constructs a credential cache backed by the reqwest client-credentials provider.
	pub fn build_test_cache(identity: IdentityConfig) -> Arc<CredentialCache> {
		let provider: Arc<dyn CredentialProvider> =
			Arc::new(ClientCredentialsProvider::new(identity, test_reqwest_http_client()));

		Arc::new(CredentialCache::new(provider))
	}

	/// Constructs a dispatcher plus the credential cache it shares, so tests can seed or
	/// inspect the cached credential.
	pub fn build_test_dispatcher(config: GatewayConfig) -> (ReqwestDispatcher, Arc<CredentialCache>) {
		let http_client = test_reqwest_http_client();
		let cache = build_test_cache(config.identity);
		let factory = GraphClientFactory::new(config.graph, http_client, cache.clone());

		(Dispatcher::new(factory), cache)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, Method};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tracing_subscriber as _};
