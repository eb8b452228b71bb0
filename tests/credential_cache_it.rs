// crates.io
use httpmock::prelude::*;
// self
use graph_gateway::{
	_preludet::*,
	auth::{CachedCredential, CredentialSupplier},
	config::IdentityConfig,
	error::{AuthenticationError, ConfigError},
};

const TOKEN_PATH: &str = "/tenant-test/oauth2/v2.0/token";

fn identity(server: &MockServer) -> IdentityConfig {
	test_config(&server.base_url()).identity
}

async fn mock_token<'a>(server: &'a MockServer, token: &str) -> httpmock::Mock<'a> {
	let body = format!(
		"{{\"access_token\":\"{token}\",\"token_type\":\"bearer\",\"expires_in\":3599}}"
	);

	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}

#[tokio::test]
async fn exchanges_once_then_reuses_cached_token() {
	let server = MockServer::start_async().await;
	let mock = mock_token(&server, "app-token").await;
	let cache = build_test_cache(identity(&server));
	let first = cache.access_token().await.expect("Initial exchange should succeed.");
	let second = cache.access_token().await.expect("Cached token should be reused.");

	assert_eq!(first.expose(), "app-token");
	assert_eq!(second.expose(), "app-token");

	mock.assert_calls_async(1).await;

	let cached = cache.current().expect("Exchanged credential should be cached.");

	assert!(cached.expires_at > OffsetDateTime::now_utc() + Duration::minutes(55));
}

#[tokio::test]
async fn credential_inside_safety_margin_is_refreshed() {
	let server = MockServer::start_async().await;
	let mock = mock_token(&server, "fresh-token").await;
	let cache = build_test_cache(identity(&server));

	cache.seed(CachedCredential::new("stale-token", OffsetDateTime::now_utc() + Duration::minutes(4)));

	let token = cache.access_token().await.expect("Stale credential should be refreshed.");

	assert_eq!(token.expose(), "fresh-token");
	assert_eq!(
		cache.current().expect("Refreshed credential should be cached.").token.expose(),
		"fresh-token"
	);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn valid_seeded_credential_skips_the_provider() {
	let server = MockServer::start_async().await;
	let mock = mock_token(&server, "unused").await;
	let cache = build_test_cache(identity(&server));

	cache.seed(CachedCredential::new("warm-token", OffsetDateTime::now_utc() + Duration::hours(1)));

	let token = cache.access_token().await.expect("Valid credential should be reused.");

	assert_eq!(token.expose(), "warm-token");

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn rejected_exchange_keeps_previous_credential() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(401).header("content-type", "application/json").body(
				"{\"error\":\"invalid_client\",\"error_description\":\"AADSTS7000215: Invalid client secret provided.\"}",
			);
		})
		.await;
	let cache = build_test_cache(identity(&server));
	let stale = CachedCredential::new("expired-token", OffsetDateTime::now_utc() - Duration::minutes(1));

	cache.seed(stale.clone());

	let err = cache.access_token().await.expect_err("Rejected exchange should surface.");

	match &err {
		Error::Authentication(AuthenticationError::Rejected { reason, status }) => {
			assert!(reason.contains("Invalid client secret"));
			assert_eq!(*status, Some(401));
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	assert_eq!(err.status_code(), 500);
	assert_eq!(cache.current().as_deref(), Some(&stale));

	let _ = cache.access_token().await.expect_err("Expired slot should attempt another refresh.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn response_without_expiry_is_an_authentication_error() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"no-expiry\",\"token_type\":\"bearer\"}");
		})
		.await;
	let cache = build_test_cache(identity(&server));
	let err = cache.access_token().await.expect_err("Missing expiry should fail.");

	assert!(matches!(err, Error::Authentication(AuthenticationError::IncompleteResponse(_))));
	assert!(cache.current().is_none());

	mock.assert_async().await;
}

#[tokio::test]
async fn missing_secret_fails_without_network() {
	let server = MockServer::start_async().await;
	let mock = mock_token(&server, "unused").await;
	let mut identity = identity(&server);

	identity.client_secret = None;

	let cache = build_test_cache(identity);
	let err = cache.access_token().await.expect_err("Missing secret should fail.");

	assert!(matches!(
		err,
		Error::Config(ConfigError::MissingCredential { name: "client_secret" })
	));

	mock.assert_calls_async(0).await;
}
