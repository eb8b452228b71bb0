//! Gateway configuration: application identity and Graph endpoints.
//!
//! Identity secrets are optional at load time. They are validated when a token is first
//! needed, so a misconfigured deployment still answers every request with a JSON envelope
//! instead of failing to start.

// std
use std::env;
// self
use crate::{
	_prelude::*,
	auth::{ClientId, Secret, TenantId},
	error::ConfigError,
};

/// Environment variable holding the directory (tenant) identifier.
pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
/// Environment variable holding the application (client) identifier.
pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
/// Environment variable holding the application client secret.
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
/// Environment variable overriding the identity provider authority host.
pub const ENV_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";
/// Environment variable overriding the requested scope.
pub const ENV_GRAPH_SCOPE: &str = "GRAPH_SCOPE";
/// Environment variable overriding the Graph API base URL.
pub const ENV_GRAPH_BASE_URL: &str = "GRAPH_BASE_URL";

const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/";
const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";
const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Complete gateway configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
	/// Application identity used for the client-credentials exchange.
	pub identity: IdentityConfig,
	/// Downstream Graph API settings.
	#[serde(default)]
	pub graph: GraphConfig,
}
impl GatewayConfig {
	/// Reads the configuration from the process environment.
	///
	/// Missing identity secrets are tolerated here; malformed URLs are not.
	pub fn from_env() -> Result<Self, ConfigError> {
		let authority = match env_value(ENV_AUTHORITY_HOST) {
			Some(raw) => parse_url(ENV_AUTHORITY_HOST, &raw)?,
			None => default_authority(),
		};
		let mut identity = IdentityConfig::new(authority);

		identity.tenant_id = env_value(ENV_TENANT_ID);
		identity.client_id = env_value(ENV_CLIENT_ID);
		identity.client_secret = env_value(ENV_CLIENT_SECRET).map(Secret::from);

		if let Some(scope) = env_value(ENV_GRAPH_SCOPE) {
			identity.scope = scope;
		}

		let graph = match env_value(ENV_GRAPH_BASE_URL) {
			Some(raw) => GraphConfig { base_url: parse_url(ENV_GRAPH_BASE_URL, &raw)? },
			None => GraphConfig::default(),
		};

		Ok(Self { identity, graph })
	}
}

/// Identity provider settings for the client-credentials grant.
#[derive(Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
	/// Authority host; the tenant and token path are appended to it.
	#[serde(default = "default_authority")]
	pub authority: Url,
	/// Directory (tenant) identifier.
	#[serde(default)]
	pub tenant_id: Option<String>,
	/// Application (client) identifier.
	#[serde(default)]
	pub client_id: Option<String>,
	/// Application client secret.
	#[serde(default)]
	pub client_secret: Option<Secret>,
	/// Scope requested for the downstream API.
	#[serde(default = "default_scope")]
	pub scope: String,
}
impl IdentityConfig {
	/// Creates an identity configuration for `authority` with no secrets set.
	pub fn new(authority: Url) -> Self {
		Self {
			authority,
			tenant_id: None,
			client_id: None,
			client_secret: None,
			scope: default_scope(),
		}
	}

	/// Sets the tenant identifier.
	pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
		self.tenant_id = Some(tenant_id.into());

		self
	}

	/// Sets the client identifier.
	pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the client secret.
	pub fn with_client_secret(mut self, secret: impl Into<Secret>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Overrides the requested scope.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// Validates the secrets and derives the tenant token endpoint.
	pub fn client_credentials(&self) -> Result<ClientCredentials, ConfigError> {
		let tenant_id = TenantId::new(required(&self.tenant_id, "tenant_id")?)?;
		let client_id = ClientId::new(required(&self.client_id, "client_id")?)?;
		let client_secret = self
			.client_secret
			.clone()
			.filter(|secret| !secret.is_blank())
			.ok_or(ConfigError::MissingCredential { name: "client_secret" })?;
		let token_url = with_trailing_slash(self.authority.clone())
			.join(&format!("{tenant_id}/oauth2/v2.0/token"))
			.map_err(|source| ConfigError::InvalidUrl { name: "token_endpoint", source })?;

		Ok(ClientCredentials {
			tenant_id,
			client_id,
			client_secret,
			token_url,
			scope: self.scope.clone(),
		})
	}
}
impl Debug for IdentityConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdentityConfig")
			.field("authority", &self.authority.as_str())
			.field("tenant_id", &self.tenant_id)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("scope", &self.scope)
			.finish()
	}
}

/// Validated inputs for one client-credentials exchange.
#[derive(Clone, Debug)]
pub struct ClientCredentials {
	/// Directory (tenant) identifier.
	pub tenant_id: TenantId,
	/// Application (client) identifier.
	pub client_id: ClientId,
	/// Application client secret.
	pub client_secret: Secret,
	/// Tenant-specific token endpoint.
	pub token_url: Url,
	/// Scope requested for the downstream API.
	pub scope: String,
}

/// Downstream Graph API settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphConfig {
	/// Base URL every resource path is appended to.
	pub base_url: Url,
}
impl Default for GraphConfig {
	fn default() -> Self {
		Self { base_url: parse_static(DEFAULT_GRAPH_BASE_URL) }
	}
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ConfigError> {
	value
		.as_deref()
		.filter(|value| !value.trim().is_empty())
		.ok_or(ConfigError::MissingCredential { name })
}

fn with_trailing_slash(mut url: Url) -> Url {
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	url
}

fn env_value(key: &str) -> Option<String> {
	env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { name, source })
}

fn parse_static(raw: &'static str) -> Url {
	Url::parse(raw).unwrap_or_else(|e| unreachable!("built-in URL `{raw}` must parse: {e}"))
}

fn default_authority() -> Url {
	parse_static(DEFAULT_AUTHORITY)
}

fn default_scope() -> String {
	DEFAULT_SCOPE.into()
}
