//! Gateway-level error types shared across credentials, the Graph client, and the router.
//!
//! Every failure carries the HTTP status it surfaces as through [`Error::status_code`], so the
//! dispatcher can translate any error into an envelope with one exhaustive match.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Credential exchange failed or returned an unusable result.
	#[error(transparent)]
	Authentication(#[from] AuthenticationError),
	/// Transport failure (DNS, TCP, TLS) while talking to a remote.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Caller supplied an incomplete request.
	#[error(transparent)]
	BadRequest(#[from] BadRequestError),
	/// Nothing can serve the request.
	#[error(transparent)]
	NotFound(#[from] NotFoundError),

	/// Downstream API answered with a failure.
	#[error("{message}")]
	Downstream {
		/// HTTP status reported by the downstream API, when available.
		status: Option<u16>,
		/// Downstream-supplied message summarizing the failure.
		message: String,
	},
}
impl Error {
	/// Status code used when a failure carries no more specific status.
	pub const DEFAULT_STATUS: u16 = 500;

	/// HTTP status this error surfaces as.
	pub fn status_code(&self) -> u16 {
		match self {
			Self::Config(_) | Self::Authentication(_) | Self::Transport(_) => Self::DEFAULT_STATUS,
			Self::BadRequest(_) => 400,
			Self::NotFound(_) => 404,
			Self::Downstream { status, .. } => status.unwrap_or(Self::DEFAULT_STATUS),
		}
	}
}

/// Configuration and validation failures raised by the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required identity secret is absent or empty.
	#[error("Missing identity credential `{name}` in the gateway configuration.")]
	MissingCredential {
		/// Configuration key that was not supplied.
		name: &'static str,
	},
	/// An identity value is present but malformed.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// A configured or derived endpoint URL cannot be parsed.
	#[error("Configuration value `{name}` is not a valid URL.")]
	InvalidUrl {
		/// Configuration key or derived endpoint name.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// HTTP client could not be constructed or rejected a request.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Credential exchange failures. Never retried.
#[derive(Debug, ThisError)]
pub enum AuthenticationError {
	/// Identity provider rejected the client-credentials request.
	#[error("Identity provider rejected the credential exchange: {reason}.")]
	Rejected {
		/// Provider-supplied reason string.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Exchange completed without a usable token or expiry.
	#[error("Failed to acquire access token: {0}.")]
	IncompleteResponse(#[from] crate::auth::CachedCredentialBuilderError),
	/// Token endpoint failed in a way the OAuth layer could not classify.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {target}.")]
	Network {
		/// Remote being called (`token endpoint` or `downstream API`).
		target: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error raised against `target`.
	pub fn network(
		target: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { target, source: Box::new(src) }
	}
}

/// Caller-side request problems.
#[derive(Debug, ThisError)]
pub enum BadRequestError {
	/// A required query parameter was omitted or empty.
	#[error("Missing search query parameter '{name}'")]
	MissingQueryParameter {
		/// Query parameter name.
		name: &'static str,
	},
	/// The inbound event could not be decoded.
	#[error("Malformed request event: {reason}")]
	MalformedEvent {
		/// Decoder message.
		reason: String,
	},
}

/// Business-level not-found outcomes.
#[derive(Debug, ThisError)]
pub enum NotFoundError {
	/// No route matches the method + path.
	#[error("Route not found: {method} {path}")]
	Route {
		/// Inbound HTTP method.
		method: String,
		/// Inbound path.
		path: String,
	},
	/// The item resolved but exposes no download URL.
	#[error("Download URL not found for this item. It might be a folder.")]
	DownloadUrl,
}
