//! Optional observability helpers for credential refreshes and request dispatch.
//!
//! # Feature Flags
//!
//! - `tracing` (default) emits spans named `graph_gateway.stage` with `stage` and `target`
//!   fields, plus the request/failure log lines written by the dispatcher.
//! - `metrics` increments `graph_gateway_credential_total` (labeled by `outcome`) and
//!   `graph_gateway_dispatch_total` (labeled by `route` + `status_class`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Gateway stages observed by spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// Credential exchange triggered by a cache miss.
	CredentialRefresh,
	/// Downstream call made on behalf of a matched route.
	Downstream,
}
impl Stage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::CredentialRefresh => "credential_refresh",
			Stage::Downstream => "downstream",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each token request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialOutcome {
	/// Cached credential handed out without an exchange.
	Reused,
	/// Exchange succeeded and replaced the cached credential.
	Refreshed,
	/// Exchange failed; the cached credential was left untouched.
	Failure,
}
impl CredentialOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CredentialOutcome::Reused => "reused",
			CredentialOutcome::Refreshed => "refreshed",
			CredentialOutcome::Failure => "failure",
		}
	}
}
impl Display for CredentialOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Maps an HTTP status onto a low-cardinality class label (`2xx`, `4xx`, `5xx`, ...).
pub const fn status_class(status: u16) -> &'static str {
	match status {
		100..=199 => "1xx",
		200..=299 => "2xx",
		300..=399 => "3xx",
		400..=499 => "4xx",
		_ => "5xx",
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_classes_bucket_codes() {
		assert_eq!(status_class(200), "2xx");
		assert_eq!(status_class(404), "4xx");
		assert_eq!(status_class(503), "5xx");
		assert_eq!(status_class(999), "5xx");
	}
}
