//! Immutable cached bearer credential and its validity window.

// self
use crate::{_prelude::*, auth::Secret};

/// Errors produced by [`CachedCredentialBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CachedCredentialBuilderError {
	/// Issued when no (or an empty) token value was provided.
	#[error("access token is missing or empty")]
	MissingToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("expiry is missing")]
	MissingExpiry,
	/// Issued when a relative expiry is zero or negative.
	#[error("expires_in must be positive")]
	NonPositiveExpiry,
	/// Issued when the relative expiry lands outside the representable date range.
	#[error("expires_in is out of range")]
	ExpiryOutOfRange,
}

/// Bearer token plus the instant it stops being accepted.
///
/// Values are never mutated after construction; the cache swaps whole records.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedCredential {
	/// Bearer token; callers must avoid logging it.
	pub token: Secret,
	/// Expiry instant reported by the identity provider.
	pub expires_at: OffsetDateTime,
}
impl CachedCredential {
	/// Tokens are only reused while more than this much lifetime remains.
	pub const SAFETY_MARGIN: Duration = Duration::milliseconds(300_000);

	/// Creates a credential expiring at the provided instant.
	pub fn new(token: impl Into<Secret>, expires_at: OffsetDateTime) -> Self {
		Self { token: token.into(), expires_at }
	}

	/// Returns a builder for assembling credentials from token endpoint responses.
	pub fn builder() -> CachedCredentialBuilder {
		CachedCredentialBuilder::default()
	}

	/// Returns `true` if the credential may still be handed out at `now`.
	pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at > now + Self::SAFETY_MARGIN
	}

	/// Expiry expressed as milliseconds since the Unix epoch.
	pub fn expires_at_millis(&self) -> i128 {
		self.expires_at.unix_timestamp_nanos() / 1_000_000
	}
}
impl Debug for CachedCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedCredential")
			.field("token", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`CachedCredential`].
#[derive(Clone, Debug, Default)]
pub struct CachedCredentialBuilder {
	token: Option<Secret>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl CachedCredentialBuilder {
	/// Provides the bearer token value.
	pub fn token(mut self, token: impl Into<Secret>) -> Self {
		self.token = Some(token.into());

		self
	}

	/// Sets the instant the token was issued; defaults to now.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces a [`CachedCredential`].
	pub fn build(self) -> Result<CachedCredential, CachedCredentialBuilderError> {
		let token = self
			.token
			.filter(|token| !token.is_blank())
			.ok_or(CachedCredentialBuilderError::MissingToken)?;
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) if delta.is_positive() => self
				.issued_at
				.unwrap_or_else(OffsetDateTime::now_utc)
				.checked_add(delta)
				.ok_or(CachedCredentialBuilderError::ExpiryOutOfRange)?,
			(None, Some(_)) => return Err(CachedCredentialBuilderError::NonPositiveExpiry),
			(None, None) => return Err(CachedCredentialBuilderError::MissingExpiry),
		};

		Ok(CachedCredential { token, expires_at })
	}
}
