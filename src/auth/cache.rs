//! Single-slot credential cache with expiry-aware reuse.
//!
//! [`CredentialCache`] owns exactly one [`CachedCredential`]. Each request for a token
//! reuses the cached value while more than [`CachedCredential::SAFETY_MARGIN`] of its
//! lifetime remains and otherwise asks its [`CredentialProvider`] for a fresh one. The slot
//! lock is only held for the read or the swap, never across the exchange, so concurrent
//! callers that all observe an expired slot each run their own exchange and the last write
//! wins. A failed exchange leaves the slot untouched.

// self
use crate::{
	_prelude::*,
	auth::{CachedCredential, CredentialProvider, Secret},
	obs::{self, CredentialOutcome, GatewaySpan, Stage},
};

/// Boxed future returned by credential capabilities.
pub type CredentialFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Capability that yields a bearer token that is currently safe to present.
///
/// Downstream clients depend on this trait only, never on a concrete cache.
pub trait CredentialSupplier
where
	Self: Send + Sync,
{
	/// Returns a current bearer token, refreshing it first when required.
	fn access_token(&self) -> CredentialFuture<'_, Secret>;
}

/// Process-wide holder of the application's bearer credential.
pub struct CredentialCache {
	provider: Arc<dyn CredentialProvider>,
	slot: RwLock<Option<Arc<CachedCredential>>>,
}
impl CredentialCache {
	/// Creates an empty cache that refreshes through `provider`.
	pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
		Self { provider, slot: RwLock::new(None) }
	}

	/// Installs `credential` in the slot before the cache is shared.
	pub fn with_credential(self, credential: CachedCredential) -> Self {
		self.seed(credential);

		self
	}

	/// Replaces the cached credential.
	pub fn seed(&self, credential: CachedCredential) {
		*self.slot.write() = Some(Arc::new(credential));
	}

	/// Returns a snapshot of the cached credential, valid or not.
	pub fn current(&self) -> Option<Arc<CachedCredential>> {
		self.slot.read().clone()
	}

	/// Returns a token that remains valid relative to `now`, exchanging a new one if needed.
	pub async fn access_token_at(&self, now: OffsetDateTime) -> Result<Secret> {
		if let Some(cached) = self.current().filter(|cached| cached.is_valid_at(now)) {
			obs::record_credential_outcome(CredentialOutcome::Reused);

			return Ok(cached.token.clone());
		}

		let span = GatewaySpan::new(Stage::CredentialRefresh, "client_credentials");
		let result = span.instrument(self.provider.exchange()).await;

		match result {
			Ok(fresh) => {
				let token = fresh.token.clone();

				*self.slot.write() = Some(Arc::new(fresh));
				obs::record_credential_outcome(CredentialOutcome::Refreshed);

				Ok(token)
			},
			Err(e) => {
				obs::record_credential_outcome(CredentialOutcome::Failure);

				Err(e)
			},
		}
	}
}
impl CredentialSupplier for CredentialCache {
	fn access_token(&self) -> CredentialFuture<'_, Secret> {
		Box::pin(self.access_token_at(OffsetDateTime::now_utc()))
	}
}
impl Debug for CredentialCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialCache").field("slot", &self.current()).finish()
	}
}
