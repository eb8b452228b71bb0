//! Application identity values that end up inside the token endpoint path or request body.
//!
//! Tenants may be a GUID, a verified domain, or an alias such as `organizations`; client
//! identifiers are GUIDs in practice. Both are restricted to a URL-path-safe alphabet so a
//! tenant can be spliced into `{authority}/{tenant}/oauth2/v2.0/token` without escaping.

// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, Hash)]
		pub struct $name(String);
		impl $name {
			/// Validates `value` and wraps it.
			pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
				let value = value.into();

				check($kind, &value)?;

				Ok(Self(value))
			}

			/// Borrows the raw identifier.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const MAX_LEN: usize = 128;

/// Rejection reasons for tenant and client identifiers.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// Nothing was supplied.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// `Tenant` or `Client`.
		kind: &'static str,
	},
	/// Longer than any identity platform identifier.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// `Tenant` or `Client`.
		kind: &'static str,
		/// Maximum permitted length.
		max: usize,
	},
	/// Only dots, which would act as a relative path segment.
	#[error("{kind} identifier cannot consist only of dots.")]
	DotsOnly {
		/// `Tenant` or `Client`.
		kind: &'static str,
	},
	/// A character outside `[A-Za-z0-9._-]`, e.g. whitespace or `/`.
	#[error("{kind} identifier contains the disallowed character {found:?}.")]
	InvalidCharacter {
		/// `Tenant` or `Client`.
		kind: &'static str,
		/// First offending character.
		found: char,
	},
}

def_id! { TenantId, "Directory (tenant) the application is registered in.", "Tenant" }
def_id! { ClientId, "Application (client) identifier issued at registration.", "Client" }

fn check(kind: &'static str, value: &str) -> Result<(), IdentifierError> {
	if value.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if value.len() > MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: MAX_LEN });
	}
	if let Some(found) =
		value.chars().find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
	{
		return Err(IdentifierError::InvalidCharacter { kind, found });
	}
	if value.chars().all(|c| c == '.') {
		return Err(IdentifierError::DotsOnly { kind });
	}

	Ok(())
}
