//! Application identity, cached bearer credentials, and the client-credentials exchange.

pub mod cache;
pub mod credential;
pub mod id;
pub mod provider;
pub mod secret;

pub use cache::*;
pub use credential::*;
pub use id::*;
pub use provider::*;
pub use secret::*;
