//! Inbound request routing: a fixed, ordered route table and the dispatcher that turns one
//! request into exactly one response envelope.

pub mod dispatch;
pub mod envelope;
pub mod request;
pub mod route;

pub use dispatch::*;
pub use envelope::*;
pub use request::*;
pub use route::*;
