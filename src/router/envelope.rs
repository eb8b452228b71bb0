//! Uniform `{statusCode, headers, body}` response wrapper.

// self
use crate::_prelude::*;

const CONTENT_TYPE: &str = "Content-Type";
const APPLICATION_JSON: &str = "application/json";
const FALLBACK_MESSAGE: &str = "Internal Server Error";

/// Response returned for every dispatched request, success or failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
	/// HTTP status code.
	pub status_code: u16,
	/// Response headers; always declares a JSON content type.
	pub headers: BTreeMap<String, String>,
	/// JSON-serialized payload.
	pub body: String,
}
impl ResponseEnvelope {
	/// Wraps a downstream result in a `200` envelope.
	pub fn success(data: &Value) -> Self {
		Self::json(200, data.to_string())
	}

	/// Builds an `{"error": message}` envelope; an empty message becomes a generic one.
	pub fn error(message: &str, status_code: u16) -> Self {
		let message = if message.is_empty() { FALLBACK_MESSAGE } else { message };

		Self::json(status_code, serde_json::json!({ "error": message }).to_string())
	}

	/// Translates a gateway error using its status and display message.
	pub fn from_error(err: &Error) -> Self {
		Self::error(&err.to_string(), err.status_code())
	}

	/// Parses the body back into JSON.
	pub fn json_body(&self) -> serde_json::Result<Value> {
		serde_json::from_str(&self.body)
	}

	/// Returns `true` for 2xx envelopes.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status_code)
	}

	fn json(status_code: u16, body: String) -> Self {
		let headers = BTreeMap::from([(CONTENT_TYPE.to_owned(), APPLICATION_JSON.to_owned())]);

		Self { status_code, headers, body }
	}
}
