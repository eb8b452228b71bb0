//! Normalized inbound request.

// self
use crate::_prelude::*;

/// One inbound HTTP request as delivered by the serverless runtime.
///
/// Deserializes straight from an API-Gateway-style proxy event; unrelated event fields are
/// ignored and a `null` `queryStringParameters` becomes `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundRequest {
	/// HTTP verb, compared case-sensitively against the route table.
	#[serde(rename = "httpMethod")]
	pub method: String,
	/// URL path without the query string.
	pub path: String,
	/// Decoded query parameters.
	#[serde(default)]
	pub query_string_parameters: Option<BTreeMap<String, String>>,
}
impl InboundRequest {
	/// Creates a request without query parameters.
	pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
		Self { method: method.into(), path: path.into(), query_string_parameters: None }
	}

	/// Adds or replaces one query parameter.
	pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query_string_parameters.get_or_insert_with(BTreeMap::new).insert(key.into(), value.into());

		self
	}

	/// Returns the query parameter `name`, if supplied.
	pub fn query(&self, name: &str) -> Option<&str> {
		self.query_string_parameters.as_ref()?.get(name).map(String::as_str)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn deserializes_proxy_events() {
		let request: InboundRequest = serde_json::from_value(serde_json::json!({
			"resource": "/{proxy+}",
			"httpMethod": "GET",
			"path": "/search",
			"queryStringParameters": { "q": "budget" },
			"headers": { "Accept": "application/json" }
		}))
		.expect("Proxy event should deserialize.");

		assert_eq!(request, InboundRequest::new("GET", "/search").with_query("q", "budget"));
		assert_eq!(request.query("q"), Some("budget"));
	}

	#[test]
	fn null_query_parameters_are_absent() {
		let request: InboundRequest = serde_json::from_value(serde_json::json!({
			"httpMethod": "GET",
			"path": "/sites",
			"queryStringParameters": null
		}))
		.expect("Proxy event with null query should deserialize.");

		assert!(request.query_string_parameters.is_none());
		assert_eq!(request.query("q"), None);
	}
}
