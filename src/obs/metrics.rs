// self
use crate::obs::{self, CredentialOutcome};

/// Records a token request outcome via the global metrics recorder (when enabled).
pub fn record_credential_outcome(outcome: CredentialOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("graph_gateway_credential_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

/// Records the status class produced for a route (when enabled).
pub fn record_dispatch_outcome(route: &'static str, status: u16) {
	let class = obs::status_class(status);

	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"graph_gateway_dispatch_total",
			"route" => route,
			"status_class" => class
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (route, class);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_metrics() {
		record_credential_outcome(CredentialOutcome::Failure);
		record_dispatch_outcome("unmatched", 404);
	}
}
