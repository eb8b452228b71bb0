// self
use crate::{_prelude::*, obs::Stage};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedStage<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStage<F> = F;

/// A span builder used around network-bound stages.
#[derive(Clone, Debug)]
pub struct GatewaySpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl GatewaySpan {
	/// Creates a new span tagged with the provided stage + target.
	pub fn new(stage: Stage, target: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("graph_gateway.stage", stage = stage.as_str(), target);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, target);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStage<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs the inbound request line.
pub fn log_request(method: &str, path: &str) {
	#[cfg(feature = "tracing")]
	tracing::info!(method, path, "received request");
	#[cfg(not(feature = "tracing"))]
	let _ = (method, path);
}

/// Logs a failure translated into an error envelope.
pub fn log_failure(route: &'static str, status: u16, error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::error!(route, status, error = %error, "error processing request");
	#[cfg(not(feature = "tracing"))]
	let _ = (route, status, error);
}
