// crates.io
use tracing::{Instrument, Span, instrument::Instrumented};
// self
use crate::{_prelude::*, obs::EndpointKind};

/// A span builder used by endpoint handlers.
#[derive(Clone, Debug)]
pub struct EndpointSpan {
	span: Span,
}
impl EndpointSpan {
	/// Creates a new span tagged with the provided endpoint kind + stage.
	pub fn new(kind: EndpointKind, stage: &'static str) -> Self {
		let span = tracing::info_span!("oauth2_provider.endpoint", endpoint = kind.as_str(), stage);

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = EndpointSpan::new(EndpointKind::TokenInformation, "instrument_wraps_future");
		let value = EndpointSpan::instrument(&span, async { 42 }).await;

		assert_eq!(value, 42);
	}
}
