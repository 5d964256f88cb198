//! Observability helpers for the token endpoints.
//!
//! # Signals
//!
//! - Every endpoint call runs inside a `tracing` span named `oauth2_provider.endpoint` with the
//!   `endpoint` and `stage` fields.
//! - Enable the `metrics` feature to increment the `oauth2_provider_endpoint_total` counter for every
//!   attempt/success/failure, labeled by `endpoint` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Endpoints served by the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointKind {
	/// Access token issuance for the basic-credentials grant.
	TokenGrant,
	/// Metadata lookup for an issued access token.
	TokenInformation,
}
impl EndpointKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			EndpointKind::TokenGrant => "token_grant",
			EndpointKind::TokenInformation => "token_information",
		}
	}
}
impl Display for EndpointKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointOutcome {
	/// Entry to an endpoint.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl EndpointOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			EndpointOutcome::Attempt => "attempt",
			EndpointOutcome::Success => "success",
			EndpointOutcome::Failure => "failure",
		}
	}
}
impl Display for EndpointOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
