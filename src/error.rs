//! Provider-level error types shared across the controller, services, and stores.

// self
use crate::_prelude::*;

/// Provider-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical provider error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Classified OAuth failure that must reach the client as a structured error.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// A mandatory argument is missing or malformed; surfaces as a generic bad request.
	#[error("Invalid argument: {reason}.")]
	InvalidArgument {
		/// Human-readable description of the offending argument.
		reason: String,
	},
	/// No active token matches the presented access token.
	#[error("Access token is unknown or no longer active.")]
	UnknownToken,
}
impl Error {
	/// Returns the protocol error when this is a [`Error::Protocol`] value.
	pub fn as_protocol(&self) -> Option<&ProtocolError> {
		match self {
			Self::Protocol(e) => Some(e),
			_ => None,
		}
	}
}
impl From<crate::auth::TokenRecordBuilderError> for Error {
	fn from(e: crate::auth::TokenRecordBuilderError) -> Self {
		Self::Config(e.into())
	}
}

/// OAuth error codes the provider reports to clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolErrorKind {
	/// Missing or malformed mandatory parameter.
	InvalidRequest,
	/// Grant type other than the one the provider accepts.
	UnsupportedGrantType,
	/// Client credentials were supplied but the provider only serves public clients.
	InvalidClientCredentials,
	/// Scope parameter is not a whitespace-delimited list of word tokens.
	InvalidScope,
	/// Resource owner credentials were rejected.
	InvalidGrant,
}
impl ProtocolErrorKind {
	/// Returns the wire identifier for the error code.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::InvalidRequest => "invalid_request",
			Self::UnsupportedGrantType => "unsupported_grant_type",
			Self::InvalidClientCredentials => "invalid_client_credentials",
			Self::InvalidScope => "invalid_scope",
			Self::InvalidGrant => "invalid_grant",
		}
	}
}
impl Display for ProtocolErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Classified OAuth failure paired with a human-readable description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
#[error("{kind}: {message}")]
pub struct ProtocolError {
	/// Error code.
	#[serde(rename = "error")]
	pub kind: ProtocolErrorKind,
	/// Description intended for client developers.
	#[serde(rename = "error_description")]
	pub message: String,
}
impl ProtocolError {
	/// Creates a protocol error with the provided code and description.
	pub fn new(kind: ProtocolErrorKind, message: impl Into<String>) -> Self {
		Self { kind, message: message.into() }
	}

	/// Shorthand for [`ProtocolErrorKind::InvalidRequest`].
	pub fn invalid_request(message: impl Into<String>) -> Self {
		Self::new(ProtocolErrorKind::InvalidRequest, message)
	}

	/// Shorthand for [`ProtocolErrorKind::UnsupportedGrantType`].
	pub fn unsupported_grant_type(message: impl Into<String>) -> Self {
		Self::new(ProtocolErrorKind::UnsupportedGrantType, message)
	}

	/// Shorthand for [`ProtocolErrorKind::InvalidClientCredentials`].
	pub fn invalid_client_credentials(message: impl Into<String>) -> Self {
		Self::new(ProtocolErrorKind::InvalidClientCredentials, message)
	}

	/// Shorthand for [`ProtocolErrorKind::InvalidScope`].
	pub fn invalid_scope(message: impl Into<String>) -> Self {
		Self::new(ProtocolErrorKind::InvalidScope, message)
	}

	/// Shorthand for [`ProtocolErrorKind::InvalidGrant`].
	pub fn invalid_grant(message: impl Into<String>) -> Self {
		Self::new(ProtocolErrorKind::InvalidGrant, message)
	}
}

/// Configuration and validation failures raised while assembling the provider.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Supported grant literal is empty or contains whitespace.
	#[error("Grant type literal `{grant}` must be non-empty and free of whitespace.")]
	InvalidGrantType {
		/// Rejected literal.
		grant: String,
	},
	/// Token lifetime must be strictly positive.
	#[error("Token lifetime must be positive.")]
	NonPositiveLifetime,
	/// Token secrets shorter than the minimum are too easy to guess.
	#[error("Token length must be at least {min} bytes, got {actual}.")]
	TokenTooShort {
		/// Minimum accepted byte count.
		min: usize,
		/// Configured byte count.
		actual: usize,
	},
	/// Token record builder validation failed.
	#[error("Unable to build token record.")]
	TokenBuild(#[from] crate::auth::TokenRecordBuilderError),
}
